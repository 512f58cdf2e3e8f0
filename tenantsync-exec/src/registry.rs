use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::executor::Executor;

/// Every synchronization job this binary knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    LessonReports,
    LessonMembers,
    Teachers,
    StudentSubscriptions,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        JobKind::LessonReports,
        JobKind::LessonMembers,
        JobKind::Teachers,
        JobKind::StudentSubscriptions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::LessonReports => "lesson-reports",
            JobKind::LessonMembers => "lesson-members",
            JobKind::Teachers => "teachers",
            JobKind::StudentSubscriptions => "student-subscriptions",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownKind(s.to_string()))
    }
}

type Constructor = Box<dyn Fn() -> Arc<dyn Executor> + Send + Sync>;

/// Job kinds mapped to executor constructors, filled once at startup.
#[derive(Default)]
pub struct JobRegistry {
    constructors: BTreeMap<JobKind, Constructor>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any constructor already registered for `kind`.
    pub fn register<F>(&mut self, kind: JobKind, constructor: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn Executor> + Send + Sync + 'static,
    {
        self.constructors.insert(kind, Box::new(constructor));
        self
    }

    pub fn contains(&self, kind: JobKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = JobKind> + '_ {
        self.constructors.keys().copied()
    }

    pub fn resolve(&self, kind: JobKind) -> Result<Arc<dyn Executor>, RegistryError> {
        self.constructors
            .get(&kind)
            .map(|construct| construct())
            .ok_or(RegistryError::Unregistered(kind))
    }
}

impl fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown job kind {0:?} (expected lesson-reports, lesson-members, teachers or student-subscriptions)")]
    UnknownKind(String),
    #[error("no executor registered for job kind {0}")]
    Unregistered(JobKind),
}
