use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tenantsync_store::PostgresStore;
use tracing::trace;

use crate::context::TenantContext;
use crate::executor::{Executor, ExecutorError};
use crate::registry::{JobKind, JobRegistry};

/// Statements behind one job kind.
///
/// Every statement runs in its own transaction with the tenant's
/// `permission.resource_path` / `permission.user_group` session settings.
/// `pre_execute` statements take no parameters; `count` binds `$1` (resource
/// path) and must return one bigint; `page` binds `$1`, `$2` (limit) and
/// `$3` (offset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlJob {
    #[serde(default)]
    pub pre_execute: Vec<String>,
    pub count: String,
    pub page: String,
}

impl SqlJob {
    fn check(&self, kind: JobKind) -> Result<(), JobsFileError> {
        let invalid = |reason: &str| JobsFileError::Invalid {
            kind,
            reason: reason.to_string(),
        };
        if self.count.trim().is_empty() {
            return Err(invalid("count statement is empty"));
        }
        if self.page.trim().is_empty() {
            return Err(invalid("page statement is empty"));
        }
        if self.pre_execute.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid("pre_execute contains an empty statement"));
        }
        Ok(())
    }
}

/// Job definitions, keyed by job kind. Accepted as JSON or YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobsFile {
    #[serde(default)]
    pub jobs: BTreeMap<JobKind, SqlJob>,
}

impl JobsFile {
    pub fn parse(content: &str) -> Result<Self, JobsFileError> {
        let file: JobsFile = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(_) => serde_yaml::from_str(content).map_err(|e| JobsFileError::Parse(e.to_string()))?,
        };
        for (kind, job) in &file.jobs {
            job.check(*kind)?;
        }
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self, JobsFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| JobsFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn get(&self, kind: JobKind) -> Option<&SqlJob> {
        self.jobs.get(&kind)
    }

    /// Registers a [`SqlExecutor`] for every job defined in the file.
    pub fn register_all(&self, registry: &mut JobRegistry, store: Arc<PostgresStore>) {
        for (kind, job) in &self.jobs {
            let (kind, job, store) = (*kind, Arc::new(job.clone()), Arc::clone(&store));
            registry.register(kind, move || {
                Arc::new(SqlExecutor::new(kind, Arc::clone(&job), Arc::clone(&store))) as Arc<dyn Executor>
            });
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobsFileError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("jobs file is neither valid JSON nor YAML: {0}")]
    Parse(String),
    #[error("job {kind}: {reason}")]
    Invalid { kind: JobKind, reason: String },
}

/// Executor whose work is defined entirely by a [`SqlJob`].
pub struct SqlExecutor {
    kind: JobKind,
    job: Arc<SqlJob>,
    store: Arc<PostgresStore>,
}

impl SqlExecutor {
    pub fn new(kind: JobKind, job: Arc<SqlJob>, store: Arc<PostgresStore>) -> Self {
        Self { kind, job, store }
    }
}

#[async_trait]
impl Executor for SqlExecutor {
    async fn pre_execute(&self, ctx: &TenantContext) -> Result<(), ExecutorError> {
        self.store
            .execute_all(ctx.session_scope(), &self.job.pre_execute)
            .await?;
        Ok(())
    }

    async fn get_total(&self, ctx: &TenantContext) -> Result<i64, ExecutorError> {
        Ok(self.store.count(ctx.session_scope(), &self.job.count).await?)
    }

    async fn execute_job(&self, ctx: &TenantContext, limit: i64, offset: i64) -> Result<(), ExecutorError> {
        let rows = self
            .store
            .execute_page(ctx.session_scope(), &self.job.page, limit, offset)
            .await?;
        trace!(job = %self.kind, tenant = %ctx.tenant(), offset, rows, "page statement executed");
        Ok(())
    }
}
