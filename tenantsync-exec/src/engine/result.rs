use std::fmt;

use tenantsync_store::{StoreError, TenantId};

use crate::engine::metrics::RunReport;
use crate::engine::types::ConfigError;
use crate::executor::ExecutorError;
use crate::registry::RegistryError;

/// Why a tenant could not be published.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("pre-execute failed: {0}")]
    PreExecute(ExecutorError),
    #[error("counting rows failed: {0}")]
    Total(ExecutorError),
    #[error("work queue closed")]
    QueueClosed,
}

#[derive(Debug)]
pub struct TenantFailure {
    pub tenant: TenantId,
    pub error: PublishError,
}

impl fmt::Display for TenantFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tenant {}: {}", self.tenant, self.error)
    }
}

/// Every tenant that failed setup during one run, in publication order. Never empty.
#[derive(Debug)]
pub struct SetupFailures(Vec<TenantFailure>);

impl SetupFailures {
    pub(crate) fn new(failures: Vec<TenantFailure>) -> Self {
        debug_assert!(!failures.is_empty());
        Self(failures)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TenantFailure> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<TenantFailure> {
        self.0
    }
}

impl fmt::Display for SetupFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no tenants"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("invalid job config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to list tenants: {0}")]
    Enumeration(StoreError),
    #[error("tenant setup failed for {failures}")]
    TenantSetup {
        failures: SetupFailures,
        report: RunReport,
    },
    #[error("worker task failed: {0}")]
    Worker(String),
}
