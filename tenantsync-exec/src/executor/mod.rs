mod sql;

use async_trait::async_trait;
use tenantsync_store::StoreError;

use crate::context::TenantContext;

pub use sql::{JobsFile, JobsFileError, SqlExecutor, SqlJob};

/// Strategy that knows how to synchronize one tenant's rows, a page at a time.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Called once per tenant before its rows are counted.
    async fn pre_execute(&self, ctx: &TenantContext) -> Result<(), ExecutorError>;

    /// Number of rows to page through for this tenant.
    async fn get_total(&self, ctx: &TenantContext) -> Result<i64, ExecutorError>;

    /// Synchronizes rows `[offset, offset + limit)`. A failed page is only
    /// repaired by the next run, so implementations should be idempotent.
    async fn execute_job(&self, ctx: &TenantContext, limit: i64, offset: i64) -> Result<(), ExecutorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Failed(String),
}

impl ExecutorError {
    pub fn failed(message: impl Into<String>) -> Self {
        ExecutorError::Failed(message.into())
    }
}
