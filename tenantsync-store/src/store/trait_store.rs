use async_trait::async_trait;

use crate::store::types::TenantId;

/// Source of the tenants a batch job iterates over.
#[async_trait]
pub trait TenantSource: Send + Sync {
    /// All tenant identifiers, in a stable order. Either the full list or an error.
    async fn list_tenants(&self) -> Result<Vec<TenantId>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid sql identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("store error: {0}")]
    Other(String),
}
