use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use crate::store::{SessionScope, StoreError, TenantId, TenantSource, TenantTable};

use super::statements;
use super::tenants;

/// Shared connection pool plus the tenant control table. Safe for concurrent
/// use by every worker and tenant; isolation comes from the statements.
pub struct PostgresStore {
    pool: PgPool,
    tenant_table: TenantTable,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            tenant_table: TenantTable::default(),
        }
    }

    pub async fn connect(database_url: &SecretString, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self::new(pool))
    }

    pub fn with_tenant_table(mut self, table: TenantTable) -> Self {
        self.tenant_table = table;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn tenant_table(&self) -> &TenantTable {
        &self.tenant_table
    }

    pub async fn execute_all(&self, scope: SessionScope<'_>, statements: &[String]) -> Result<(), StoreError> {
        statements::execute_all(&self.pool, scope, statements).await
    }

    pub async fn count(&self, scope: SessionScope<'_>, sql: &str) -> Result<i64, StoreError> {
        statements::count(&self.pool, scope, sql).await
    }

    pub async fn execute_page(
        &self,
        scope: SessionScope<'_>,
        sql: &str,
        limit: i64,
        offset: i64,
    ) -> Result<u64, StoreError> {
        statements::execute_page(&self.pool, scope, sql, limit, offset).await
    }

    /// Waits for checked-out connections to be returned, then closes the pool.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::debug!("postgres pool closed");
        }
    }
}

#[async_trait::async_trait]
impl TenantSource for PostgresStore {
    async fn list_tenants(&self) -> Result<Vec<TenantId>, StoreError> {
        tenants::list_tenants(&self.pool, &self.tenant_table).await
    }
}
