use sqlx::PgPool;

use crate::store::{StoreError, TenantId, TenantTable};

pub async fn list_tenants(pool: &PgPool, table: &TenantTable) -> Result<Vec<TenantId>, StoreError> {
    let sql = table.select_sql();
    let rows: Vec<String> = sqlx::query_scalar(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(TenantId::from).collect())
}
