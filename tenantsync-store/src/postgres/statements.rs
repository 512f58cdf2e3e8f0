use sqlx::{PgPool, Postgres, Transaction};

use crate::store::{SessionScope, StoreError};

/// Opens a transaction whose session settings name the tenant, so that
/// row-level security policies see it. `is_local = true` keeps the settings
/// from leaking into the pooled connection after commit.
async fn begin_scoped(
    pool: &PgPool,
    scope: SessionScope<'_>,
) -> Result<Transaction<'static, Postgres>, StoreError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
SELECT set_config('permission.resource_path', $1, true),
       set_config('permission.user_group', $2, true)
        "#,
    )
    .bind(scope.resource_path)
    .bind(scope.user_group)
    .execute(&mut *tx)
    .await?;
    Ok(tx)
}

/// Runs parameterless statements in one tenant-scoped transaction.
pub async fn execute_all(
    pool: &PgPool,
    scope: SessionScope<'_>,
    statements: &[String],
) -> Result<(), StoreError> {
    if statements.is_empty() {
        return Ok(());
    }
    let mut tx = begin_scoped(pool, scope).await?;
    for sql in statements {
        sqlx::query(sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

/// `$1` = resource path. Must yield a single bigint.
pub async fn count(pool: &PgPool, scope: SessionScope<'_>, sql: &str) -> Result<i64, StoreError> {
    let mut tx = begin_scoped(pool, scope).await?;
    let total: i64 = sqlx::query_scalar(sql)
        .bind(scope.resource_path)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(total)
}

/// `$1` = resource path, `$2` = limit, `$3` = offset.
pub async fn execute_page(
    pool: &PgPool,
    scope: SessionScope<'_>,
    sql: &str,
    limit: i64,
    offset: i64,
) -> Result<u64, StoreError> {
    let mut tx = begin_scoped(pool, scope).await?;
    let result = sqlx::query(sql)
        .bind(scope.resource_path)
        .bind(limit)
        .bind(offset)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected())
}
