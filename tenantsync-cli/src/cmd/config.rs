use std::sync::Arc;

use secrecy::SecretString;
use tenantsync_store::{PostgresStore, TenantTable};

use crate::args::{StoreArgs, TenantArgs};
use crate::exit_codes;
use crate::output::{print_error, OutputFormat};
use crate::utils::redact_url_password;
use crate::OutputArgs;

const DATABASE_URL_VARS: [&str; 2] = ["TENANTSYNC_DATABASE_URL", "DATABASE_URL"];

/// `--store`, then the environment.
pub fn database_url(store: &StoreArgs) -> Option<String> {
    store.store.clone().or_else(|| {
        DATABASE_URL_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
    })
}

pub fn tenant_table(args: &TenantArgs, output: &OutputArgs) -> Result<TenantTable, i32> {
    TenantTable::new(&args.tenant_table, &args.tenant_column).map_err(|e| {
        print_error(output.format, output.quiet, &format!("invalid tenant table: {e}"));
        exit_codes::CONFIG_ERROR
    })
}

/// Connects to the database named by `--store` or the environment. The error
/// value is the exit code, after the error has been reported.
pub async fn connect_store(
    store: &StoreArgs,
    table: TenantTable,
    default_max_connections: u32,
    output: &OutputArgs,
) -> Result<Arc<PostgresStore>, i32> {
    let Some(url) = database_url(store) else {
        missing_database_url(output.format, output.quiet);
        return Err(exit_codes::CONFIG_ERROR);
    };
    let max_connections = store.max_connections.unwrap_or(default_max_connections).max(1);

    match PostgresStore::connect(&SecretString::from(url.clone()), max_connections).await {
        Ok(pg) => {
            tracing::debug!(
                database = %redact_url_password(&url),
                max_connections,
                "connected"
            );
            Ok(Arc::new(pg.with_tenant_table(table)))
        }
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to connect to {}: {e}", redact_url_password(&url)),
            );
            Err(exit_codes::RUNTIME_ERROR)
        }
    }
}

fn missing_database_url(format: OutputFormat, quiet: bool) {
    print_error(
        format,
        quiet,
        "no database URL: pass --store or set TENANTSYNC_DATABASE_URL / DATABASE_URL",
    );
}
