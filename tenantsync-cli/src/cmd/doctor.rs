use std::path::Path;

use secrecy::SecretString;
use serde::Serialize;
use tenantsync_exec::JobsFile;
use tenantsync_store::{PostgresStore, StoreError, TenantSource, TenantTable};

use crate::args::{StoreArgs, TenantArgs};
use crate::cmd::config;
use crate::exit_codes;
use crate::output::{print_json, OutputFormat};
use crate::utils::redact_url_password;
use crate::OutputArgs;

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    Skipped,
    Error,
}

#[derive(Serialize)]
struct Check {
    name: &'static str,
    status: Status,
    message: String,
}

impl Check {
    fn new(name: &'static str, status: Status, message: impl Into<String>) -> Self {
        Self {
            name,
            status,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct DoctorResult {
    checks: Vec<Check>,
    all_passed: bool,
}

pub async fn doctor_cmd(
    jobs_file: Option<&Path>,
    tenants: TenantArgs,
    store: StoreArgs,
    output: OutputArgs,
) -> i32 {
    let mut checks = Vec::new();

    if let Some(path) = jobs_file {
        checks.push(check_jobs_file(path));
    }

    let table = TenantTable::new(&tenants.tenant_table, &tenants.tenant_column);
    checks.extend(check_database(&store, table).await);

    let all_passed = checks.iter().all(|c| c.status != Status::Error);
    let result = DoctorResult { checks, all_passed };

    match output.format {
        OutputFormat::Json => print_json(output.quiet, &result),
        OutputFormat::Text if !output.quiet => {
            println!("Environment checks:");
            for c in &result.checks {
                let icon = match c.status {
                    Status::Ok => "✓",
                    Status::Skipped => "-",
                    Status::Error => "✗",
                };
                println!("  {icon} {}: {}", c.name, c.message);
            }
        }
        OutputFormat::Text => {}
    }

    if all_passed {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUNTIME_ERROR
    }
}

fn check_jobs_file(path: &Path) -> Check {
    match JobsFile::load(path) {
        Ok(file) => {
            let kinds: Vec<String> = file.jobs.keys().map(|k| k.to_string()).collect();
            Check::new("jobs file", Status::Ok, format!("defines {}", kinds.join(", ")))
        }
        Err(e) => Check::new("jobs file", Status::Error, e.to_string()),
    }
}

/// The connection is checked even when the tenant table is invalid; the
/// table is only queried when both are usable.
async fn check_database(store: &StoreArgs, table: Result<TenantTable, StoreError>) -> Vec<Check> {
    let mut checks = Vec::new();
    let table = match table {
        Ok(table) => Some(table),
        Err(e) => {
            checks.push(Check::new("tenant table", Status::Error, e.to_string()));
            None
        }
    };

    let Some(url) = config::database_url(store) else {
        checks.push(Check::new("database", Status::Skipped, "no database URL configured"));
        return checks;
    };

    let pg = match PostgresStore::connect(&SecretString::from(url.clone()), 1).await {
        Ok(pg) => pg,
        Err(e) => {
            checks.push(Check::new(
                "database",
                Status::Error,
                format!("connection to {} failed: {e}", redact_url_password(&url)),
            ));
            return checks;
        }
    };
    checks.push(Check::new("database", Status::Ok, "connected"));

    let queryable = table.is_some();
    let pg = match table {
        Some(table) => pg.with_tenant_table(table),
        None => pg,
    };
    if queryable {
        checks.push(match pg.list_tenants().await {
            Ok(ids) => Check::new("tenant table", Status::Ok, format!("{} tenant(s)", ids.len())),
            Err(e) => Check::new("tenant table", Status::Error, e.to_string()),
        });
    }
    pg.close().await;
    checks
}
