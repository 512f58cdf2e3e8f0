use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Postgres URL. Falls back to TENANTSYNC_DATABASE_URL, then DATABASE_URL.
    #[arg(long)]
    pub store: Option<String>,
    /// Pool size. Defaults to one more than the worker count.
    #[arg(long)]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct TenantArgs {
    /// Control table listing tenants, optionally schema-qualified.
    #[arg(long, default_value = "organizations")]
    pub tenant_table: String,
    #[arg(long, default_value = "organization_id")]
    pub tenant_column: String,
}

#[derive(Debug, Args, Clone)]
pub struct JobsArgs {
    /// Job definitions (YAML or JSON).
    #[arg(long)]
    pub jobs_file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    #[arg(long, default_value_t = tenantsync_exec::engine::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
    /// Rows per page; 0 or unset means 200.
    #[arg(long)]
    pub page_size: Option<i64>,
    /// Stop publishing further tenants after the first setup failure.
    #[arg(long)]
    pub abort_on_setup_error: bool,
    /// User id recorded in the claims each job acts under.
    #[arg(long, default_value = "tenantsync")]
    pub job_user_id: String,
}
