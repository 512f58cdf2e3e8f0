use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::Subcommand;
use tenantsync_exec::JobKind;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one job across every tenant.
    Run {
        #[arg(long, value_parser = job_kind_parser())]
        job: JobKind,
        #[command(flatten)]
        jobs: JobsArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[command(flatten)]
        tenants: TenantArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the tenants a run would visit.
    Tenants {
        #[command(flatten)]
        tenants: TenantArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the jobs defined in a jobs file.
    Jobs {
        #[command(flatten)]
        jobs: JobsArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check the database, tenant table and jobs file.
    Doctor {
        #[arg(long)]
        jobs_file: Option<std::path::PathBuf>,
        #[command(flatten)]
        tenants: TenantArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Lists every job kind in `--help` and in the error for an unknown one.
fn job_kind_parser() -> impl TypedValueParser<Value = JobKind> {
    PossibleValuesParser::new(JobKind::ALL.map(|k| k.as_str())).try_map(|s| s.parse::<JobKind>())
}

impl Command {
    pub fn output(&self) -> &OutputArgs {
        match self {
            Command::Run { output, .. }
            | Command::Tenants { output, .. }
            | Command::Jobs { output, .. }
            | Command::Doctor { output, .. } => output,
        }
    }
}
