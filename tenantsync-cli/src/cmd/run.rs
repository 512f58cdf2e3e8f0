use std::sync::Arc;

use serde::Serialize;
use tenantsync_exec::{
    AdminContextBuilder, Coordinator, JobConfig, JobError, JobKind, JobRegistry, JobsFile, RunReport,
    SetupFailurePolicy,
};

use crate::args::{EngineArgs, JobsArgs, StoreArgs, TenantArgs};
use crate::cmd::config;
use crate::exit_codes;
use crate::output::{print_error, print_json, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct RunOutput<'a> {
    job: JobKind,
    #[serde(flatten)]
    report: &'a RunReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    setup_failures: Vec<String>,
}

pub async fn run_cmd(
    job: JobKind,
    jobs: JobsArgs,
    engine: EngineArgs,
    tenants: TenantArgs,
    store: StoreArgs,
    output: OutputArgs,
) -> i32 {
    let file = match JobsFile::load(&jobs.jobs_file) {
        Ok(f) => f,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };
    if file.get(job).is_none() {
        print_error(
            output.format,
            output.quiet,
            &format!("job {job} is not defined in {}", jobs.jobs_file.display()),
        );
        return exit_codes::CONFIG_ERROR;
    }

    let policy = if engine.abort_on_setup_error {
        SetupFailurePolicy::Abort
    } else {
        SetupFailurePolicy::Continue
    };
    let job_config = match JobConfig::new(engine.concurrency, engine.page_size) {
        Ok(c) => c.with_setup_failure(policy),
        Err(e) => {
            print_error(output.format, output.quiet, &format!("invalid job config: {e}"));
            return exit_codes::CONFIG_ERROR;
        }
    };

    let table = match config::tenant_table(&tenants, &output) {
        Ok(t) => t,
        Err(code) => return code,
    };
    // One connection per worker plus one for the publisher.
    let default_pool = u32::try_from(job_config.concurrency.saturating_add(1)).unwrap_or(u32::MAX);
    let pg = match config::connect_store(&store, table, default_pool, &output).await {
        Ok(pg) => pg,
        Err(code) => return code,
    };

    let mut registry = JobRegistry::new();
    file.register_all(&mut registry, Arc::clone(&pg));
    let executor = match registry.resolve(job) {
        Ok(e) => e,
        Err(e) => {
            pg.close().await;
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };

    let coordinator = match Coordinator::new(job_config, pg.clone(), executor) {
        Ok(c) => c
            .with_context_builder(Arc::new(AdminContextBuilder::new(engine.job_user_id)))
            .with_cleanup(pg),
        Err(e) => {
            pg.close().await;
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };

    tracing::info!(%job, jobs_file = %jobs.jobs_file.display(), "starting run");
    match coordinator.run().await {
        Ok(report) => {
            print_report(job, &report, Vec::new(), &output);
            exit_codes::SUCCESS
        }
        Err(JobError::TenantSetup { failures, report }) => {
            let failures: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
            print_report(job, &report, failures, &output);
            exit_codes::RUN_FAILED
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::RUNTIME_ERROR
        }
    }
}

fn print_report(job: JobKind, report: &RunReport, setup_failures: Vec<String>, output: &OutputArgs) {
    if output.quiet {
        return;
    }
    if output.format == OutputFormat::Json {
        let out = RunOutput {
            job,
            report,
            setup_failures,
        };
        print_json(output.quiet, &out);
        return;
    }

    println!("Run {} ({job})", report.run_id);
    println!("  duration: {}ms", report.duration_ms);
    println!(
        "  tenants:  {} total, {} published, {} empty, {} failed",
        report.tenants.total, report.tenants.published, report.tenants.empty, report.tenants.failed
    );
    println!(
        "  pages:    {} dispatched, {} succeeded, {} failed, {} panicked",
        report.pages.dispatched, report.pages.succeeded, report.pages.failed, report.pages.panicked
    );
    if !setup_failures.is_empty() {
        println!("  setup failures:");
        for f in &setup_failures {
            println!("    {f}");
        }
    }
}
