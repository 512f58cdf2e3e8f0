use serde::Serialize;
use tenantsync_exec::{JobKind, JobsFile};

use crate::args::JobsArgs;
use crate::exit_codes;
use crate::output::{print_error, print_json, OutputFormat};
use crate::OutputArgs;

#[derive(Debug, Serialize)]
struct JobSummary {
    kind: JobKind,
    pre_execute: usize,
}

pub fn jobs_cmd(jobs: JobsArgs, output: OutputArgs) -> i32 {
    let file = match JobsFile::load(&jobs.jobs_file) {
        Ok(f) => f,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };

    let summaries: Vec<JobSummary> = file
        .jobs
        .iter()
        .map(|(kind, job)| JobSummary {
            kind: *kind,
            pre_execute: job.pre_execute.len(),
        })
        .collect();

    if output.quiet {
        return exit_codes::SUCCESS;
    }
    match output.format {
        OutputFormat::Json => print_json(output.quiet, &summaries),
        OutputFormat::Text => {
            if summaries.is_empty() {
                println!("no jobs defined in {}", jobs.jobs_file.display());
            }
            for s in &summaries {
                println!("{:<24} pre-execute statements: {}", s.kind, s.pre_execute);
            }
        }
    }
    exit_codes::SUCCESS
}
