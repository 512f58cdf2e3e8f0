use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod logging;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "tenantsync", version, about = "Multi-tenant batch synchronization")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    let output = cli.command.output();
    logging::init(output.format, output.quiet);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            job,
            jobs,
            engine,
            tenants,
            store,
            output,
        } => cmd::run::run_cmd(job, jobs, engine, tenants, store, output).await,
        Command::Tenants {
            tenants,
            store,
            output,
        } => cmd::tenants::tenants_cmd(tenants, store, output).await,
        Command::Jobs { jobs, output } => cmd::jobs::jobs_cmd(jobs, output),
        Command::Doctor {
            jobs_file,
            tenants,
            store,
            output,
        } => cmd::doctor::doctor_cmd(jobs_file.as_deref(), tenants, store, output).await,
    }
}
