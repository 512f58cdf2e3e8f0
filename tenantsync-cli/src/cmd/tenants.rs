use tenantsync_store::TenantSource;

use crate::args::{StoreArgs, TenantArgs};
use crate::cmd::config;
use crate::exit_codes;
use crate::output::{print_error, print_json, OutputFormat};
use crate::OutputArgs;

pub async fn tenants_cmd(tenants: TenantArgs, store: StoreArgs, output: OutputArgs) -> i32 {
    let table = match config::tenant_table(&tenants, &output) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let pg = match config::connect_store(&store, table, 1, &output).await {
        Ok(pg) => pg,
        Err(code) => return code,
    };

    let result = pg.list_tenants().await;
    pg.close().await;

    let ids = match result {
        Ok(ids) => ids,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to list tenants: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if output.quiet {
        return exit_codes::SUCCESS;
    }
    match output.format {
        OutputFormat::Json => print_json(output.quiet, &ids),
        OutputFormat::Text => {
            for id in &ids {
                println!("{id}");
            }
            eprintln!("{} tenant(s)", ids.len());
        }
    }
    exit_codes::SUCCESS
}
