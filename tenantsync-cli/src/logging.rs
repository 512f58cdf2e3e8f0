//! Tracing subscriber for the CLI. Logs go to stderr so stdout carries only results.

use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// Filter comes from `RUST_LOG`, defaulting to `info` (`warn` when quiet).
pub fn init(format: OutputFormat, quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A second init (e.g. in tests) is a no-op.
    let _ = match format {
        OutputFormat::Json => builder.json().try_init(),
        OutputFormat::Text => builder.compact().try_init(),
    };
}
