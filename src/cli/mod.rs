mod handlers;
pub mod parse;
mod viewer;

use std::io;

use clap::Parser;
pub use parse::Cli;
use tracing_subscriber::EnvFilter;

use crate::core::error::GraphError;

/// Parse the process arguments, set up logging and run.
pub fn run() -> Result<(), GraphError> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    execute(cli)
}

/// Run an already-parsed command line.
pub fn execute(cli: Cli) -> Result<(), GraphError> {
    handlers::plot(cli)
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--debug`.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
