//! history-sync - CI helper keeping test-report history in object storage
//!
//! Run `history-sync download` before the tests to restore the report
//! history and `history-sync upload` afterwards to publish results and report.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use history_sync::commands::{self, Cli};
use history_sync::output::LogWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    // Logs go to stderr so --json output on stdout stays parseable
    let log_writer = LogWriter::default();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(log_writer.clone()))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let exit_code = commands::execute(cli, log_writer.progress().clone()).await;

    std::process::exit(exit_code.as_i32());
}
