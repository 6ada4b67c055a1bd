//! CLI command definitions and execution
//!
//! Each CI phase is one subcommand. Inputs can be given as flags or as
//! environment variables so the binary drops into a pipeline step unchanged.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hs_core::{Bucket, Config, ConfigManager, TransferReport};
use hs_s3::S3Client;
use indicatif::MultiProgress;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod download;
pub mod upload;

/// history-sync - keep CI test-report history in object storage
///
/// Restores the report history before a test run and publishes results
/// and the generated report afterwards.
#[derive(Parser, Debug)]
#[command(name = "history-sync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "HISTORY_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Custom endpoint URL for S3-compatible storage
    #[arg(long, global = true, env = "HISTORY_SYNC_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Storage region
    #[arg(long, global = true, env = "HISTORY_SYNC_REGION")]
    pub region: Option<String>,

    /// Maximum number of transfers in flight
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore the report history before the test run
    Download(download::DownloadArgs),

    /// Publish results and the generated report after the test run
    Upload(upload::UploadArgs),
}

/// Storage settings given on the command line
///
/// These take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct StorageOverrides {
    pub config: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub concurrency: Option<usize>,
}

impl StorageOverrides {
    /// Load the configuration file and apply the overrides
    pub fn load_config(&self) -> hs_core::Result<Config> {
        let manager = match &self.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new()?,
        };

        let mut config = manager.load()?;

        if let Some(endpoint) = &self.endpoint {
            config.storage.endpoint = Some(endpoint.clone());
        }
        if let Some(region) = &self.region {
            config.storage.region = Some(region.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.transfer.concurrency = concurrency;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build the bucket facade for `bucket_name`
    pub async fn open_bucket(&self, bucket_name: &str) -> hs_core::Result<Bucket> {
        let config = self.load_config()?;
        tracing::debug!(
            bucket = bucket_name,
            concurrency = config.transfer.concurrency,
            "Opening bucket"
        );
        let client = S3Client::new(&config.storage).await?;

        Ok(Bucket::new(Arc::new(client), bucket_name)
            .with_concurrency(config.transfer.concurrency))
    }
}

/// Execute the CLI command and return an exit code
///
/// Spinners are drawn on `progress`, which must be the draw target of the
/// installed log writer.
pub async fn execute(cli: Cli, progress: MultiProgress) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
        progress,
    };

    let overrides = StorageOverrides {
        config: cli.config,
        endpoint: cli.endpoint,
        region: cli.region,
        concurrency: cli.concurrency,
    };

    match cli.command {
        Commands::Download(args) => download::execute(args, &overrides, output_config).await,
        Commands::Upload(args) => upload::execute(args, &overrides, output_config).await,
    }
}

/// Print the outcome of a phase and pick the exit code
fn finish(
    formatter: &Formatter,
    result: hs_core::Result<TransferReport>,
    done: &str,
) -> ExitCode {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    formatter.report(&report, done);

    match report.into_result() {
        Ok(_) => ExitCode::Success,
        Err(e) => ExitCode::from_error(&e),
    }
}
