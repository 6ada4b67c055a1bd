//! download command - Restore report history
//!
//! Copies `{bucket-report-path}/history` from the bucket into
//! `{allure-results-path}/history` so the next report can show trends.

use clap::Args;
use hs_core::{DownloadInputs, DownloadPhase};

use super::{StorageOverrides, finish};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Restore the report history
#[derive(Args, Debug, Default)]
pub struct DownloadArgs {
    /// Bucket holding the published reports
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// Key prefix of the published report
    #[arg(long, env = "BUCKET_REPORT_PATH")]
    pub bucket_report_path: Option<String>,

    /// Local directory of the test results
    #[arg(long, env = "ALLURE_RESULTS_PATH")]
    pub allure_results_path: Option<String>,
}

impl From<DownloadArgs> for DownloadInputs {
    fn from(args: DownloadArgs) -> Self {
        Self {
            bucket_name: args.bucket_name,
            bucket_report_path: args.bucket_report_path,
            results_path: args.allure_results_path,
        }
    }
}

/// Execute the download command
pub async fn execute(
    args: DownloadArgs,
    overrides: &StorageOverrides,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let phase = match DownloadPhase::new(args.into()) {
        Ok(phase) => phase,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let bucket = match overrides.open_bucket(&phase.bucket_name).await {
        Ok(bucket) => bucket,
        Err(e) => {
            formatter.error(&format!("Failed to create storage client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let spinner = Spinner::start(&output_config, "Downloading report history");
    let result = phase.run(&bucket).await;
    spinner.finish_and_clear();

    finish(&formatter, result, "Downloaded")
}
