//! upload command - Publish results and report
//!
//! Uploads the files matching the results pattern below the results
//! directory, then the files matching the report pattern below the report
//! directory.

use clap::Args;
use hs_core::{UploadInputs, UploadPhase};

use super::{StorageOverrides, finish};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Publish results and the generated report
#[derive(Args, Debug, Default)]
pub struct UploadArgs {
    /// Bucket receiving the results and report
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// Key prefix for the uploaded results
    #[arg(long, env = "BUCKET_RESULTS_PATH")]
    pub bucket_results_path: Option<String>,

    /// Key prefix for the uploaded report
    #[arg(long, env = "BUCKET_REPORT_PATH")]
    pub bucket_report_path: Option<String>,

    /// Local directory of the test results
    #[arg(long, env = "ALLURE_RESULTS_PATH")]
    pub allure_results_path: Option<String>,

    /// Glob selecting result files, relative to the results directory
    #[arg(long, env = "ALLURE_RESULTS_PATTERN")]
    pub allure_results_pattern: Option<String>,

    /// Local directory of the generated report
    #[arg(long, env = "ALLURE_REPORT_PATH")]
    pub allure_report_path: Option<String>,

    /// Glob selecting report files, relative to the report directory
    #[arg(long, env = "ALLURE_REPORT_PATTERN")]
    pub allure_report_pattern: Option<String>,
}

impl From<UploadArgs> for UploadInputs {
    fn from(args: UploadArgs) -> Self {
        Self {
            bucket_name: args.bucket_name,
            bucket_results_path: args.bucket_results_path,
            bucket_report_path: args.bucket_report_path,
            results_path: args.allure_results_path,
            results_pattern: args.allure_results_pattern,
            report_path: args.allure_report_path,
            report_pattern: args.allure_report_pattern,
        }
    }
}

/// Execute the upload command
pub async fn execute(
    args: UploadArgs,
    overrides: &StorageOverrides,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let phase = match UploadPhase::new(args.into()) {
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

    let spinner = Spinner::start(&output_config, "Uploading results and report");
    let result = phase.run(&bucket).await;
    spinner.finish_and_clear();

    finish(&formatter, result, "Uploaded")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn complete_args() -> UploadArgs {
        UploadArgs {
            bucket_name: Some("ci-reports".into()),
            bucket_results_path: None,
            bucket_report_path: Some("report".into()),
            allure_results_path: Some("allure-results".into()),
            allure_results_pattern: Some("*".into()),
            allure_report_path: Some("allure-report".into()),
            allure_report_pattern: Some("**/*".into()),
        }
    }

    #[tokio::test]
    async fn test_missing_pattern_is_usage_error() {
        let args = UploadArgs {
            allure_report_pattern: None,
            ..complete_args()
        };
        let output_config = OutputConfig {
            quiet: true,
            ..Default::default()
        };

        let code = execute(args, &StorageOverrides::default(), output_config).await;
        assert_eq!(code, ExitCode::UsageError);
    }

    #[tokio::test]
    async fn test_bad_config_file_is_usage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "schema_version = \"one\"").unwrap();

        let overrides = StorageOverrides {
            config: Some(path),
            ..Default::default()
        };
        let output_config = OutputConfig {
            quiet: true,
            ..Default::default()
        };

        let code = execute(complete_args(), &overrides, output_config).await;
        assert_eq!(code, ExitCode::UsageError);
    }

    #[test]
    fn test_args_into_inputs() {
        let inputs: UploadInputs = complete_args().into();
        assert_eq!(inputs.bucket_results_path, None);
        assert_eq!(inputs.report_pattern.as_deref(), Some("**/*"));
        assert_eq!(inputs.results_path.as_deref(), Some("allure-results"));
    }
}
