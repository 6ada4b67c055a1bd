//! CI phases
//!
//! The pre-run phase restores the report history from the bucket into the
//! results directory, so the next report can show trends. The post-run phase
//! pushes the new results and the generated report.
//!
//! Inputs arrive as optional strings (an unset CI input and an empty one look
//! the same) and are validated before any transfer starts.

use std::path::Path;

use crate::bucket::{Bucket, TransferReport};
use crate::error::{Error, Result};
use crate::path;

/// Folder holding the report history, both in the bucket and locally
const HISTORY_DIR: &str = "history";

fn required(name: &str, value: Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(Error::Config(format!(
            "Input required and not supplied: {name}"
        ))),
    }
}

fn optional(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Raw inputs of the download phase
#[derive(Debug, Clone, Default)]
pub struct DownloadInputs {
    pub bucket_name: Option<String>,
    pub bucket_report_path: Option<String>,
    pub results_path: Option<String>,
}

/// Validated download phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPhase {
    pub bucket_name: String,
    pub bucket_report_path: String,
    pub results_path: String,
}

impl DownloadPhase {
    pub fn new(inputs: DownloadInputs) -> Result<Self> {
        Ok(Self {
            bucket_name: required("bucket-name", inputs.bucket_name)?,
            bucket_report_path: optional(inputs.bucket_report_path),
            results_path: required("allure-results-path", inputs.results_path)?,
        })
    }

    /// Key prefix of the stored history
    pub fn source(&self) -> String {
        path::join(path::clean_right(&self.bucket_report_path), HISTORY_DIR)
    }

    /// Local directory receiving the history
    pub fn target(&self) -> String {
        Path::new(&self.results_path)
            .join(HISTORY_DIR)
            .to_string_lossy()
            .into_owned()
    }

    pub async fn run(&self, bucket: &Bucket) -> Result<TransferReport> {
        tracing::info!("Download report history");
        bucket.download(&self.source(), &self.target()).await
    }
}

/// A local directory and the glob selecting files below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSource {
    pub path: String,
    pub pattern: String,
}

/// Raw inputs of the upload phase
#[derive(Debug, Clone, Default)]
pub struct UploadInputs {
    pub bucket_name: Option<String>,
    pub bucket_results_path: Option<String>,
    pub bucket_report_path: Option<String>,
    pub results_path: Option<String>,
    pub results_pattern: Option<String>,
    pub report_path: Option<String>,
    pub report_pattern: Option<String>,
}

/// Validated upload phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPhase {
    pub bucket_name: String,
    pub bucket_results_path: String,
    pub bucket_report_path: String,
    pub results: LocalSource,
    pub report: LocalSource,
}

impl UploadPhase {
    pub fn new(inputs: UploadInputs) -> Result<Self> {
        Ok(Self {
            bucket_name: required("bucket-name", inputs.bucket_name)?,
            bucket_results_path: optional(inputs.bucket_results_path),
            bucket_report_path: optional(inputs.bucket_report_path),
            results: LocalSource {
                path: required("allure-results-path", inputs.results_path)?,
                pattern: required("allure-results-pattern", inputs.results_pattern)?,
            },
            report: LocalSource {
                path: required("allure-report-path", inputs.report_path)?,
                pattern: required("allure-report-pattern", inputs.report_pattern)?,
            },
        })
    }

    /// Upload results, then the report
    ///
    /// A batch-level error in the results upload stops the phase before the
    /// report is touched. Per-file failures of both batches end up in the
    /// returned report.
    pub async fn run(&self, bucket: &Bucket) -> Result<TransferReport> {
        tracing::info!("Upload results and report");

        let mut report = bucket
            .upload(
                &self.results.path,
                &self.results.pattern,
                &self.bucket_results_path,
            )
            .await?;

        report.merge(
            bucket
                .upload(
                    &self.report.path,
                    &self.report.pattern,
                    &self.bucket_report_path,
                )
                .await?,
        );

        Ok(report)
    }
}
