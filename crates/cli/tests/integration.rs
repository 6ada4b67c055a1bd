//! Integration tests for history-sync
//!
//! These tests require a running S3-compatible server and an existing bucket.
//!
//! Run with:
//! ```bash
//! # Start a MinIO container and create the bucket
//! docker run -d --name minio -p 9000:9000 \
//!     -e MINIO_ROOT_USER=accesskey \
//!     -e MINIO_ROOT_PASSWORD=secretkey \
//!     minio/minio server /data
//!
//! # Run tests
//! TEST_S3_ENDPOINT=http://localhost:9000 TEST_S3_ACCESS_KEY=accesskey \
//! TEST_S3_SECRET_KEY=secretkey TEST_S3_BUCKET=history-sync-test \
//!     cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// S3 test configuration from environment
struct TestConfig {
    endpoint: String,
    access_key: String,
    secret_key: String,
    bucket: String,
}

fn get_test_config() -> Option<TestConfig> {
    Some(TestConfig {
        endpoint: std::env::var("TEST_S3_ENDPOINT").ok()?,
        access_key: std::env::var("TEST_S3_ACCESS_KEY").ok()?,
        secret_key: std::env::var("TEST_S3_SECRET_KEY").ok()?,
        bucket: std::env::var("TEST_S3_BUCKET").ok()?,
    })
}

/// Write a config file pointing at the test server
fn write_config(dir: &Path, config: &TestConfig) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        r#"
schema_version = 1

[storage]
endpoint = "{}"
region = "us-east-1"
bucket_lookup = "path"
access_key = "{}"
secret_key = "{}"
"#,
        config.endpoint, config.access_key, config.secret_key
    );
    std::fs::write(&path, content).expect("Failed to write config");
    path
}

fn run(args: &[&str], config_path: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_history-sync"))
        .args(args)
        .arg("--config")
        .arg(config_path)
        .arg("--json")
        .output()
        .expect("Failed to execute history-sync")
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Unique key prefix so concurrent runs don't collide
fn unique_prefix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("it-{nanos}")
}

#[test]
fn test_upload_then_download_history() {
    let Some(config) = get_test_config() else {
        eprintln!("Skipping: TEST_S3_* not set");
        return;
    };

    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    let config_path = write_config(root, &config);
    let prefix = unique_prefix();
    let report_prefix = format!("{prefix}/report");

    write(root, "allure-results/1-result.json", "{}");
    write(root, "allure-report/index.html", "<html/>");
    write(root, "allure-report/history/history-trend.json", "[1]");
    write(root, "allure-report/history/nested/retry.json", "[2]");

    let results_path = root.join("allure-results").to_string_lossy().into_owned();
    let report_path = root.join("allure-report").to_string_lossy().into_owned();
    let results_prefix = format!("{prefix}/results");

    let output = run(
        &[
            "upload",
            "--bucket-name",
            &config.bucket,
            "--bucket-results-path",
            &results_prefix,
            "--bucket-report-path",
            &report_prefix,
            "--allure-results-path",
            &results_path,
            "--allure-results-pattern",
            "*",
            "--allure-report-path",
            &report_path,
            "--allure-report-pattern",
            "**/*",
        ],
        &config_path,
    );
    assert!(
        output.status.success(),
        "upload failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["transferred"].as_array().unwrap().len(), 4);

    let next_run = root.join("next-results");
    let next_run_path = next_run.to_string_lossy().into_owned();
    let output = run(
        &[
            "download",
            "--bucket-name",
            &config.bucket,
            "--bucket-report-path",
            &report_prefix,
            "--allure-results-path",
            &next_run_path,
        ],
        &config_path,
    );
    assert!(
        output.status.success(),
        "download failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(
        std::fs::read_to_string(next_run.join("history/history-trend.json")).unwrap(),
        "[1]"
    );
    assert_eq!(
        std::fs::read_to_string(next_run.join("history/nested/retry.json")).unwrap(),
        "[2]"
    );
    assert!(!next_run.join("history/index.html").exists());
}

#[test]
fn test_download_empty_prefix_succeeds() {
    let Some(config) = get_test_config() else {
        eprintln!("Skipping: TEST_S3_* not set");
        return;
    };

    let workspace = TempDir::new().unwrap();
    let config_path = write_config(workspace.path(), &config);
    let results = workspace.path().join("allure-results");

    let output = run(
        &[
            "download",
            "--bucket-name",
            &config.bucket,
            "--bucket-report-path",
            &unique_prefix(),
            "--allure-results-path",
            &results.to_string_lossy(),
        ],
        &config_path,
    );

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["transferred"].as_array().unwrap().is_empty());
}
