//! Bucket facade
//!
//! Moves files between one bucket and the local filesystem. A download maps
//! every key under a prefix to a path below a target directory; an upload
//! maps every file matched by a glob to a key below a target prefix.
//!
//! Transfers of a batch run concurrently and every outcome is collected
//! before the batch returns. Failures that affect the whole batch (listing,
//! malformed pattern) are returned as errors; failures of single files are
//! recorded in the [`TransferReport`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Serialize, Serializer};

use crate::config::DEFAULT_CONCURRENCY;
use crate::error::{Error, Result};
use crate::files;
use crate::path;
use crate::traits::{ListOptions, ObjectStore};

/// Keys requested per listing page
const LIST_PAGE_SIZE: i32 = 1000;

/// One completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    /// Object key or local path that was read
    pub source: String,
    /// Local path or object key that was written
    pub target: String,
    /// Bytes moved
    pub size_bytes: u64,
    /// Content type attached to an uploaded object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// ETag the backend assigned to an uploaded object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// One failed transfer
#[derive(Debug, Serialize)]
pub struct TransferFailure {
    pub source: String,
    pub target: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: Error,
}

fn serialize_error<S: Serializer>(
    error: &Error,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Outcome of one or more batches
#[derive(Debug, Default, Serialize)]
pub struct TransferReport {
    pub transferred: Vec<Transfer>,
    /// Listed keys that do not map to a file below the target
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub failed: Vec<TransferFailure>,
}

impl TransferReport {
    fn from_outcomes(
        outcomes: Vec<std::result::Result<Transfer, TransferFailure>>,
        skipped: Vec<String>,
    ) -> Self {
        let mut report = Self {
            skipped,
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                Ok(transfer) => report.transferred.push(transfer),
                Err(failure) => report.failed.push(failure),
            }
        }

        report.sort();
        report
    }

    fn sort(&mut self) {
        self.transferred.sort_by(|a, b| a.source.cmp(&b.source));
        self.failed.sort_by(|a, b| a.source.cmp(&b.source));
        self.skipped.sort();
    }

    /// Number of attempted transfers
    pub fn total(&self) -> usize {
        self.transferred.len() + self.failed.len()
    }

    /// Total bytes moved by successful transfers
    pub fn total_bytes(&self) -> u64 {
        self.transferred.iter().map(|t| t.size_bytes).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Append the outcomes of another batch
    pub fn merge(&mut self, other: TransferReport) {
        self.transferred.extend(other.transferred);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
        self.sort();
    }

    /// Turn a report with failed transfers into [`Error::PartialFailure`]
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::PartialFailure {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// A bucket bound to a storage backend
pub struct Bucket {
    store: Arc<dyn ObjectStore>,
    name: String,
    concurrency: usize,
}

impl Bucket {
    /// Create a facade over `store` for the bucket `name`
    pub fn new(store: Arc<dyn ObjectStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the number of transfers in flight per batch
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// List every key under `prefix`, following continuation tokens
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let options = ListOptions {
                prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
                max_keys: Some(LIST_PAGE_SIZE),
                continuation_token: continuation_token.take(),
            };

            let page = self.store.list_objects(&self.name, options).await?;
            keys.extend(
                page.items
                    .into_iter()
                    .map(|item| item.key)
                    .filter(|key| !key.is_empty()),
            );

            match page.continuation_token {
                Some(token) if page.truncated => {
                    tracing::debug!(prefix, listed = keys.len(), "Listing next page");
                    continuation_token = Some(token);
                }
                None if page.truncated => {
                    tracing::warn!(
                        prefix,
                        listed = keys.len(),
                        "Listing truncated without a continuation token"
                    );
                    break;
                }
                _ => break,
            }
        }

        Ok(keys)
    }

    /// Download every object under `source` into the directory `target`
    pub async fn download(&self, source: &str, target: &str) -> Result<TransferReport> {
        let source = path::clean(source);
        let target = path::clean_right(target);

        let keys = self.list_keys(source).await?;

        let mut skipped = Vec::new();
        let mut jobs = Vec::with_capacity(keys.len());
        for key in keys {
            let local = path::relative_key(&key, source)
                .filter(|relative| !relative.is_empty() && !relative.ends_with('/'))
                .map(|relative| path::local_path_for_key(target, relative));

            match local {
                Some(local) => jobs.push((key, local)),
                None => {
                    tracing::debug!(key = %key, source, "Skipping key outside source prefix");
                    skipped.push(key);
                }
            }
        }

        let outcomes = stream::iter(jobs)
            .map(|(key, local)| async move {
                match local {
                    Ok(local) => self.download_file(key, local).await,
                    Err(error) => {
                        tracing::warn!(key = %key, %error, "Cannot map key to a local path");
                        Err(TransferFailure {
                            source: key,
                            target: target.to_string(),
                            error,
                        })
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(TransferReport::from_outcomes(outcomes, skipped))
    }

    async fn download_file(
        &self,
        key: String,
        local: PathBuf,
    ) -> std::result::Result<Transfer, TransferFailure> {
        let target = local.display().to_string();

        match self.fetch_to(&key, &local).await {
            Ok(size_bytes) => {
                tracing::info!("download: {key} -> {target}");
                Ok(Transfer {
                    source: key,
                    target,
                    size_bytes,
                    content_type: None,
                    etag: None,
                })
            }
            Err(error) => {
                tracing::warn!(key = %key, %error, "Download failed");
                Err(TransferFailure {
                    source: key,
                    target,
                    error,
                })
            }
        }
    }

    async fn fetch_to(&self, key: &str, local: &Path) -> Result<u64> {
        if let Some(parent) = local.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = self.store.get_object(&self.name, key).await?;
        tokio::fs::write(local, &data).await?;

        Ok(data.len() as u64)
    }

    /// Upload every file matching `prefix/pattern` below the key prefix `target`
    pub async fn upload(&self, prefix: &str, pattern: &str, target: &str) -> Result<TransferReport> {
        let prefix = path::clean_right(prefix);
        let pattern = path::clean_left(pattern);
        let target = path::clean_right(target);

        let files = files::enumerate(&path::full_pattern(prefix, pattern))?;

        let outcomes = stream::iter(files)
            .map(|file| {
                let key = path::remote_key(target, &path::relative_file(&file, prefix));
                self.upload_file(file, key)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(TransferReport::from_outcomes(outcomes, Vec::new()))
    }

    async fn upload_file(
        &self,
        file: PathBuf,
        key: String,
    ) -> std::result::Result<Transfer, TransferFailure> {
        let source = file.display().to_string();
        let content_type = files::content_type(&file);

        let result = async {
            let data = tokio::fs::read(&file).await?;
            let size_bytes = data.len() as u64;
            let info = self
                .store
                .put_object(&self.name, &key, data, content_type.clone())
                .await?;
            Ok::<_, Error>((size_bytes, info.etag))
        }
        .await;

        match result {
            Ok((size_bytes, etag)) => {
                tracing::info!("upload: {source} -> {key}");
                Ok(Transfer {
                    source,
                    target: key,
                    size_bytes,
                    content_type,
                    etag,
                })
            }
            Err(error) => {
                tracing::warn!(file = %source, %error, "Upload failed");
                Err(TransferFailure {
                    source,
                    target: key,
                    error,
                })
            }
        }
    }
}
