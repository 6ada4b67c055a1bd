//! ObjectStore trait definition
//!
//! This trait defines the storage operations the transfer logic needs.
//! It keeps the core decoupled from the specific S3 SDK implementation.

use async_trait::async_trait;

use crate::error::Result;

/// Identity of a stored object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// ETag without the surrounding quotes, when the backend reports one
    pub etag: Option<String>,
}

impl ObjectInfo {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            etag: None,
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}

/// Result of a list operation
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    /// Listed objects
    pub items: Vec<ObjectInfo>,

    /// Whether the result is truncated (more items available)
    pub truncated: bool,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Options for list operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Prefix to filter by
    pub prefix: Option<String>,

    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Trait for S3-compatible storage operations
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects in a bucket
    ///
    /// Entries without a key are dropped by the implementation.
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult>;

    /// Get object content as bytes
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write an object, replacing any existing one at `key`
    ///
    /// The returned info carries the ETag assigned by the backend.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo>;
}
