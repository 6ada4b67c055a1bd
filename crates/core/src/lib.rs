//! hs-core: Core library for the history-sync CI helper
//!
//! This crate provides the core functionality for history-sync, including:
//! - Configuration management
//! - Path normalization and key/path mapping
//! - Local file enumeration
//! - ObjectStore trait for storage operations
//! - The Bucket facade driving batch downloads and uploads
//! - The download (pre-run) and upload (post-run) phases
//!
//! This crate is independent of any specific S3 SDK, so the transfer logic
//! can be tested against in-memory or mocked stores.

pub mod bucket;
pub mod config;
pub mod error;
pub mod files;
pub mod path;
pub mod phase;
pub mod traits;

#[cfg(test)]
mod testing;

pub use bucket::{Bucket, Transfer, TransferFailure, TransferReport};
pub use config::{Config, ConfigManager, StorageConfig, TransferConfig};
pub use error::{Error, Result};
pub use phase::{DownloadInputs, DownloadPhase, LocalSource, UploadInputs, UploadPhase};
pub use traits::{ListOptions, ListResult, ObjectInfo, ObjectStore};
