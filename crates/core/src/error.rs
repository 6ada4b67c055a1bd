//! Error types for hs-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for hs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for hs-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error: missing input, bad config file, invalid setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path or key
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Malformed glob pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or storage backend error
    #[error("Network error: {0}")]
    Network(String),

    /// Some transfers of a batch failed
    #[error("{failed} of {total} transfer(s) failed")]
    PartialFailure { failed: usize, total: usize },

    /// General error
    #[error("{0}")]
    General(String),
}

impl From<glob::PatternError> for Error {
    fn from(err: glob::PatternError) -> Self {
        Error::InvalidPattern(err.to_string())
    }
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::InvalidPattern(_) => 2, // UsageError
            Error::Config(_) | Error::TomlParse(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Network(_) => 3,                                // NetworkError
            Error::Auth(_) => 4,                                   // AuthError
            Error::NotFound(_) => 5,                               // NotFound
            Error::PartialFailure { .. } => 6,                     // PartialFailure
            _ => 1,                                                // GeneralError
        }
    }
}
