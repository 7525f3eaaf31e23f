//! Core error types and traits for Crux

use thiserror::Error;

use crate::config::resolver::ResolveError;

/// Result type alias for Crux operations
pub type CruxResult<T> = Result<T, CruxError>;

/// Unified error trait implemented by [`CruxError`].
///
/// Gives callers a stable code for programmatic handling in addition to the
/// human readable message.
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> String;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Main error type for Crux
#[derive(Error, Debug, Clone)]
pub enum CruxError {
    /// Configuration loading or persistence errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Variable or command substitution failed
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Disk cache read/write errors
    #[error("Cache error: {message}")]
    Cache {
        message: String,
        path: Option<String>,
    },

    /// Remote catalog errors reported next to a still usable result
    #[error("Catalog error: {message}")]
    Catalog {
        message: String,
        catalog: Option<String>,
    },

    /// A provider configuration that must abort the whole configuration pass
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        provider: Option<String>,
    },

    /// No enabled provider survived configuration
    #[error("No valid providers configured")]
    NoProviders,

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// HTTP request errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}
