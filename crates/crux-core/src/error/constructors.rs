//! Constructor methods for CruxError

use super::types::CruxError;

impl CruxError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
            path: None,
        }
    }

    /// Create a cache error for a specific file
    pub fn cache_at(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a catalog error for the named catalog
    pub fn catalog(message: impl Into<String>, catalog: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
            catalog: Some(catalog.into()),
        }
    }

    /// Create a pass-aborting validation error for a provider
    pub fn validation(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create a new JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            url: None,
            status_code: None,
        }
    }

    /// Create an HTTP error carrying the response status
    pub fn http_status(message: impl Into<String>, url: impl Into<String>, status: u16) -> Self {
        Self::Http {
            message: message.into(),
            url: Some(url.into()),
            status_code: Some(status),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            context: None,
        }
    }
}
