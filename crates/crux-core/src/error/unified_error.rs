//! UnifiedError trait implementation for CruxError

use super::types::{CruxError, UnifiedError};

impl UnifiedError for CruxError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "CRUX_CONFIG",
            Self::Resolve(_) => "CRUX_RESOLVE",
            Self::Cache { .. } => "CRUX_CACHE",
            Self::Catalog { .. } => "CRUX_CATALOG",
            Self::Validation { .. } => "CRUX_VALIDATION",
            Self::NoProviders => "CRUX_NO_PROVIDERS",
            Self::Io { .. } => "CRUX_IO",
            Self::Json { .. } => "CRUX_JSON",
            Self::Http { .. } => "CRUX_HTTP",
            Self::Other { .. } => "CRUX_OTHER",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Config { message, .. }
            | Self::Cache { message, .. }
            | Self::Catalog { message, .. }
            | Self::Validation { message, .. }
            | Self::Io { message, .. }
            | Self::Json { message }
            | Self::Http { message, .. }
            | Self::Other { message, .. } => message.clone(),
            Self::Resolve(err) => err.to_string(),
            Self::NoProviders => "No valid providers configured".to_string(),
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } | Self::Other { context, .. } => context.as_deref(),
            Self::Cache { path, .. } | Self::Io { path, .. } => path.as_deref(),
            Self::Catalog { catalog, .. } => catalog.as_deref(),
            Self::Validation { provider, .. } => provider.as_deref(),
            Self::Http { url, .. } => url.as_deref(),
            Self::Resolve(_) | Self::Json { .. } | Self::NoProviders => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Catalog { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CruxError::config("x").error_code(), "CRUX_CONFIG");
        assert_eq!(CruxError::NoProviders.error_code(), "CRUX_NO_PROVIDERS");
        assert_eq!(
            CruxError::validation("bad model", "bedrock").error_code(),
            "CRUX_VALIDATION"
        );
    }

    #[test]
    fn test_context_and_retryable() {
        let err = CruxError::config_with_context("parse failed", "reading crux.json");
        assert_eq!(err.context(), Some("reading crux.json"));
        assert!(!err.is_retryable());

        let err = CruxError::catalog("empty catalog from remote", "providers");
        assert_eq!(err.context(), Some("providers"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = CruxError::cache_at("read failed", "/tmp/providers.json");
        assert_eq!(err.to_string(), "Cache error: read failed");
        assert_eq!(err.message(), "read failed");
    }
}
