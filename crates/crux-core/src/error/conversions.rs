//! From trait implementations for CruxError conversions

use super::types::CruxError;

impl From<serde_json::Error> for CruxError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}
