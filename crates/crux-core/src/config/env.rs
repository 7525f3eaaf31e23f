//! Environment variable snapshot
//!
//! The configuration pass reads many environment signals. They are read
//! through an [`Environment`] value instead of `std::env` so a whole startup
//! can run against a fixed map.

use std::collections::HashMap;
use std::env;

/// Immutable view of environment variables
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    /// Build an environment from explicit pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable. Empty values are reported as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether a variable is set to a non-empty value
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Interpret a variable as a boolean flag (`1`, `true`, `yes`, `on`)
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }

    /// Return a copy with one variable overridden
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}
