//! Layered configuration files
//!
//! Sources, lowest priority first:
//!
//! 1. global config `<config dir>/crux/crux.json`
//! 2. global data config `<data dir>/crux/crux.json`
//! 3. project files `.crux.json` and `crux.json`, from the filesystem root
//!    down to the working directory
//!
//! Documents are merged recursively: objects key by key, everything else
//! replaced by the higher-priority value.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::env::Environment;
use crate::error::{CruxError, CruxResult};

pub const APP_NAME: &str = "crux";
pub const CONFIG_FILE_NAME: &str = "crux.json";
pub const HIDDEN_CONFIG_FILE_NAME: &str = ".crux.json";

/// Every file that takes part in a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub global_config: PathBuf,
    /// Target of all runtime writes
    pub global_data: PathBuf,
    /// Project files, furthest from the working directory first
    pub project: Vec<PathBuf>,
}

impl ConfigPaths {
    /// Locate the global files and discover project files above `working_dir`
    pub fn discover(working_dir: &Path, env: &Environment) -> Self {
        Self {
            global_config: global_config_dir(env).join(CONFIG_FILE_NAME),
            global_data: global_data_dir(env).join(CONFIG_FILE_NAME),
            project: lookup_project_configs(working_dir),
        }
    }

    /// All sources, lowest priority first
    pub fn layered(&self) -> Vec<&Path> {
        let mut paths = vec![self.global_config.as_path(), self.global_data.as_path()];
        paths.extend(self.project.iter().map(PathBuf::as_path));
        paths
    }
}

/// Directory of the global config file; `CRUX_GLOBAL_CONFIG` overrides it
pub fn global_config_dir(env: &Environment) -> PathBuf {
    if let Some(dir) = env.get("CRUX_GLOBAL_CONFIG") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory of the data config and catalog caches; `CRUX_GLOBAL_DATA` overrides it
pub fn global_data_dir(env: &Environment) -> PathBuf {
    if let Some(dir) = env.get("CRUX_GLOBAL_DATA") {
        return PathBuf::from(dir);
    }
    crate::catalog::default_data_dir()
}

/// Project config files from the root down to `working_dir`
pub fn lookup_project_configs(working_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in working_dir.ancestors() {
        // Within one directory `crux.json` beats `.crux.json`
        for name in [CONFIG_FILE_NAME, HIDDEN_CONFIG_FILE_NAME] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                found.push(candidate);
            }
        }
    }
    found.reverse();
    found
}

/// Merge `overlay` into `base`; objects merge, everything else is replaced
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Read one config document; a missing or blank file is an empty object
pub fn read_config_file(path: &Path) -> CruxResult<Value> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        CruxError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_json::from_str(&content).map_err(|e| {
        CruxError::config_with_context(
            format!("Failed to parse JSON config: {}", e),
            format!("Deserializing configuration from '{}'", path.display()),
        )
    })?;
    if !value.is_object() {
        return Err(CruxError::config_with_context(
            "Config file must contain a JSON object",
            format!("Reading configuration from '{}'", path.display()),
        ));
    }
    Ok(value)
}

/// Read and merge documents in priority order
pub fn load_layered<P: AsRef<Path>>(paths: &[P]) -> CruxResult<Value> {
    let mut merged = Value::Object(Map::new());
    for path in paths {
        let path = path.as_ref();
        let document = read_config_file(path)?;
        if document.as_object().is_some_and(|o| !o.is_empty()) {
            debug!("Merging config from {}", path.display());
        }
        merge_json(&mut merged, document);
    }
    Ok(merged)
}
