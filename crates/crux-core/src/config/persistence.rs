//! Data-config persistence
//!
//! Runtime changes (model choices, recent history, credentials) are written
//! as sparse dot-path updates to a single data file. Fields not touched by
//! an update are preserved byte-for-byte in meaning.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::disk_cache::write_private;
use crate::error::{CruxError, CruxResult};

/// Reader/writer for the data config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPersistence {
    path: PathBuf,
}

impl ConfigPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set a field using a dot path such as `models.large`
    pub fn set_field(&self, path: &str, value: Value) -> CruxResult<()> {
        ConfigUpdate::new().set(path, value).apply(self)
    }

    /// Read a field; `None` if the file or the path doesn't exist
    pub fn get_field(&self, path: &str) -> Option<Value> {
        let document = self.load().ok()?;
        get_nested_value(&document, path).cloned()
    }

    pub fn remove_field(&self, path: &str) -> CruxResult<()> {
        ConfigUpdate::new().remove(path).apply(self)
    }

    fn load(&self) -> CruxResult<Value> {
        if !self.path.exists() {
            return Ok(Value::Object(Map::new()));
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| CruxError::io(format!("Failed to read {}: {}", self.path.display(), e)))?;

        if content.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_str(&content).map_err(|e| {
            CruxError::config(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, document: &Value) -> CruxResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CruxError::io(format!("Failed to create directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| CruxError::json(format!("Failed to serialize config: {}", e)))?;

        write_private(&self.path, content.as_bytes())
            .map_err(|e| CruxError::io(format!("Failed to write {}: {}", self.path.display(), e)))?;

        debug!("Saved data config to {}", self.path.display());
        Ok(())
    }
}

fn set_nested_value(root: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return;
    };

    let mut current = root;
    for part in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        if !current.get(*part).is_some_and(Value::is_object) {
            current[*part] = Value::Object(Map::new());
        }
        current = match current.get_mut(*part) {
            Some(next) => next,
            None => return,
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    current[*last] = value;
}

fn get_nested_value<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, part| current.get(part))
}

fn remove_nested_value(root: &mut Value, path: &str) {
    let Some((parent_path, key)) = path.rsplit_once('.') else {
        if let Some(object) = root.as_object_mut() {
            object.remove(path);
        }
        return;
    };

    let mut current = root;
    for part in parent_path.split('.') {
        match current.get_mut(part) {
            Some(next) => current = next,
            None => return,
        }
    }

    if let Some(object) = current.as_object_mut() {
        object.remove(key);
    }
}

/// Batch of sets and removals applied with one read and one write
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    fields: Vec<(String, Value)>,
    removals: Vec<String>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<String>, value: Value) -> Self {
        self.fields.push((path.into(), value));
        self
    }

    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.removals.push(path.into());
        self
    }

    pub fn apply(self, persistence: &ConfigPersistence) -> CruxResult<()> {
        let mut document = persistence.load()?;

        // Removals first so a batch can replace a subtree
        for path in self.removals {
            remove_nested_value(&mut document, &path);
        }
        for (path, value) in self.fields {
            set_nested_value(&mut document, &path, value);
        }

        persistence.save(&document)
    }
}
