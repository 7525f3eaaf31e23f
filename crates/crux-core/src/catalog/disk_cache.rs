//! Single-file JSON blob cache
//!
//! Each catalog is stored as one JSON document holding exactly its payload.
//! Reads report a content validator (SHA-256 of the raw bytes) that is sent
//! back to the remote catalog as a conditional-request token.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CruxError, CruxResult};

/// JSON file cache for one value of type `T`
#[derive(Debug, Clone)]
pub struct DiskCache<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> DiskCache<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the cached value together with its validator.
    ///
    /// Missing or unreadable files are errors; callers decide on fallbacks.
    pub fn get(&self) -> CruxResult<(T, String)> {
        let bytes = fs::read(&self.path).map_err(|e| {
            CruxError::cache_at(
                format!("Failed to read cache: {}", e),
                self.path.display().to_string(),
            )
        })?;

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            CruxError::cache_at(
                format!("Failed to parse cache: {}", e),
                self.path.display().to_string(),
            )
        })?;

        Ok((value, validator_for(&bytes)))
    }

    /// Serialize and write the value, creating parent directories as needed
    pub fn store(&self, value: &T) -> CruxResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CruxError::cache_at(
                    format!("Failed to create cache dir: {}", e),
                    parent.display().to_string(),
                )
            })?;
        }

        let content = serde_json::to_vec_pretty(value)
            .map_err(|e| CruxError::cache(format!("Failed to serialize cache: {}", e)))?;

        write_private(&self.path, &content).map_err(|e| {
            CruxError::cache_at(
                format!("Failed to write cache: {}", e),
                self.path.display().to_string(),
            )
        })?;

        debug!("Stored cache at {}", self.path.display());
        Ok(())
    }
}

/// Hex SHA-256 of the raw cached bytes
pub fn validator_for(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write a file readable only by its owner
pub(crate) fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(content)?;

    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        items: Vec<u32>,
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<Payload>::new(dir.path().join("nested/dir/payload.json"));
        let value = Payload {
            name: "catalog".to_string(),
            items: vec![1, 2, 3],
        };

        cache.store(&value).unwrap();
        let (loaded, validator) = cache.get().unwrap();

        assert_eq!(loaded, value);
        assert_eq!(validator.len(), 64);
    }

    #[test]
    fn test_validator_tracks_content() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<Vec<u32>>::new(dir.path().join("v.json"));

        cache.store(&vec![1]).unwrap();
        let (_, first) = cache.get().unwrap();
        let (_, again) = cache.get().unwrap();
        cache.store(&vec![2]).unwrap();
        let (_, second) = cache.get().unwrap();

        assert_eq!(first, again);
        assert_ne!(first, second);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<Vec<u32>>::new(dir.path().join("absent.json"));
        assert!(matches!(cache.get(), Err(CruxError::Cache { .. })));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let cache = DiskCache::<Vec<u32>>::new(&path);
        assert!(cache.get().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.json");
        fs::write(&path, "[]").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        DiskCache::<Vec<u32>>::new(&path).store(&vec![7]).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
