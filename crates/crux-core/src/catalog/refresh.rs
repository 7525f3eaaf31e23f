//! Manual catalog refresh
//!
//! Overwrites the provider cache from an explicit source, outside the
//! fetch-once path used at startup.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::client::{CatalogClient, HttpCatalogClient};
use super::disk_cache::DiskCache;
use super::embedded::embedded_providers;
use super::types::{CatalogPayload, ProviderDescriptor};
use crate::error::{CruxError, CruxResult};

/// Where a manual refresh takes its catalog from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshSource {
    Embedded,
    /// Base URL of a catalog service
    Url(String),
    /// Local JSON file holding a provider list
    File(PathBuf),
}

impl RefreshSource {
    /// Interpret a command-line argument: `embedded`, an http(s) URL, or a path
    pub fn parse(arg: &str) -> Self {
        if arg == "embedded" {
            Self::Embedded
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for RefreshSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("embedded catalog"),
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Replace the cache at `cache_path`, returning the number of providers written
pub async fn refresh_catalog_cache(source: &RefreshSource, cache_path: &Path) -> CruxResult<usize> {
    let providers: Vec<ProviderDescriptor> = match source {
        RefreshSource::Embedded => embedded_providers(),
        RefreshSource::Url(url) => HttpCatalogClient::providers(url)
            .fetch("")
            .await
            .map_err(|e| CruxError::catalog(format!("Failed to fetch {}: {}", url, e), "providers"))?,
        RefreshSource::File(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                CruxError::io(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                CruxError::config_with_context(
                    format!("Failed to parse provider list: {}", e),
                    format!("Reading '{}'", path.display()),
                )
            })?
        }
    };

    if providers.is_empty_catalog() {
        return Err(CruxError::catalog(
            format!("{} contains no providers", source),
            "providers",
        ));
    }

    DiskCache::new(cache_path).store(&providers)?;
    info!(
        "Updated provider cache from {} ({} providers)",
        source,
        providers.len()
    );
    Ok(providers.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_source() {
        assert_eq!(RefreshSource::parse("embedded"), RefreshSource::Embedded);
        assert_eq!(
            RefreshSource::parse("https://catalog.example.com"),
            RefreshSource::Url("https://catalog.example.com".into())
        );
        assert_eq!(
            RefreshSource::parse("./providers.json"),
            RefreshSource::File(PathBuf::from("./providers.json"))
        );
    }

    #[tokio::test]
    async fn test_refresh_from_embedded() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("providers.json");

        let count = refresh_catalog_cache(&RefreshSource::Embedded, &cache_path)
            .await
            .unwrap();

        let (cached, _): (Vec<ProviderDescriptor>, _) = DiskCache::new(&cache_path).get().unwrap();
        assert_eq!(count, embedded_providers().len());
        assert_eq!(cached, embedded_providers());
    }

    #[tokio::test]
    async fn test_refresh_from_file_overwrites() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("providers.json");
        DiskCache::new(&cache_path).store(&embedded_providers()).unwrap();

        let source_path = dir.path().join("custom.json");
        fs::write(
            &source_path,
            r#"[{"id": "local", "name": "Local", "type": "openai-compat", "models": [{"id": "llama"}]}]"#,
        )
        .unwrap();

        let count = refresh_catalog_cache(&RefreshSource::File(source_path), &cache_path)
            .await
            .unwrap();

        let (cached, _): (Vec<ProviderDescriptor>, _) = DiskCache::new(&cache_path).get().unwrap();
        assert_eq!(count, 1);
        assert_eq!(cached[0].id, "local");
    }

    #[tokio::test]
    async fn test_refresh_rejects_empty_file() {
        let dir = tempdir().unwrap();
        let source_path = dir.path().join("empty.json");
        fs::write(&source_path, "[]").unwrap();

        let result = refresh_catalog_cache(
            &RefreshSource::File(source_path),
            &dir.path().join("providers.json"),
        )
        .await;
        assert!(matches!(result, Err(CruxError::Catalog { .. })));
    }
}
