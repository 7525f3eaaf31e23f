//! Provider catalogs
//!
//! The known-provider catalog comes from two synchronizers: the
//! multi-provider list and the single hosted-provider entry. Both are owned
//! by a [`Catalogs`] service object created once at startup and driven
//! concurrently under one shared deadline.

pub mod client;
pub mod disk_cache;
pub mod embedded;
pub mod refresh;
pub mod sync;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::config::env::Environment;
use crate::error::CruxError;
use client::{CatalogClient, HttpCatalogClient};
pub use client::FetchError;
pub use disk_cache::DiskCache;
pub use embedded::{PREMIUM_PROVIDER_ID, embedded_premium_provider, embedded_providers};
pub use refresh::{RefreshSource, refresh_catalog_cache};
pub use sync::{CatalogSync, SyncOutcome};
pub use types::{CatalogPayload, ModelDescriptor, ProviderDescriptor, ProviderType};

/// Shared deadline for synchronizing every catalog at startup
pub const SYNC_DEADLINE: Duration = Duration::from_secs(45);

/// Cache file name of the multi-provider catalog
pub const PROVIDERS_CACHE_FILE: &str = "providers.json";
/// Cache file name of the hosted provider entry
pub const PREMIUM_CACHE_FILE: &str = "premium.json";

/// Forces embedded catalogs
pub const DISABLE_AUTO_UPDATE_ENV: &str = "CRUX_DISABLE_PROVIDER_AUTO_UPDATE";

/// Turns on the hosted premium entry
pub const ENABLE_PREMIUM_ENV: &str = "CRUX_ENABLE_PREMIUM";

/// Settings for building [`Catalogs`]
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Directory holding the cache files
    pub data_dir: PathBuf,
    /// Fetch from the remote catalogs; `false` uses embedded data only
    pub auto_update: bool,
    /// Synchronize the hosted provider entry as well
    pub premium_enabled: bool,
}

impl CatalogOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            auto_update: true,
            premium_enabled: false,
        }
    }

    /// Apply `CRUX_DISABLE_PROVIDER_AUTO_UPDATE` and `CRUX_ENABLE_PREMIUM`
    pub fn with_env(mut self, env: &Environment) -> Self {
        if env.flag(DISABLE_AUTO_UPDATE_ENV) {
            self.auto_update = false;
        }
        if env.flag(ENABLE_PREMIUM_ENV) {
            self.premium_enabled = true;
        }
        self
    }

    pub fn providers_cache_path(&self) -> PathBuf {
        self.data_dir.join(PROVIDERS_CACHE_FILE)
    }

    pub fn premium_cache_path(&self) -> PathBuf {
        self.data_dir.join(PREMIUM_CACHE_FILE)
    }
}

/// Known providers plus every error reported while synchronizing them
#[derive(Debug, Clone, Default)]
pub struct CatalogReport {
    pub providers: Vec<ProviderDescriptor>,
    pub errors: Vec<CruxError>,
}

/// Owner of both catalog synchronizers
pub struct Catalogs {
    providers: CatalogSync<Vec<ProviderDescriptor>>,
    premium: Option<CatalogSync<ProviderDescriptor>>,
}

impl Catalogs {
    /// Build with explicit clients
    pub fn new(
        options: &CatalogOptions,
        providers_client: Arc<dyn CatalogClient<Vec<ProviderDescriptor>>>,
        premium_client: Arc<dyn CatalogClient<ProviderDescriptor>>,
    ) -> Self {
        let providers = CatalogSync::providers();
        providers.init(
            providers_client,
            options.providers_cache_path(),
            options.auto_update,
        );

        let premium = options.premium_enabled.then(|| {
            let premium = CatalogSync::premium();
            premium.init(
                premium_client,
                options.premium_cache_path(),
                options.auto_update,
            );
            premium
        });

        Self { providers, premium }
    }

    /// Build with HTTP clients pointed at the configured services
    pub fn from_env(options: &CatalogOptions, env: &Environment) -> Self {
        Self::new(
            options,
            Arc::new(HttpCatalogClient::providers_from_env(env)),
            Arc::new(HttpCatalogClient::premium_from_env(env)),
        )
    }

    /// Known providers, synchronized under the default shared deadline
    pub async fn known_providers(&self) -> CatalogReport {
        self.known_providers_until(Instant::now() + SYNC_DEADLINE)
            .await
    }

    /// Known providers, synchronized under the given deadline
    pub async fn known_providers_until(&self, deadline: Instant) -> CatalogReport {
        let premium_future = async {
            match &self.premium {
                Some(premium) => Some(premium.get(deadline).await),
                None => None,
            }
        };
        let (list, premium) = tokio::join!(self.providers.get(deadline), premium_future);

        let mut report = CatalogReport {
            providers: list.value,
            errors: list.error.into_iter().collect(),
        };

        if let Some(premium) = premium {
            if let Some(error) = premium.error {
                report.errors.push(error);
            }
            let entry = premium.value;
            if !entry.is_empty_catalog() && !report.providers.iter().any(|p| p.id == entry.id) {
                report.providers.push(entry);
            }
        }

        debug!(
            "Known providers: {} ({} sync errors)",
            report.providers.len(),
            report.errors.len()
        );
        report
    }
}

/// Default data directory (`~/.local/share/crux`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .unwrap_or_default()
        .join("crux")
}
