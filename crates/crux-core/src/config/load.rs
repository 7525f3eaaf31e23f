//! Startup orchestration
//!
//! Merges the layered files, synchronizes the catalogs, resolves providers
//! and fills both model slots.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::env::Environment;
use super::loader::{ConfigPaths, load_layered};
use super::model::Config;
use super::persistence::ConfigPersistence;
use super::providers::{ConfigureContext, configure_providers};
use super::resolver::{ShellVariableResolver, VariableResolver};
use super::selection::configure_selected_models;
use super::shell::SystemShell;
use crate::catalog::{CatalogOptions, Catalogs, DISABLE_AUTO_UPDATE_ENV, default_data_dir};
use crate::error::{CruxError, CruxResult};

/// A loaded configuration plus soft catalog errors worth surfacing
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub catalog_errors: Vec<CruxError>,
}

/// Builder for a configuration load
pub struct ConfigLoader {
    working_dir: PathBuf,
    env: Environment,
    paths: Option<ConfigPaths>,
    catalogs: Option<Catalogs>,
    resolver: Option<Arc<dyn VariableResolver>>,
}

impl ConfigLoader {
    /// Loader for `working_dir` reading the process environment
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            env: Environment::from_process(),
            paths: None,
            catalogs: None,
            resolver: None,
        }
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Use explicit file locations instead of discovering them
    pub fn with_paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn with_catalogs(mut self, catalogs: Catalogs) -> Self {
        self.catalogs = Some(catalogs);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn VariableResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    fn paths(&self) -> ConfigPaths {
        match &self.paths {
            Some(paths) => paths.clone(),
            None => ConfigPaths::discover(&self.working_dir, &self.env),
        }
    }

    /// Directory holding the catalog caches for this load.
    ///
    /// Reads the layered files for `options.data_directory`; nothing else
    /// is resolved.
    pub fn data_dir(&self) -> CruxResult<PathBuf> {
        let paths = self.paths();
        let config = read_merged(&paths)?;
        Ok(data_dir(&config, &paths, &self.working_dir))
    }

    pub async fn load(self) -> CruxResult<LoadedConfig> {
        let paths = self.paths();
        let mut config = read_merged(&paths)?;

        if self.env.flag(DISABLE_AUTO_UPDATE_ENV) {
            config.options.disable_provider_auto_update = true;
        }

        let data_dir = data_dir(&config, &paths, &self.working_dir);
        debug!("Using data directory {}", data_dir.display());

        let catalogs = match self.catalogs {
            Some(catalogs) => catalogs,
            None => {
                let mut options = CatalogOptions::new(&data_dir).with_env(&self.env);
                if config.options.disable_provider_auto_update {
                    options.auto_update = false;
                }
                Catalogs::from_env(&options, &self.env)
            }
        };
        let report = catalogs.known_providers().await;
        for error in &report.errors {
            warn!("{}", error);
        }

        let resolver = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(ShellVariableResolver::new(
                self.env.clone(),
                Arc::new(SystemShell::in_dir(&self.working_dir)),
            )),
        };

        config.persistence = Some(ConfigPersistence::new(&paths.global_data));
        config.working_dir = self.working_dir;

        let ctx = ConfigureContext {
            known: &report.providers,
            env: &self.env,
            resolver: &*resolver,
        };
        configure_providers(&mut config, &ctx).await?;

        if config.enabled_providers().next().is_none() {
            return Err(CruxError::NoProviders);
        }

        configure_selected_models(&mut config, &report.providers)?;
        config.known_providers = report.providers;

        Ok(LoadedConfig {
            config,
            catalog_errors: report.errors,
        })
    }
}

/// Load the configuration for `working_dir` from the process environment
pub async fn load(working_dir: &Path) -> CruxResult<LoadedConfig> {
    ConfigLoader::new(working_dir).load().await
}

fn read_merged(paths: &ConfigPaths) -> CruxResult<Config> {
    let merged = load_layered(&paths.layered())?;
    serde_json::from_value(merged).map_err(|e| {
        CruxError::config_with_context(
            format!("Invalid configuration: {}", e),
            "Merging configuration files",
        )
    })
}

fn data_dir(config: &Config, paths: &ConfigPaths, working_dir: &Path) -> PathBuf {
    match &config.options.data_directory {
        Some(dir) if dir.is_relative() => working_dir.join(dir),
        Some(dir) => dir.clone(),
        None => paths
            .global_data
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(default_data_dir),
    }
}
