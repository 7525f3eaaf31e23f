//! Provider catalog refresh command

use crate::console::CliConsole;
use crux_core::ConfigLoader;
use crux_core::catalog::client::{CATALOG_URL_ENV, DEFAULT_CATALOG_URL};
use crux_core::catalog::{PROVIDERS_CACHE_FILE, RefreshSource, refresh_catalog_cache};
use crux_core::config::Environment;
use std::path::Path;

pub async fn update_providers(
    working_dir: &Path,
    source: Option<&str>,
    embedded: bool,
) -> anyhow::Result<()> {
    let console = CliConsole::new(true);
    let env = Environment::from_process();

    let source = match (source, embedded) {
        (_, true) => RefreshSource::Embedded,
        (Some(arg), false) => RefreshSource::parse(arg),
        (None, false) => RefreshSource::Url(
            env.get(CATALOG_URL_ENV)
                .unwrap_or(DEFAULT_CATALOG_URL)
                .to_string(),
        ),
    };
    // Same directory a later load reads the cache from
    let data_dir = ConfigLoader::new(working_dir).with_env(env).data_dir()?;
    let cache_path = data_dir.join(PROVIDERS_CACHE_FILE);

    console.info(&format!("Updating providers from {}", source));
    let count = refresh_catalog_cache(&source, &cache_path).await?;
    console.success(&format!(
        "Cached {} providers at {}",
        count,
        cache_path.display()
    ));
    Ok(())
}
