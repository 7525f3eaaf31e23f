//! Provider listing command

use crate::console::CliConsole;
use colored::*;
use crux_core::config::{Environment, ShellVariableResolver, SystemShell, load};
use std::path::Path;
use std::sync::Arc;

/// List resolved providers; with `check`, test each enabled one
pub async fn list(working_dir: &Path, check: bool) -> anyhow::Result<()> {
    let console = CliConsole::new(true);
    let loaded = load(working_dir).await?;
    for error in &loaded.catalog_errors {
        console.warn(&error.to_string());
    }

    console.print_header("Providers");
    for provider in loaded.config.providers.values() {
        let status = if provider.disable {
            "disabled".dimmed()
        } else {
            "enabled".green()
        };
        console.line(&format!(
            "  {} {} [{}] {} ({} models)",
            provider.id.magenta().bold(),
            provider.name,
            provider.provider_type,
            status,
            provider.models.len()
        ));
        if !provider.base_url.is_empty() {
            console.line(&format!("      {}", provider.base_url.dimmed()));
        }
    }

    if !check {
        return Ok(());
    }

    console.print_separator();
    let resolver = ShellVariableResolver::new(
        Environment::from_process(),
        Arc::new(SystemShell::in_dir(working_dir)),
    );
    let mut failures = 0;
    for provider in loaded.config.enabled_providers() {
        match provider.test_connection(&resolver).await {
            Ok(()) => console.success(&format!("{} is reachable", provider.id)),
            Err(e) => {
                failures += 1;
                console.error(&format!("{}: {}", provider.id, e));
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} provider(s) failed the connection check", failures);
    }
    Ok(())
}
