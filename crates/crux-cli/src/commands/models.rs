//! Models listing command

use crate::console::CliConsole;
use colored::*;
use crux_core::config::{SelectedModelType, load};
use std::path::Path;

/// List models of enabled providers, marking the current selection
pub async fn list(working_dir: &Path, provider_filter: Option<&str>) -> anyhow::Result<()> {
    let console = CliConsole::new(true);
    let loaded = load(working_dir).await?;
    let config = &loaded.config;

    if let Some(id) = provider_filter {
        if config.enabled_provider(id).is_none() {
            anyhow::bail!("Provider '{}' is not configured or disabled", id);
        }
    }

    console.print_header("Available Models");
    for provider in config.enabled_providers() {
        if provider_filter.is_some_and(|id| id != provider.id) {
            continue;
        }

        console.line(&format!("\n{}", provider.name.magenta().bold()));
        for model in &provider.models {
            let mut markers = Vec::new();
            for slot in SelectedModelType::ALL {
                if config
                    .selected_model(slot)
                    .is_some_and(|s| s.provider == provider.id && s.model == model.id)
                {
                    markers.push(slot.as_str());
                }
            }
            let marker = if markers.is_empty() {
                "".normal()
            } else {
                format!(" ({})", markers.join(", ")).yellow()
            };
            let context = if model.context_window > 0 {
                format!(" {}k ctx", model.context_window / 1000).dimmed()
            } else {
                "".normal()
            };
            console.line(&format!("  • {}{}{}", model.id.green(), context, marker));
        }
    }

    console.print_separator();
    for slot in SelectedModelType::ALL {
        let recent = config.recent_models(slot);
        if recent.is_empty() {
            continue;
        }
        let names: Vec<String> = recent
            .iter()
            .map(|r| format!("{}/{}", r.provider, r.model))
            .collect();
        console.line(&format!("Recent {}: {}", slot, names.join(", ")));
    }
    Ok(())
}
