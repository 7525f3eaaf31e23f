//! Model selection command

use crate::console::CliConsole;
use crux_core::config::{SelectedModel, SelectedModelType, load};
use std::path::Path;

pub async fn set_model(working_dir: &Path, slot: SelectedModelType, spec: &str) -> anyhow::Result<()> {
    let console = CliConsole::new(true);
    let (provider, model) = parse_model_spec(spec)?;

    let mut loaded = load(working_dir).await?;
    loaded
        .config
        .update_preferred_model(slot, SelectedModel::new(provider, model))?;

    console.success(&format!("{} model set to {}/{}", slot, provider, model));
    Ok(())
}

/// Split `provider/model`; model ids may contain further slashes
fn parse_model_spec(spec: &str) -> anyhow::Result<(&str, &str)> {
    match spec.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok((provider, model)),
        _ => anyhow::bail!("Expected provider/model, got '{}'", spec),
    }
}
