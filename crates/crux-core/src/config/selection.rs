//! Model selection for the large and small slots

use tracing::{debug, warn};

use super::model::{Config, SelectedModel, SelectedModelType};
use crate::catalog::ProviderDescriptor;
use crate::error::{CruxError, CruxResult};

/// Default (large, small) pair derived from the catalog and the resolved providers.
///
/// The first enabled provider in catalog order supplies both defaults. With
/// no such provider the first enabled provider by id lends its first model
/// to both slots.
pub fn default_model_selection(
    config: &Config,
    known: &[ProviderDescriptor],
) -> CruxResult<(SelectedModel, SelectedModel)> {
    if config.providers.is_empty() {
        return Err(CruxError::config("No providers configured"));
    }

    for descriptor in known {
        let Some(provider) = config.enabled_provider(&descriptor.id) else {
            continue;
        };

        let large = provider.model(&descriptor.default_large_model_id).ok_or_else(|| {
            CruxError::config(format!(
                "Default large model {} not found for provider {}",
                descriptor.default_large_model_id, provider.id
            ))
        })?;
        let small = provider.model(&descriptor.default_small_model_id).ok_or_else(|| {
            CruxError::config(format!(
                "Default small model {} not found for provider {}",
                descriptor.default_small_model_id, provider.id
            ))
        })?;

        return Ok((
            SelectedModel::from_descriptor(&provider.id, large),
            SelectedModel::from_descriptor(&provider.id, small),
        ));
    }

    let provider = config.enabled_providers().next().ok_or(CruxError::NoProviders)?;
    let model = provider.models.first().ok_or_else(|| {
        CruxError::config(format!("Provider {} has no models", provider.id))
    })?;
    let selected = SelectedModel::from_descriptor(&provider.id, model);
    Ok((selected.clone(), selected))
}

/// Fill both slots, validating user overrides against the resolved providers.
///
/// An override naming a model that no enabled provider offers is replaced by
/// the default, and the replacement is written to the data config.
pub fn configure_selected_models(config: &mut Config, known: &[ProviderDescriptor]) -> CruxResult<()> {
    let (default_large, default_small) = default_model_selection(config, known)?;

    for (slot, default) in [
        (SelectedModelType::Large, default_large),
        (SelectedModelType::Small, default_small),
    ] {
        let selected = resolve_slot(config, slot, default);
        config.models.insert(slot, selected);
    }
    Ok(())
}

fn resolve_slot(config: &Config, slot: SelectedModelType, default: SelectedModel) -> SelectedModel {
    let Some(user) = config.models.get(&slot) else {
        return default;
    };

    let provider = if user.provider.is_empty() {
        default.provider.as_str()
    } else {
        user.provider.as_str()
    };
    let model_id = if user.model.is_empty() {
        default.model.as_str()
    } else {
        user.model.as_str()
    };

    let Some(model) = config.get_model(provider, model_id) else {
        warn!(
            "Selected {} model {}/{} is not available, using {}/{}",
            slot, provider, model_id, default.provider, default.model
        );
        persist_correction(config, slot, &default);
        return default;
    };

    debug!("Using {} model {}/{}", slot, provider, model_id);
    SelectedModel {
        provider: provider.to_string(),
        model: model_id.to_string(),
        max_tokens: user
            .max_tokens
            .or((model.default_max_tokens > 0).then_some(model.default_max_tokens)),
        reasoning_effort: user
            .reasoning_effort
            .clone()
            .or_else(|| model.default_reasoning_effort.clone()),
        think: user.think,
        temperature: user.temperature,
        top_p: user.top_p,
        top_k: user.top_k,
        frequency_penalty: user.frequency_penalty,
        presence_penalty: user.presence_penalty,
        provider_options: user.provider_options.clone(),
    }
}

fn persist_correction(config: &Config, slot: SelectedModelType, selected: &SelectedModel) {
    let Some(persistence) = config.persistence() else {
        return;
    };
    let result = serde_json::to_value(selected)
        .map_err(CruxError::from)
        .and_then(|value| persistence.set_field(&format!("models.{}", slot), value));
    if let Err(e) = result {
        warn!("Failed to persist {} model correction: {}", slot, e);
    }
}
