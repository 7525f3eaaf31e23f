//! Recently used models per slot

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{Config, SelectedModel, SelectedModelType};
use crate::error::{CruxError, CruxResult};

/// Entries kept per slot
pub const MAX_RECENT_MODELS: usize = 5;

/// Identity of a recently used model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecentModel {
    pub provider: String,
    pub model: String,
}

impl RecentModel {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// Move `entry` to the front, dropping duplicates and the overflow
fn push_recent(history: &[RecentModel], entry: RecentModel) -> Vec<RecentModel> {
    let mut updated = Vec::with_capacity(MAX_RECENT_MODELS + 1);
    updated.extend(history.iter().filter(|e| **e != entry).cloned());
    updated.insert(0, entry);
    updated.truncate(MAX_RECENT_MODELS);
    updated
}

impl Config {
    /// Recent history of a slot, most recent first
    pub fn recent_models(&self, slot: SelectedModelType) -> &[RecentModel] {
        self.recent_models.get(&slot).map(Vec::as_slice).unwrap_or_default()
    }

    /// Put a model at the head of the slot's history.
    ///
    /// Nothing is written when the history is unchanged.
    pub fn record_recent_model(&mut self, slot: SelectedModelType, model: &SelectedModel) -> CruxResult<()> {
        if model.provider.is_empty() || model.model.is_empty() {
            return Ok(());
        }

        let current = self.recent_models(slot);
        let updated = push_recent(current, RecentModel::new(&model.provider, &model.model));
        if updated == current {
            return Ok(());
        }

        if let Some(persistence) = &self.persistence {
            persistence.set_field(
                &format!("recent_models.{}", slot),
                serde_json::to_value(&updated)?,
            )?;
        }
        debug!("Recorded {} model {}/{}", slot, model.provider, model.model);
        self.recent_models.insert(slot, updated);
        Ok(())
    }

    /// Switch a slot to another model, persist it and record it as recent
    pub fn update_preferred_model(&mut self, slot: SelectedModelType, model: SelectedModel) -> CruxResult<()> {
        if self.get_model(&model.provider, &model.model).is_none() {
            return Err(CruxError::config(format!(
                "Model {} is not offered by any enabled provider named '{}'",
                model.model, model.provider
            )));
        }

        if let Some(persistence) = &self.persistence {
            persistence.set_field(&format!("models.{}", slot), serde_json::to_value(&model)?)?;
        }
        self.record_recent_model(slot, &model)?;
        self.models.insert(slot, model);
        Ok(())
    }
}
