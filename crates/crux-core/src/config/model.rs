//! Configuration data structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::oauth::OAuthToken;
use super::persistence::ConfigPersistence;
use super::recent::RecentModel;
use crate::catalog::{ModelDescriptor, ProviderDescriptor, ProviderType};

/// Model role a selection resolves into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectedModelType {
    Large,
    Small,
}

impl SelectedModelType {
    pub const ALL: [SelectedModelType; 2] = [Self::Large, Self::Small];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Small => "small",
        }
    }
}

impl fmt::Display for SelectedModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SelectedModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "large" => Ok(Self::Large),
            "small" => Ok(Self::Small),
            other => Err(format!("unknown model slot '{}', expected large or small", other)),
        }
    }
}

/// A (provider, model) choice plus sampling and limit overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectedModel {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub think: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<Map<String, Value>>,
}

impl SelectedModel {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Selection carrying the model's own declared limits
    pub fn from_descriptor(provider: &str, model: &ModelDescriptor) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.id.clone(),
            max_tokens: (model.default_max_tokens > 0).then_some(model.default_max_tokens),
            reasoning_effort: model.default_reasoning_effort.clone(),
            ..Default::default()
        }
    }
}

/// Resolved, locally usable provider configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,
    /// Key or key template; resolved only when used
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthToken>,
    #[serde(default)]
    pub disable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra_body: Map<String, Value>,
    /// Provider specific settings such as project, location or region
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_params: BTreeMap<String, String>,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl ProviderConfig {
    pub fn model(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }
}

/// General options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Options {
    /// Where caches and the data config live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_directory: Option<PathBuf>,
    #[serde(default)]
    pub disable_provider_auto_update: bool,
    #[serde(default)]
    pub disable_default_providers: bool,
    #[serde(default)]
    pub debug: bool,
}

/// Full configuration after merging every layered source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub models: BTreeMap<SelectedModelType, SelectedModel>,
    #[serde(default)]
    pub recent_models: BTreeMap<SelectedModelType, Vec<RecentModel>>,
    /// User-declared providers on load, resolved providers afterwards
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    pub options: Options,

    #[serde(skip)]
    pub(crate) known_providers: Vec<ProviderDescriptor>,
    #[serde(skip)]
    pub(crate) persistence: Option<ConfigPersistence>,
    #[serde(skip)]
    pub(crate) working_dir: PathBuf,
}

impl Config {
    /// Providers that are present and not disabled
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.values().filter(|p| !p.disable)
    }

    pub fn enabled_provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.get(id).filter(|p| !p.disable)
    }

    /// Look up a model on an enabled provider
    pub fn get_model(&self, provider: &str, model: &str) -> Option<&ModelDescriptor> {
        self.enabled_provider(provider)?.model(model)
    }

    /// Selection for a slot, if one is set
    pub fn selected_model(&self, slot: SelectedModelType) -> Option<&SelectedModel> {
        self.models.get(&slot)
    }

    /// Known provider catalog this configuration was resolved against
    pub fn known_providers(&self) -> &[ProviderDescriptor] {
        &self.known_providers
    }

    pub fn working_dir(&self) -> &std::path::Path {
        &self.working_dir
    }

    /// Attach the data-config file that runtime changes are written to
    pub fn with_persistence(mut self, persistence: ConfigPersistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn persistence(&self) -> Option<&ConfigPersistence> {
        self.persistence.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_user_config() {
        let config: Config = serde_json::from_value(json!({
            "models": {
                "large": {"model": "gpt-5", "provider": "openai", "temperature": 0.2}
            },
            "providers": {
                "local": {
                    "base_url": "http://localhost:11434/v1",
                    "models": [{"id": "llama3"}]
                }
            },
            "options": {"disable_default_providers": true}
        }))
        .unwrap();

        let large = config.selected_model(SelectedModelType::Large).unwrap();
        assert_eq!(large.model, "gpt-5");
        assert_eq!(large.temperature, Some(0.2));
        assert!(!large.think);

        let local = &config.providers["local"];
        assert_eq!(local.provider_type, ProviderType::OpenAiCompat);
        assert!(config.options.disable_default_providers);
    }

    #[test]
    fn test_selected_model_serializes_sparse() {
        let value = serde_json::to_value(SelectedModel::new("openai", "gpt-5")).unwrap();
        assert_eq!(value, json!({"model": "gpt-5", "provider": "openai"}));
    }

    #[test]
    fn test_enabled_filter() {
        let mut config = Config::default();
        config.providers.insert(
            "a".into(),
            ProviderConfig {
                id: "a".into(),
                models: vec![ModelDescriptor::named("m", "M")],
                ..Default::default()
            },
        );
        config.providers.insert(
            "b".into(),
            ProviderConfig {
                id: "b".into(),
                disable: true,
                models: vec![ModelDescriptor::named("m", "M")],
                ..Default::default()
            },
        );

        assert_eq!(config.enabled_providers().count(), 1);
        assert!(config.get_model("a", "m").is_some());
        assert!(config.get_model("b", "m").is_none());
        assert!(config.providers.contains_key("b"));
    }

    #[test]
    fn test_slot_parse() {
        assert_eq!("large".parse::<SelectedModelType>(), Ok(SelectedModelType::Large));
        assert!("medium".parse::<SelectedModelType>().is_err());
    }
}
