//! Provider catalog data model
//!
//! These are the shapes served by the remote catalog, stored in the disk
//! cache and embedded as the offline baseline.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Wire protocol family spoken by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ProviderType {
    OpenAi,
    #[default]
    OpenAiCompat,
    Anthropic,
    Gemini,
    Azure,
    VertexAi,
    Bedrock,
    OpenRouter,
    /// The hosted Crux provider
    Premium,
    /// Anything this build does not know how to talk to
    Unknown(String),
}

impl ProviderType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenAiCompat => "openai-compat",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Azure => "azure",
            Self::VertexAi => "vertexai",
            Self::Bedrock => "bedrock",
            Self::OpenRouter => "openrouter",
            Self::Premium => "crux",
            Self::Unknown(other) => other,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "openai" => Self::OpenAi,
            "openai-compat" => Self::OpenAiCompat,
            "anthropic" => Self::Anthropic,
            "gemini" => Self::Gemini,
            "azure" => Self::Azure,
            "vertexai" => Self::VertexAi,
            "bedrock" => Self::Bedrock,
            "openrouter" => Self::OpenRouter,
            "crux" => Self::Premium,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProviderType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Catalog entry for a single model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cost_per_1m_in: f64,
    #[serde(default)]
    pub cost_per_1m_out: f64,
    #[serde(default)]
    pub cost_per_1m_in_cached: f64,
    #[serde(default)]
    pub cost_per_1m_out_cached: f64,
    #[serde(default)]
    pub context_window: u64,
    #[serde(default)]
    pub default_max_tokens: u64,
    #[serde(default)]
    pub can_reason: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning_levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_reasoning_effort: Option<String>,
    #[serde(default)]
    pub supports_attachments: bool,
}

impl ModelDescriptor {
    /// Minimal model with only an id and display name
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Catalog truth about a provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Default endpoint, may contain `$VAR` references
    #[serde(default)]
    pub api_endpoint: String,
    /// API key template, usually `$SOME_API_KEY`
    #[serde(default)]
    pub api_key: String,
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub default_large_model_id: String,
    #[serde(default)]
    pub default_small_model_id: String,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_headers: BTreeMap<String, String>,
}

impl ProviderDescriptor {
    pub fn model(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }
}

/// A value the catalog synchronizer can fetch, cache and fall back on
pub trait CatalogPayload:
    Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static
{
    /// Whether the value carries no usable catalog data
    fn is_empty_catalog(&self) -> bool;
}

impl CatalogPayload for Vec<ProviderDescriptor> {
    fn is_empty_catalog(&self) -> bool {
        self.is_empty()
    }
}

impl CatalogPayload for ProviderDescriptor {
    fn is_empty_catalog(&self) -> bool {
        self.id.is_empty() || self.models.is_empty()
    }
}
