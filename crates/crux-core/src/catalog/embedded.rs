//! Built-in provider definitions
//!
//! The offline baseline used when auto-update is disabled or when neither
//! the remote catalog nor the disk cache produced anything usable.

use std::collections::BTreeMap;

use super::types::{ModelDescriptor, ProviderDescriptor, ProviderType};

/// Id of the hosted Crux provider
pub const PREMIUM_PROVIDER_ID: &str = "crux";

fn model(
    id: &str,
    name: &str,
    cost_in: f64,
    cost_out: f64,
    context_window: u64,
    default_max_tokens: u64,
    can_reason: bool,
) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        cost_per_1m_in: cost_in,
        cost_per_1m_out: cost_out,
        context_window,
        default_max_tokens,
        can_reason,
        supports_attachments: true,
        ..Default::default()
    }
}

fn reasoning_model(
    id: &str,
    name: &str,
    cost_in: f64,
    cost_out: f64,
    context_window: u64,
    default_max_tokens: u64,
) -> ModelDescriptor {
    ModelDescriptor {
        reasoning_levels: vec!["low".into(), "medium".into(), "high".into()],
        default_reasoning_effort: Some("medium".to_string()),
        ..model(id, name, cost_in, cost_out, context_window, default_max_tokens, true)
    }
}

/// Get the built-in multi-provider catalog, in preference order
pub fn embedded_providers() -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor {
            id: "anthropic".to_string(),
            name: "Anthropic".to_string(),
            api_endpoint: "https://api.anthropic.com".to_string(),
            api_key: "$ANTHROPIC_API_KEY".to_string(),
            provider_type: ProviderType::Anthropic,
            default_large_model_id: "claude-sonnet-4-5-20250929".to_string(),
            default_small_model_id: "claude-haiku-4-5-20251001".to_string(),
            models: vec![
                model("claude-sonnet-4-5-20250929", "Claude 4.5 Sonnet", 3.0, 15.0, 200_000, 50_000, true),
                model("claude-opus-4-5-20251101", "Claude 4.5 Opus", 5.0, 25.0, 200_000, 32_000, true),
                model("claude-haiku-4-5-20251001", "Claude 4.5 Haiku", 1.0, 5.0, 200_000, 8_192, true),
            ],
            default_headers: BTreeMap::new(),
        },
        ProviderDescriptor {
            id: "openai".to_string(),
            name: "OpenAI".to_string(),
            api_endpoint: "https://api.openai.com/v1".to_string(),
            api_key: "$OPENAI_API_KEY".to_string(),
            provider_type: ProviderType::OpenAi,
            default_large_model_id: "gpt-5".to_string(),
            default_small_model_id: "gpt-4o-mini".to_string(),
            models: vec![
                reasoning_model("gpt-5", "GPT-5", 1.25, 10.0, 400_000, 128_000),
                model("gpt-4o", "GPT-4o", 2.5, 10.0, 128_000, 16_384, false),
                model("gpt-4o-mini", "GPT-4o Mini", 0.15, 0.6, 128_000, 16_384, false),
            ],
            default_headers: BTreeMap::new(),
        },
        ProviderDescriptor {
            id: "gemini".to_string(),
            name: "Google Gemini".to_string(),
            api_endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key: "$GEMINI_API_KEY".to_string(),
            provider_type: ProviderType::Gemini,
            default_large_model_id: "gemini-2.5-pro".to_string(),
            default_small_model_id: "gemini-2.5-flash".to_string(),
            models: vec![
                model("gemini-2.5-pro", "Gemini 2.5 Pro", 1.25, 10.0, 1_048_576, 50_000, true),
                model("gemini-2.5-flash", "Gemini 2.5 Flash", 0.3, 2.5, 1_048_576, 50_000, true),
            ],
            default_headers: BTreeMap::new(),
        },
        ProviderDescriptor {
            id: "azure".to_string(),
            name: "Azure OpenAI".to_string(),
            api_endpoint: "$AZURE_OPENAI_API_ENDPOINT".to_string(),
            api_key: "$AZURE_OPENAI_API_KEY".to_string(),
            provider_type: ProviderType::Azure,
            default_large_model_id: "gpt-5".to_string(),
            default_small_model_id: "gpt-4o-mini".to_string(),
            models: vec![
                reasoning_model("gpt-5", "GPT-5", 1.25, 10.0, 400_000, 128_000),
                model("gpt-4o-mini", "GPT-4o Mini", 0.15, 0.6, 128_000, 16_384, false),
            ],
            default_headers: BTreeMap::new(),
        },
        ProviderDescriptor {
            id: "vertexai".to_string(),
            name: "Google Vertex AI".to_string(),
            api_endpoint: String::new(),
            api_key: String::new(),
            provider_type: ProviderType::VertexAi,
            default_large_model_id: "gemini-2.5-pro".to_string(),
            default_small_model_id: "gemini-2.5-flash".to_string(),
            models: vec![
                model("gemini-2.5-pro", "Gemini 2.5 Pro", 1.25, 10.0, 1_048_576, 50_000, true),
                model("gemini-2.5-flash", "Gemini 2.5 Flash", 0.3, 2.5, 1_048_576, 50_000, true),
            ],
            default_headers: BTreeMap::new(),
        },
        ProviderDescriptor {
            id: "bedrock".to_string(),
            name: "AWS Bedrock".to_string(),
            api_endpoint: String::new(),
            api_key: String::new(),
            provider_type: ProviderType::Bedrock,
            default_large_model_id: "anthropic.claude-sonnet-4-5-20250929-v1:0".to_string(),
            default_small_model_id: "anthropic.claude-haiku-4-5-20251001-v1:0".to_string(),
            models: vec![
                model("anthropic.claude-sonnet-4-5-20250929-v1:0", "AWS Claude 4.5 Sonnet", 3.0, 15.0, 200_000, 50_000, true),
                model("anthropic.claude-haiku-4-5-20251001-v1:0", "AWS Claude 4.5 Haiku", 1.0, 5.0, 200_000, 8_192, true),
            ],
            default_headers: BTreeMap::new(),
        },
        ProviderDescriptor {
            id: "openrouter".to_string(),
            name: "OpenRouter".to_string(),
            api_endpoint: "https://openrouter.ai/api/v1".to_string(),
            api_key: "$OPENROUTER_API_KEY".to_string(),
            provider_type: ProviderType::OpenRouter,
            default_large_model_id: "anthropic/claude-sonnet-4.5".to_string(),
            default_small_model_id: "anthropic/claude-haiku-4.5".to_string(),
            models: vec![
                model("anthropic/claude-sonnet-4.5", "Claude 4.5 Sonnet (via OpenRouter)", 3.0, 15.0, 200_000, 50_000, true),
                model("anthropic/claude-haiku-4.5", "Claude 4.5 Haiku (via OpenRouter)", 1.0, 5.0, 200_000, 8_192, true),
            ],
            default_headers: BTreeMap::from([
                ("HTTP-Referer".to_string(), "https://crux.dev".to_string()),
                ("X-Title".to_string(), "Crux".to_string()),
            ]),
        },
        ProviderDescriptor {
            id: "zai".to_string(),
            name: "Z.AI (GLM)".to_string(),
            api_endpoint: "https://api.z.ai/api/coding/paas/v4".to_string(),
            api_key: "$ZAI_API_KEY".to_string(),
            provider_type: ProviderType::OpenAiCompat,
            default_large_model_id: "glm-4.6".to_string(),
            default_small_model_id: "glm-4.5-air".to_string(),
            models: vec![
                model("glm-4.6", "GLM-4.6", 0.6, 2.2, 204_800, 65_536, true),
                model("glm-4.5-air", "GLM-4.5 Air", 0.2, 1.1, 131_072, 49_152, true),
            ],
            default_headers: BTreeMap::new(),
        },
        ProviderDescriptor {
            id: "copilot".to_string(),
            name: "GitHub Copilot".to_string(),
            api_endpoint: "https://api.githubcopilot.com".to_string(),
            api_key: String::new(),
            provider_type: ProviderType::OpenAiCompat,
            default_large_model_id: "claude-sonnet-4.5".to_string(),
            default_small_model_id: "gpt-4o-mini".to_string(),
            models: vec![
                model("claude-sonnet-4.5", "Claude 4.5 Sonnet (Copilot)", 0.0, 0.0, 128_000, 16_000, true),
                model("gpt-4o-mini", "GPT-4o Mini (Copilot)", 0.0, 0.0, 128_000, 4_096, false),
            ],
            default_headers: BTreeMap::new(),
        },
    ]
}

/// Get the built-in entry for the hosted Crux provider
pub fn embedded_premium_provider() -> ProviderDescriptor {
    ProviderDescriptor {
        id: PREMIUM_PROVIDER_ID.to_string(),
        name: "Crux Cloud".to_string(),
        api_endpoint: "https://cloud.crux.dev/api/v1/openai".to_string(),
        api_key: "$CRUX_API_KEY".to_string(),
        provider_type: ProviderType::Premium,
        default_large_model_id: "crux-large".to_string(),
        default_small_model_id: "crux-small".to_string(),
        models: vec![
            reasoning_model("crux-large", "Crux Large", 3.0, 15.0, 200_000, 50_000),
            model("crux-small", "Crux Small", 0.5, 2.0, 200_000, 8_192, false),
        ],
        default_headers: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_embedded_ids_unique() {
        let providers = embedded_providers();
        let ids: HashSet<_> = providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), providers.len());
    }

    #[test]
    fn test_embedded_defaults_exist() {
        for provider in embedded_providers()
            .into_iter()
            .chain(std::iter::once(embedded_premium_provider()))
        {
            assert!(
                provider.model(&provider.default_large_model_id).is_some(),
                "{} large default missing",
                provider.id
            );
            assert!(
                provider.model(&provider.default_small_model_id).is_some(),
                "{} small default missing",
                provider.id
            );
        }
    }

    #[test]
    fn test_bedrock_models_carry_vendor_prefix() {
        let bedrock = embedded_providers()
            .into_iter()
            .find(|p| p.provider_type == ProviderType::Bedrock)
            .unwrap();
        assert!(bedrock.models.iter().all(|m| m.id.starts_with("anthropic.")));
    }
}
