//! Provider reachability check
//!
//! Lists the provider's models with its resolved credentials. Never part
//! of a normal load; used by explicit checks only.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::model::ProviderConfig;
use super::resolver::VariableResolver;
use crate::catalog::ProviderType;
use crate::error::{CruxError, CruxResult};

pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request that proves a provider accepts our credentials
#[derive(Debug, Clone, PartialEq, Eq)]
struct Probe {
    url: String,
    headers: Vec<(String, String)>,
}

impl ProviderConfig {
    /// Check that the provider answers an authenticated model listing
    pub async fn test_connection(&self, resolver: &dyn VariableResolver) -> CruxResult<()> {
        let api_key = resolver.resolve_value(&self.api_key).await?;
        let base_url = resolver.resolve_value(&self.base_url).await?;

        let Some(probe) = self.probe(&base_url, &api_key) else {
            debug!(
                "No connection check for provider {} of type {}",
                self.id, self.provider_type
            );
            return Ok(());
        };

        let http_client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_default();

        let mut request = http_client.get(&probe.url);
        let probe_headers = probe.headers.iter().map(|(name, value)| (name, value));
        for (name, value) in self.extra_headers.iter().chain(probe_headers) {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!("Testing connection to provider {}", self.id);
        let response = request.send().await.map_err(|e| {
            CruxError::http(format!(
                "Failed to reach provider {} at {}: {}",
                self.id,
                redact(&probe.url),
                e.without_url()
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Connection test for {} failed with {}", self.id, status);
            return Err(CruxError::http_status(
                format!("Provider {} rejected the request ({})", self.id, status),
                redact(&probe.url),
                status.as_u16(),
            ));
        }
        Ok(())
    }

    fn probe(&self, base_url: &str, api_key: &str) -> Option<Probe> {
        let base = base_url.trim_end_matches('/');
        let bearer = || vec![("Authorization".to_string(), format!("Bearer {}", api_key))];

        match &self.provider_type {
            ProviderType::Anthropic => Some(Probe {
                url: format!("{}/v1/models", base),
                headers: vec![
                    ("x-api-key".to_string(), api_key.to_string()),
                    ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
                ],
            }),
            ProviderType::Gemini => Some(Probe {
                url: format!("{}/v1beta/models?key={}", base, api_key),
                headers: Vec::new(),
            }),
            ProviderType::Azure => {
                let version = self
                    .extra_params
                    .get("apiVersion")
                    .map(String::as_str)
                    .unwrap_or("2024-10-21");
                Some(Probe {
                    url: format!("{}/openai/models?api-version={}", base, version),
                    headers: vec![("api-key".to_string(), api_key.to_string())],
                })
            }
            ProviderType::OpenAi
            | ProviderType::OpenAiCompat
            | ProviderType::OpenRouter
            | ProviderType::Premium => Some(Probe {
                url: format!("{}/models", base),
                headers: bearer(),
            }),
            // Cloud IAM auth; a key-based probe says nothing
            ProviderType::VertexAi | ProviderType::Bedrock | ProviderType::Unknown(_) => None,
        }
    }
}

/// Strip the query string, which may carry a key
fn redact(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::Environment;
    use crate::config::resolver::EnvironmentVariableResolver;

    fn provider(provider_type: ProviderType, base_url: &str) -> ProviderConfig {
        ProviderConfig {
            id: "p".into(),
            base_url: base_url.into(),
            api_key: "$KEY".into(),
            provider_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_probe_per_type() {
        let openai = provider(ProviderType::OpenAi, "https://api.openai.com/v1/");
        let probe = openai.probe("https://api.openai.com/v1/", "sk").unwrap();
        assert_eq!(probe.url, "https://api.openai.com/v1/models");
        assert_eq!(probe.headers, vec![("Authorization".to_string(), "Bearer sk".to_string())]);

        let anthropic = provider(ProviderType::Anthropic, "");
        let probe = anthropic.probe("https://api.anthropic.com", "k").unwrap();
        assert_eq!(probe.url, "https://api.anthropic.com/v1/models");
        assert!(probe.headers.iter().any(|(n, v)| n == "x-api-key" && v == "k"));

        let gemini = provider(ProviderType::Gemini, "");
        let probe = gemini.probe("https://generativelanguage.googleapis.com", "g").unwrap();
        assert_eq!(
            probe.url,
            "https://generativelanguage.googleapis.com/v1beta/models?key=g"
        );

        assert!(provider(ProviderType::Bedrock, "").probe("", "").is_none());
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("https://x/models?key=secret"), "https://x/models");
        assert_eq!(redact("https://x/models"), "https://x/models");
    }

    #[tokio::test]
    async fn test_unresolved_key_is_an_error() {
        let resolver = EnvironmentVariableResolver::new(Environment::default());
        let result = provider(ProviderType::OpenAi, "http://127.0.0.1:1")
            .test_connection(&resolver)
            .await;
        assert!(matches!(result, Err(CruxError::Resolve(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_an_error() {
        let resolver = EnvironmentVariableResolver::new(Environment::from_pairs([("KEY", "k")]));
        let result = provider(ProviderType::OpenAi, "http://127.0.0.1:1")
            .test_connection(&resolver)
            .await;
        assert!(matches!(result, Err(CruxError::Http { .. })));
    }

    #[tokio::test]
    async fn test_transport_error_hides_query_key() {
        let resolver =
            EnvironmentVariableResolver::new(Environment::from_pairs([("KEY", "SUPERSECRET")]));
        let result = provider(ProviderType::Gemini, "http://127.0.0.1:1")
            .test_connection(&resolver)
            .await;

        let message = result.unwrap_err().to_string();
        assert!(!message.contains("SUPERSECRET"), "{}", message);
        assert!(message.contains("http://127.0.0.1:1/v1beta/models"));
    }

    #[tokio::test]
    async fn test_iam_providers_are_skipped() {
        let resolver = EnvironmentVariableResolver::new(Environment::from_pairs([("KEY", "k")]));
        provider(ProviderType::VertexAi, "")
            .test_connection(&resolver)
            .await
            .unwrap();
    }
}
