//! Credential updates made after startup

use serde_json::Value;
use tracing::info;

use super::model::Config;
use super::oauth::{COPILOT_PROVIDER_ID, OAuthToken, apply_copilot_headers};
use super::persistence::ConfigUpdate;
use crate::error::{CruxError, CruxResult};

impl Config {
    /// Store an API key (or key template) for a provider
    pub fn set_provider_api_key(&mut self, provider_id: &str, api_key: &str) -> CruxResult<()> {
        if let Some(persistence) = &self.persistence {
            persistence.set_field(
                &format!("providers.{}.api_key", provider_id),
                Value::String(api_key.to_string()),
            )?;
        }

        if let Some(provider) = self.providers.get_mut(provider_id) {
            provider.api_key = api_key.to_string();
        }
        info!("Updated API key for provider {}", provider_id);
        Ok(())
    }

    /// Store an OAuth token for a provider; its access token becomes the API key
    pub fn set_provider_oauth(&mut self, provider_id: &str, token: OAuthToken) -> CruxResult<()> {
        if token.access_token.is_empty() {
            return Err(CruxError::validation("OAuth access token is empty", provider_id));
        }

        if let Some(persistence) = &self.persistence {
            ConfigUpdate::new()
                .set(
                    format!("providers.{}.api_key", provider_id),
                    Value::String(token.access_token.clone()),
                )
                .set(
                    format!("providers.{}.oauth", provider_id),
                    serde_json::to_value(&token)?,
                )
                .apply(persistence)?;
        }

        if let Some(provider) = self.providers.get_mut(provider_id) {
            provider.api_key = token.access_token.clone();
            provider.oauth = Some(token);
            if provider.id == COPILOT_PROVIDER_ID {
                apply_copilot_headers(provider);
            }
        }
        info!("Updated OAuth credentials for provider {}", provider_id);
        Ok(())
    }
}
