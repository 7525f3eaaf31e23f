//! OAuth credentials attached to provider configs

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::model::ProviderConfig;

pub const COPILOT_PROVIDER_ID: &str = "copilot";
pub const ANTHROPIC_PROVIDER_ID: &str = "anthropic";

/// Token obtained by an external OAuth flow
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    /// Unix seconds; zero when unknown
    #[serde(default)]
    pub expires_at: i64,
}

impl OAuthToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    pub fn is_expired(&self) -> bool {
        if self.expires_at <= 0 {
            return false;
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        now >= self.expires_at
    }
}

/// Headers the Copilot API expects from an editor integration
pub fn copilot_headers() -> [(&'static str, String); 4] {
    [
        ("Copilot-Integration-Id", "vscode-chat".to_string()),
        ("Editor-Version", concat!("crux/", env!("CARGO_PKG_VERSION")).to_string()),
        ("Editor-Plugin-Version", concat!("crux/", env!("CARGO_PKG_VERSION")).to_string()),
        ("User-Agent", concat!("crux/", env!("CARGO_PKG_VERSION")).to_string()),
    ]
}

/// Add Copilot headers and the bearer token when the provider carries OAuth
pub fn apply_copilot_headers(provider: &mut ProviderConfig) {
    let Some(token) = provider.oauth.as_ref() else {
        return;
    };
    let bearer = format!("Bearer {}", token.access_token);

    for (name, value) in copilot_headers() {
        provider.extra_headers.insert(name.to_string(), value);
    }
    provider.extra_headers.insert("Authorization".to_string(), bearer);
}
