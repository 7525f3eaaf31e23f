//! Remote catalog clients
//!
//! Conditional HTTP GET against the catalog service. The validator of the
//! locally cached copy travels in `If-None-Match`; a `304` becomes
//! [`FetchError::NotModified`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use std::marker::PhantomData;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{CatalogPayload, ProviderDescriptor};
use crate::config::env::Environment;

/// Default catalog service
pub const DEFAULT_CATALOG_URL: &str = "https://catalog.crux.dev";

/// Overrides [`DEFAULT_CATALOG_URL`]
pub const CATALOG_URL_ENV: &str = "CRUX_CATALOG_URL";
/// Default hosted provider service
pub const DEFAULT_PREMIUM_URL: &str = "https://cloud.crux.dev";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome classes of a failed fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The remote copy matches the validator we sent
    #[error("not modified")]
    NotModified,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Remote source of a catalog payload
#[async_trait]
pub trait CatalogClient<T>: Send + Sync {
    async fn fetch(&self, validator: &str) -> Result<T, FetchError>;
}

/// HTTP implementation of [`CatalogClient`] for any JSON payload
pub struct HttpCatalogClient<T> {
    http_client: Client,
    url: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HttpCatalogClient<T> {
    fn with_url(url: String) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("crux/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            url,
            _marker: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HttpCatalogClient<Vec<ProviderDescriptor>> {
    /// Client for the multi-provider list endpoint
    pub fn providers(base_url: &str) -> Self {
        Self::with_url(format!("{}/v2/providers", base_url.trim_end_matches('/')))
    }

    /// Client honoring `CRUX_CATALOG_URL`
    pub fn providers_from_env(env: &Environment) -> Self {
        Self::providers(env.get(CATALOG_URL_ENV).unwrap_or(DEFAULT_CATALOG_URL))
    }
}

impl HttpCatalogClient<ProviderDescriptor> {
    /// Client for the single hosted-provider endpoint
    pub fn premium(base_url: &str) -> Self {
        Self::with_url(format!("{}/api/v1/provider", base_url.trim_end_matches('/')))
    }

    /// Client honoring `CRUX_PREMIUM_URL`
    pub fn premium_from_env(env: &Environment) -> Self {
        Self::premium(env.get("CRUX_PREMIUM_URL").unwrap_or(DEFAULT_PREMIUM_URL))
    }
}

#[async_trait]
impl<T: CatalogPayload> CatalogClient<T> for HttpCatalogClient<T> {
    async fn fetch(&self, validator: &str) -> Result<T, FetchError> {
        debug!("Fetching catalog from: {}", self.url);

        let mut request = self.http_client.get(&self.url);
        if !validator.is_empty() {
            request = request.header(header::IF_NONE_MATCH, format!("\"{}\"", validator));
        }

        let response = request.send().await.map_err(classify)?;

        if response.status() == StatusCode::NOT_MODIFIED {
            debug!("Catalog at {} not modified", self.url);
            return Err(FetchError::NotModified);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Catalog API error: {} - {}", status, error_text);
            return Err(FetchError::Transport(format!(
                "catalog API error ({}): {}",
                status, error_text
            )));
        }

        response.json::<T>().await.map_err(classify)
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::DeadlineExceeded
    } else if error.is_decode() {
        FetchError::Transport(format!("failed to parse catalog: {}", error))
    } else {
        FetchError::Transport(error.to_string())
    }
}
