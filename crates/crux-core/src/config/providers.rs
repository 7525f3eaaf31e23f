//! Provider merging and validation
//!
//! Turns the user-declared provider map into the resolved set. Known
//! providers from the catalog are merged with user overrides and admitted
//! according to their type. Everything the catalog does not know goes
//! through the custom-provider checks.
//!
//! A provider that lacks what it needs is dropped: with a warning when the
//! user configured it explicitly, silently otherwise. Only an invalid
//! Bedrock model aborts the whole pass.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use super::env::Environment;
use super::model::{Config, ProviderConfig};
use super::oauth::{ANTHROPIC_PROVIDER_ID, COPILOT_PROVIDER_ID, apply_copilot_headers};
use super::resolver::VariableResolver;
use crate::catalog::{ModelDescriptor, ProviderDescriptor, ProviderType};
use crate::error::{CruxError, CruxResult};

/// Forces every provider through the custom path
pub const DISABLE_DEFAULT_PROVIDERS_ENV: &str = "CRUX_DISABLE_DEFAULT_PROVIDERS";

/// Model id prefix Bedrock accepts
pub const BEDROCK_MODEL_PREFIX: &str = "anthropic.";

/// Inputs of a provider configuration pass
pub struct ConfigureContext<'a> {
    pub known: &'a [ProviderDescriptor],
    pub env: &'a Environment,
    pub resolver: &'a dyn VariableResolver,
}

enum Admission {
    Include,
    Missing(String),
}

/// Replace `config.providers` with the resolved provider set
pub async fn configure_providers(config: &mut Config, ctx: &ConfigureContext<'_>) -> CruxResult<()> {
    let disable_defaults =
        config.options.disable_default_providers || ctx.env.flag(DISABLE_DEFAULT_PROVIDERS_ENV);
    let known: &[ProviderDescriptor] = if disable_defaults {
        debug!("Default providers disabled, treating every provider as custom");
        &[]
    } else {
        ctx.known
    };

    let mut declared = std::mem::take(&mut config.providers);
    let mut resolved = BTreeMap::new();

    for descriptor in known {
        let user = declared.remove(&descriptor.id);
        let user_configured = user.is_some();
        let mut provider = merge_known(descriptor, user);

        if provider.id == ANTHROPIC_PROVIDER_ID && provider.oauth.is_some() {
            warn!(
                "Removing legacy OAuth login for provider {}, configure an API key instead",
                provider.id
            );
            if let Some(persistence) = &config.persistence {
                if let Err(e) = persistence.remove_field(&format!("providers.{}", provider.id)) {
                    warn!("Failed to remove provider {} from data config: {}", provider.id, e);
                }
            }
            continue;
        }
        if provider.id == COPILOT_PROVIDER_ID {
            apply_copilot_headers(&mut provider);
        }

        let headers = std::mem::take(&mut provider.extra_headers);
        provider.extra_headers = resolve_headers(&provider.id, headers, ctx.resolver).await;

        match admit_known(&mut provider, ctx).await? {
            Admission::Include => {
                debug!("Configured provider {}", provider.id);
                resolved.insert(provider.id.clone(), provider);
            }
            Admission::Missing(reason) if user_configured => {
                warn!("Removing provider {}: {}", provider.id, reason);
            }
            Admission::Missing(reason) => {
                debug!("Skipping provider {}: {}", provider.id, reason);
            }
        }
    }

    for (id, provider) in declared {
        if let Some(provider) = configure_custom(id, provider, ctx.resolver).await {
            resolved.insert(provider.id.clone(), provider);
        }
    }

    config.providers = resolved;
    Ok(())
}

/// Apply user overrides on top of a catalog descriptor
fn merge_known(descriptor: &ProviderDescriptor, user: Option<ProviderConfig>) -> ProviderConfig {
    let mut provider = user.unwrap_or_default();

    provider.id = descriptor.id.clone();
    provider.provider_type = descriptor.provider_type.clone();
    if provider.name.is_empty() {
        provider.name = descriptor.name.clone();
    }
    if provider.base_url.is_empty() {
        provider.base_url = descriptor.api_endpoint.clone();
    }
    if provider.api_key.is_empty() {
        provider.api_key = match &provider.oauth {
            Some(token) => token.access_token.clone(),
            None => descriptor.api_key.clone(),
        };
    }

    provider.models = merge_models(std::mem::take(&mut provider.models), &descriptor.models);

    let mut headers = descriptor.default_headers.clone();
    headers.extend(std::mem::take(&mut provider.extra_headers));
    provider.extra_headers = headers;

    provider
}

/// User models first, then catalog models not already present
fn merge_models(user: Vec<ModelDescriptor>, catalog: &[ModelDescriptor]) -> Vec<ModelDescriptor> {
    let mut models = dedupe_models(user);
    let seen: HashSet<String> = models.iter().map(|m| m.id.clone()).collect();
    models.extend(catalog.iter().filter(|m| !seen.contains(&m.id)).cloned());
    models
}

fn dedupe_models(models: Vec<ModelDescriptor>) -> Vec<ModelDescriptor> {
    let mut seen = HashSet::new();
    models
        .into_iter()
        .filter(|m| !m.id.is_empty() && seen.insert(m.id.clone()))
        .map(|mut m| {
            if m.name.is_empty() {
                m.name = m.id.clone();
            }
            m
        })
        .collect()
}

/// Resolve every header value; unresolvable headers are dropped
async fn resolve_headers(
    provider_id: &str,
    headers: BTreeMap<String, String>,
    resolver: &dyn VariableResolver,
) -> BTreeMap<String, String> {
    let mut resolved = BTreeMap::new();
    for (name, value) in headers {
        match resolver.resolve_value(&value).await {
            Ok(value) => {
                resolved.insert(name, value);
            }
            Err(e) => warn!(
                "Dropping header {} of provider {}: {}",
                name, provider_id, e
            ),
        }
    }
    resolved
}

async fn admit_known(provider: &mut ProviderConfig, ctx: &ConfigureContext<'_>) -> CruxResult<Admission> {
    match provider.provider_type {
        ProviderType::VertexAi => Ok(admit_vertexai(provider, ctx.env)),
        ProviderType::Azure => Ok(admit_azure(provider, ctx).await),
        ProviderType::Bedrock => admit_bedrock(provider, ctx.env),
        ProviderType::OpenAi
        | ProviderType::OpenAiCompat
        | ProviderType::Anthropic
        | ProviderType::Gemini
        | ProviderType::OpenRouter
        | ProviderType::Premium
        | ProviderType::Unknown(_) => Ok(admit_api_key(provider, ctx.resolver).await),
    }
}

fn admit_vertexai(provider: &mut ProviderConfig, env: &Environment) -> Admission {
    match (env.get("VERTEXAI_PROJECT"), env.get("VERTEXAI_LOCATION")) {
        (Some(project), Some(location)) => {
            provider.extra_params.insert("project".into(), project.into());
            provider.extra_params.insert("location".into(), location.into());
            Admission::Include
        }
        _ => Admission::Missing("VERTEXAI_PROJECT and VERTEXAI_LOCATION must be set".into()),
    }
}

async fn admit_azure(provider: &mut ProviderConfig, ctx: &ConfigureContext<'_>) -> Admission {
    let endpoint = match ctx.resolver.resolve_value(&provider.base_url).await {
        Ok(endpoint) if !endpoint.is_empty() => endpoint,
        Ok(_) => return Admission::Missing("endpoint is empty".into()),
        Err(e) => return Admission::Missing(format!("endpoint could not be resolved: {}", e)),
    };

    provider.base_url = endpoint;
    if let Some(version) = ctx.env.get("AZURE_OPENAI_API_VERSION") {
        provider.extra_params.insert("apiVersion".into(), version.into());
    }
    Admission::Include
}

fn admit_bedrock(provider: &mut ProviderConfig, env: &Environment) -> CruxResult<Admission> {
    if !has_aws_credentials(env) {
        return Ok(Admission::Missing("no AWS credentials found".into()));
    }

    if let Some(model) = provider
        .models
        .iter()
        .find(|m| !m.id.starts_with(BEDROCK_MODEL_PREFIX))
    {
        return Err(CruxError::validation(
            format!(
                "Bedrock provider only supports {} models, found '{}'",
                BEDROCK_MODEL_PREFIX.trim_end_matches('.'),
                model.id
            ),
            provider.id.clone(),
        ));
    }

    if let Some(region) = env
        .get("AWS_REGION")
        .or_else(|| env.get("AWS_DEFAULT_REGION"))
    {
        provider.extra_params.insert("region".into(), region.into());
    }
    Ok(Admission::Include)
}

async fn admit_api_key(provider: &ProviderConfig, resolver: &dyn VariableResolver) -> Admission {
    match resolver.resolve_value(&provider.api_key).await {
        Ok(key) if !key.is_empty() => Admission::Include,
        Ok(_) => Admission::Missing("API key is empty".into()),
        Err(e) => Admission::Missing(format!("API key could not be resolved: {}", e)),
    }
}

/// Whether any supported AWS credential source is present
pub fn has_aws_credentials(env: &Environment) -> bool {
    env.is_set("AWS_BEARER_TOKEN_BEDROCK")
        || (env.is_set("AWS_ACCESS_KEY_ID") && env.is_set("AWS_SECRET_ACCESS_KEY"))
        || env.is_set("AWS_PROFILE")
        || env.is_set("AWS_DEFAULT_PROFILE")
        || env.is_set("AWS_REGION")
        || env.is_set("AWS_DEFAULT_REGION")
        || env.is_set("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI")
        || env.is_set("AWS_CONTAINER_CREDENTIALS_FULL_URI")
}

async fn configure_custom(
    id: String,
    mut provider: ProviderConfig,
    resolver: &dyn VariableResolver,
) -> Option<ProviderConfig> {
    if provider.name.is_empty() {
        provider.name = id.clone();
    }
    provider.id = id;

    if !provider.provider_type.is_supported() {
        warn!(
            "Skipping custom provider {}: unsupported type '{}'",
            provider.id, provider.provider_type
        );
        return None;
    }
    if provider.disable {
        debug!("Skipping custom provider {}: disabled", provider.id);
        return None;
    }
    if provider.models.is_empty() {
        warn!("Skipping custom provider {}: no models configured", provider.id);
        return None;
    }

    match resolver.resolve_value(&provider.base_url).await {
        Ok(base_url) if !base_url.is_empty() => provider.base_url = base_url,
        Ok(_) => {
            warn!("Skipping custom provider {}: base URL is empty", provider.id);
            return None;
        }
        Err(e) => {
            warn!(
                "Skipping custom provider {}: base URL could not be resolved: {}",
                provider.id, e
            );
            return None;
        }
    }

    // Local servers often need no key
    match resolver.resolve_value(&provider.api_key).await {
        Ok(key) if !key.is_empty() => {}
        Ok(_) => warn!("Custom provider {} has no API key", provider.id),
        Err(e) => warn!(
            "API key of custom provider {} could not be resolved: {}",
            provider.id, e
        ),
    }

    provider.models = dedupe_models(std::mem::take(&mut provider.models));
    let headers = std::mem::take(&mut provider.extra_headers);
    provider.extra_headers = resolve_headers(&provider.id, headers, resolver).await;

    debug!("Configured custom provider {}", provider.id);
    Some(provider)
}
