//! Chat backend profiles from `CHAT_BACKEND_*` variables.
//!
//! `CHAT_BACKEND_IDS` lists the backends; each id `<ID>` (uppercased) then needs
//! `CHAT_BACKEND_<ID>_PROVIDER`, `_MODELS` and `_API_KEY`. Azure backends also need
//! `_AZURE_ENDPOINT`, `_AZURE_API_VERSION` and `_AZURE_DEPLOYMENTS`. `_BASE_URL` is
//! optional for the other providers.

use std::collections::HashMap;
use std::env;
use tracing::info;

use super::error::ConfigError;
use crate::provider::{AzureSettings, BackendProfile, ProviderKind};

pub const ENV_BACKEND_IDS: &str = "CHAT_BACKEND_IDS";

/// Validated backend profiles, in `CHAT_BACKEND_IDS` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendProfiles(Vec<BackendProfile>);

impl BackendProfiles {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parses profiles using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_ids = parse_unique_csv(&lookup, ENV_BACKEND_IDS, "backend ids")?;

        let mut profiles = Vec::with_capacity(backend_ids.len());
        for backend_id in backend_ids {
            if !is_valid_backend_id(&backend_id) {
                return Err(ConfigError::InvalidBackendId { backend_id });
            }
            let profile = parse_profile(&lookup, backend_id)?;
            info!(
                backend_id = %profile.backend_id,
                provider = %profile.provider,
                model_count = profile.models.len(),
                "Validated chat backend"
            );
            profiles.push(profile);
        }

        Ok(Self(profiles))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendProfile> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<BackendProfile> {
        self.0
    }
}

fn is_valid_backend_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_profile<F>(lookup: &F, backend_id: String) -> Result<BackendProfile, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let token = backend_id.to_uppercase();
    let var = |suffix: &str| format!("CHAT_BACKEND_{token}_{suffix}");

    let provider_var = var("PROVIDER");
    let raw_provider = require(lookup, &provider_var)?;
    let provider: ProviderKind =
        raw_provider
            .parse()
            .map_err(|_| ConfigError::UnsupportedProvider {
                name: provider_var.clone(),
                value: raw_provider.clone(),
            })?;

    let models = parse_unique_csv(lookup, &var("MODELS"), "model ids")?;
    let api_key = require(lookup, &var("API_KEY"))?;

    let (base_url, azure) = match provider {
        ProviderKind::AzureOpenAi => {
            let endpoint = require(lookup, &var("AZURE_ENDPOINT"))?;
            let api_version = require(lookup, &var("AZURE_API_VERSION"))?;
            let deployments_var = var("AZURE_DEPLOYMENTS");
            let deployments = parse_deployments(lookup, &deployments_var)?;

            let missing: Vec<&str> = models
                .iter()
                .filter(|m| !deployments.contains_key(*m))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return Err(ConfigError::MissingDeployments {
                    name: deployments_var,
                    models: missing.join(", "),
                });
            }

            let azure = AzureSettings {
                endpoint,
                api_version,
                deployments,
            };
            (None, Some(azure))
        }
        ProviderKind::OpenRouter | ProviderKind::OpenAi => (optional(lookup, &var("BASE_URL")), None),
    };

    Ok(BackendProfile {
        backend_id,
        provider,
        models,
        api_key,
        base_url,
        azure,
    })
}

fn parse_deployments<F>(lookup: &F, name: &str) -> Result<HashMap<String, String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let entries = parse_unique_csv(lookup, name, "entries")?;
    let mut deployments = HashMap::with_capacity(entries.len());

    for entry in entries {
        let Some((model, deployment)) = entry.split_once('=') else {
            return Err(ConfigError::InvalidDeploymentEntry {
                name: name.to_string(),
                entry,
            });
        };
        let (model, deployment) = (model.trim(), deployment.trim());
        if model.is_empty() || deployment.is_empty() {
            return Err(ConfigError::InvalidDeploymentEntry {
                name: name.to_string(),
                entry: entry.clone(),
            });
        }
        if deployments
            .insert(model.to_string(), deployment.to_string())
            .is_some()
        {
            return Err(ConfigError::DuplicateValues {
                name: name.to_string(),
                label: "model mappings",
                values: model.to_string(),
            });
        }
    }

    Ok(deployments)
}

pub(crate) fn require<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| ConfigError::MissingEnvVar {
        name: name.to_string(),
    })
}

/// Trimmed value, with blank treated as unset.
pub(crate) fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_unique_csv<F>(
    lookup: &F,
    name: &str,
    label: &'static str,
) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = require(lookup, name)?;
    let values: Vec<String> = raw.split(',').map(|v| v.trim().to_string()).collect();

    if values.iter().any(String::is_empty) {
        return Err(ConfigError::EmptyListValue {
            name: name.to_string(),
        });
    }

    let mut duplicates: Vec<&str> = Vec::new();
    for (i, value) in values.iter().enumerate() {
        if values[..i].contains(value) && !duplicates.contains(&value.as_str()) {
            duplicates.push(value);
        }
    }
    if !duplicates.is_empty() {
        return Err(ConfigError::DuplicateValues {
            name: name.to_string(),
            label,
            values: duplicates.join(", "),
        });
    }

    Ok(values)
}
