use async_openai::config::{AzureConfig, OpenAIConfig};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::ProviderError;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenRouter,
    OpenAi,
    AzureOpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::OpenAi => "openai",
            ProviderKind::AzureOpenAi => "azure_openai",
        }
    }

    /// Base URL used when a profile does not override it. Azure has none.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenRouter => Some(OPENROUTER_BASE_URL),
            ProviderKind::OpenAi => Some(OPENAI_BASE_URL),
            ProviderKind::AzureOpenAi => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "openai" => Ok(ProviderKind::OpenAi),
            "azure_openai" => Ok(ProviderKind::AzureOpenAi),
            _ => Err(ProviderError::UnsupportedProvider {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSettings {
    pub endpoint: String,
    pub api_version: String,
    /// Model name to deployment name.
    pub deployments: HashMap<String, String>,
}

/// One configured upstream: provider identity, credentials, endpoint and model allowlist.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendProfile {
    pub backend_id: String,
    pub provider: ProviderKind,
    pub models: Vec<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub azure: Option<AzureSettings>,
}

impl fmt::Debug for BackendProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendProfile")
            .field("backend_id", &self.backend_id)
            .field("provider", &self.provider)
            .field("models", &self.models)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("azure", &self.azure)
            .finish()
    }
}

impl BackendProfile {
    pub fn allows_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// Base URL for OpenAI-compatible providers: the override, else the provider default.
    pub fn api_base(&self) -> &str {
        self.base_url
            .as_deref()
            .or(self.provider.default_base_url())
            .unwrap_or(OPENAI_BASE_URL)
            .trim_end_matches('/')
    }

    /// Bearer-authenticated client config for OpenRouter and OpenAI.
    pub fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig::new()
            .with_api_base(self.api_base())
            .with_api_key(self.api_key.as_str())
    }

    /// Azure client config for `model`, routed through its deployment with an `api-key` header.
    pub fn azure_config(&self, model: &str) -> Result<AzureConfig, ProviderError> {
        let missing = || ProviderError::MissingDeployment {
            backend_id: self.backend_id.clone(),
            model: model.to_string(),
        };
        let azure = self.azure.as_ref().ok_or_else(missing)?;
        let deployment = azure.deployments.get(model).ok_or_else(missing)?;

        Ok(AzureConfig::new()
            .with_api_base(azure.endpoint.trim_end_matches('/'))
            .with_api_version(azure.api_version.as_str())
            .with_deployment_id(deployment.as_str())
            .with_api_key(self.api_key.as_str()))
    }
}

/// A selectable `(backend, model)` pair, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelOption {
    pub backend_id: String,
    pub provider: ProviderKind,
    pub model: String,
    pub label: String,
}

impl ModelOption {
    pub fn new(profile: &BackendProfile, model: &str) -> Self {
        Self {
            backend_id: profile.backend_id.clone(),
            provider: profile.provider,
            model: model.to_string(),
            label: format!(
                "{} ({}) \u{00b7} {}",
                profile.backend_id, profile.provider, model
            ),
        }
    }
}
