use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::error::ProviderError;
use super::openai_compat::OpenAiCompatibleClient;
use super::types::{BackendProfile, ModelOption};
use super::{ChatStreamer, TextStream};

/// Routes streaming requests by backend id, enforcing each backend's model allowlist.
#[derive(Clone)]
pub struct ProviderRouter {
    profiles: Vec<BackendProfile>,
    clients: HashMap<String, Arc<dyn ChatStreamer>>,
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("profiles", &self.profiles)
            .finish_non_exhaustive()
    }
}

impl ProviderRouter {
    /// Every profile must have a client registered under its backend id.
    pub fn new(
        profiles: Vec<BackendProfile>,
        clients: HashMap<String, Arc<dyn ChatStreamer>>,
    ) -> Result<Self, ProviderError> {
        if let Some(missing) = profiles
            .iter()
            .find(|p| !clients.contains_key(&p.backend_id))
        {
            return Err(ProviderError::MissingClient {
                backend_id: missing.backend_id.clone(),
            });
        }
        Ok(Self { profiles, clients })
    }

    /// Builds one upstream client per profile.
    pub fn from_profiles(profiles: Vec<BackendProfile>) -> Result<Self, ProviderError> {
        let mut clients: HashMap<String, Arc<dyn ChatStreamer>> = HashMap::new();
        for profile in &profiles {
            let client = OpenAiCompatibleClient::new(profile.clone())?;
            clients.insert(profile.backend_id.clone(), Arc::new(client));
        }
        Ok(Self { profiles, clients })
    }

    pub fn profiles(&self) -> &[BackendProfile] {
        &self.profiles
    }

    pub fn profile(&self, backend_id: &str) -> Option<&BackendProfile> {
        self.profiles.iter().find(|p| p.backend_id == backend_id)
    }

    /// Checks a `(backend_id, model)` selection against configuration without calling out.
    pub fn ensure_allowed(&self, backend_id: &str, model: &str) -> Result<(), ProviderError> {
        let profile = self
            .profile(backend_id.trim())
            .ok_or_else(|| ProviderError::UnknownBackend {
                backend_id: backend_id.to_string(),
            })?;
        if !profile.allows_model(model.trim()) {
            return Err(ProviderError::ModelNotAllowed {
                backend_id: profile.backend_id.clone(),
                model: model.to_string(),
            });
        }
        Ok(())
    }

    /// Every configured model, grouped by backend in configuration order.
    pub fn model_options(&self) -> Vec<ModelOption> {
        self.profiles
            .iter()
            .flat_map(|profile| {
                profile
                    .models
                    .iter()
                    .map(move |model| ModelOption::new(profile, model))
            })
            .collect()
    }
}

#[async_trait]
impl ChatStreamer for ProviderRouter {
    async fn stream(
        &self,
        backend_id: &str,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<TextStream, ProviderError> {
        self.ensure_allowed(backend_id, model)?;
        let backend_id = backend_id.trim();
        let model = model.trim();

        let client = self
            .clients
            .get(backend_id)
            .ok_or_else(|| ProviderError::MissingClient {
                backend_id: backend_id.to_string(),
            })?;

        info!(backend_id, model, "Routing chat stream");
        client
            .stream(backend_id, model, system_prompt, user_prompt)
            .await
    }
}
