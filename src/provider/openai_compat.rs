use async_openai::Client;
use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse,
};
use async_trait::async_trait;
use futures_util::future;
use futures_util::stream::{Stream, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info};

use super::error::ProviderError;
use super::types::{BackendProfile, ProviderKind};
use super::{ChatStreamer, TextStream};

/// Azure routes by deployment, so it needs one client per configured model.
#[derive(Clone)]
enum Upstream {
    OpenAi(Client<OpenAIConfig>),
    Azure(HashMap<String, Client<AzureConfig>>),
}

/// Streams chat completions from one OpenAI-compatible backend (OpenRouter, OpenAI, Azure).
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    profile: BackendProfile,
    upstream: Upstream,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    /// Fails when an Azure profile lacks a deployment for one of its models.
    pub fn new(profile: BackendProfile) -> Result<Self, ProviderError> {
        let upstream = match profile.provider {
            ProviderKind::AzureOpenAi => {
                let clients = profile
                    .models
                    .iter()
                    .map(|model| {
                        let config = profile.azure_config(model)?;
                        Ok((model.clone(), Client::with_config(config)))
                    })
                    .collect::<Result<HashMap<_, _>, ProviderError>>()?;
                Upstream::Azure(clients)
            }
            ProviderKind::OpenRouter | ProviderKind::OpenAi => {
                Upstream::OpenAi(Client::with_config(profile.openai_config()))
            }
        };

        Ok(Self { profile, upstream })
    }

    pub fn profile(&self) -> &BackendProfile {
        &self.profile
    }

    /// Streaming request carrying the system and user prompts.
    pub fn build_request(
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<CreateChatCompletionRequest, ProviderError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(upstream_error)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()
            .map_err(upstream_error)?;

        CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages([
                ChatCompletionRequestMessage::System(system),
                ChatCompletionRequestMessage::User(user),
            ])
            .stream(true)
            .build()
            .map_err(upstream_error)
    }
}

#[async_trait]
impl ChatStreamer for OpenAiCompatibleClient {
    async fn stream(
        &self,
        backend_id: &str,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<TextStream, ProviderError> {
        if system_prompt.trim().is_empty() {
            return Err(ProviderError::EmptyPrompt {
                field: "system_prompt",
            });
        }
        if user_prompt.trim().is_empty() {
            return Err(ProviderError::EmptyPrompt {
                field: "user_prompt",
            });
        }

        let request = Self::build_request(model, system_prompt, user_prompt)?;

        info!(
            backend_id,
            provider = %self.profile.provider,
            model,
            "Chat stream started"
        );

        let events = match &self.upstream {
            Upstream::OpenAi(client) => client.chat().create_stream(request).await,
            Upstream::Azure(clients) => {
                let client = clients
                    .get(model)
                    .ok_or_else(|| ProviderError::MissingDeployment {
                        backend_id: backend_id.to_string(),
                        model: model.to_string(),
                    })?;
                client.chat().create_stream(request).await
            }
        }
        .map_err(|e| {
            debug!(backend_id, model, error = %e, "Chat stream rejected");
            upstream_error(e)
        })?;

        Ok(text_fragments(events))
    }
}

fn upstream_error(e: OpenAIError) -> ProviderError {
    ProviderError::Upstream {
        message: e.to_string(),
    }
}

/// Text of the first choice's delta; role-only, usage and finish events carry none.
pub fn delta_text(event: CreateChatCompletionStreamResponse) -> String {
    event
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default()
}

/// Maps completion chunks to non-empty text fragments.
pub fn text_fragments<S>(events: S) -> TextStream
where
    S: Stream<Item = Result<CreateChatCompletionStreamResponse, OpenAIError>> + Send + 'static,
{
    events
        .map(|event| {
            event.map(delta_text).map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })
        })
        .filter(|item| future::ready(!matches!(item, Ok(text) if text.is_empty())))
        .boxed()
}
