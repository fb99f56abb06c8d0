use super::openai_compat::{delta_text, text_fragments};
use super::*;
use async_openai::config::Config;
use async_openai::error::OpenAIError;
use async_openai::types::chat::CreateChatCompletionStreamResponse;
use futures_util::{StreamExt, stream};
use std::collections::HashMap;
use std::sync::Arc;

fn openrouter_profile() -> BackendProfile {
    BackendProfile {
        backend_id: "primary".to_string(),
        provider: ProviderKind::OpenRouter,
        models: vec!["openai/gpt-4o-mini".to_string(), "anthropic/claude".to_string()],
        api_key: "sk-test".to_string(),
        base_url: None,
        azure: None,
    }
}

fn azure_profile() -> BackendProfile {
    BackendProfile {
        backend_id: "azure".to_string(),
        provider: ProviderKind::AzureOpenAi,
        models: vec!["gpt-4o".to_string()],
        api_key: "az-key".to_string(),
        base_url: None,
        azure: Some(AzureSettings {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_version: "2024-10-21".to_string(),
            deployments: HashMap::from([("gpt-4o".to_string(), "prod-4o".to_string())]),
        }),
    }
}

fn completion_chunk(content: Option<&str>) -> CreateChatCompletionStreamResponse {
    serde_json::from_value(serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "created": 1,
        "model": "anthropic/claude",
        "choices": [{
            "index": 0,
            "delta": {"role": "assistant", "content": content},
            "finish_reason": null
        }]
    }))
    .unwrap()
}

#[test]
fn test_provider_kind_parsing() {
    assert_eq!("openrouter".parse::<ProviderKind>(), Ok(ProviderKind::OpenRouter));
    assert_eq!(" OpenAI ".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
    assert_eq!(
        "azure_openai".parse::<ProviderKind>(),
        Ok(ProviderKind::AzureOpenAi)
    );
    assert!(matches!(
        "bedrock".parse::<ProviderKind>(),
        Err(ProviderError::UnsupportedProvider { .. })
    ));
}

#[test]
fn test_openai_config_uses_default_base_url() {
    let profile = openrouter_profile();
    assert_eq!(profile.api_base(), "https://openrouter.ai/api/v1");

    let config = profile.openai_config();
    assert_eq!(config.api_base(), "https://openrouter.ai/api/v1");
    assert_eq!(
        config.url("/chat/completions"),
        "https://openrouter.ai/api/v1/chat/completions"
    );
}

#[test]
fn test_openai_config_honours_base_url_override() {
    let mut profile = openrouter_profile();
    profile.provider = ProviderKind::OpenAi;
    assert_eq!(profile.api_base(), "https://api.openai.com/v1");

    profile.base_url = Some("http://localhost:9000/v1/".to_string());
    assert_eq!(profile.api_base(), "http://localhost:9000/v1");
    assert_eq!(
        profile.openai_config().url("/chat/completions"),
        "http://localhost:9000/v1/chat/completions"
    );
}

#[test]
fn test_azure_config_routes_through_deployment() {
    let config = azure_profile().azure_config("gpt-4o").unwrap();
    assert_eq!(config.api_base(), "https://example.openai.azure.com");
    assert_eq!(
        config.url("/chat/completions"),
        "https://example.openai.azure.com/openai/deployments/prod-4o/chat/completions"
    );

    assert!(matches!(
        azure_profile().azure_config("gpt-35"),
        Err(ProviderError::MissingDeployment { .. })
    ));

    let mut no_settings = azure_profile();
    no_settings.azure = None;
    assert!(matches!(
        no_settings.azure_config("gpt-4o"),
        Err(ProviderError::MissingDeployment { .. })
    ));
}

#[test]
fn test_azure_client_requires_every_deployment() {
    assert!(OpenAiCompatibleClient::new(azure_profile()).is_ok());

    let mut profile = azure_profile();
    profile.models.push("gpt-35".to_string());
    assert!(matches!(
        OpenAiCompatibleClient::new(profile),
        Err(ProviderError::MissingDeployment { ref model, .. }) if model == "gpt-35"
    ));
}

#[test]
fn test_build_request_carries_both_prompts() {
    let request =
        OpenAiCompatibleClient::build_request("anthropic/claude", "Be concise.", "What?").unwrap();
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["model"], "anthropic/claude");
    assert_eq!(json["stream"], true);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][0]["content"], "Be concise.");
    assert_eq!(json["messages"][1]["role"], "user");
    assert_eq!(json["messages"][1]["content"], "What?");
}

#[test]
fn test_profile_debug_redacts_api_key() {
    let debug = format!("{:?}", openrouter_profile());
    assert!(!debug.contains("sk-test"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_delta_text() {
    assert_eq!(delta_text(completion_chunk(Some("Hi"))), "Hi");
    assert_eq!(delta_text(completion_chunk(None)), "");

    let mut usage_only = completion_chunk(Some("x"));
    usage_only.choices.clear();
    assert_eq!(delta_text(usage_only), "");
}

#[tokio::test]
async fn test_text_fragments_skip_empty_deltas() {
    let events = stream::iter(vec![
        Ok(completion_chunk(None)),
        Ok(completion_chunk(Some("Hel"))),
        Ok(completion_chunk(Some(""))),
        Ok(completion_chunk(Some("lo"))),
    ]);

    let texts: Vec<String> = text_fragments(events).map(|r| r.unwrap()).collect().await;
    assert_eq!(texts, vec!["Hel", "lo"]);
}

#[tokio::test]
async fn test_text_fragments_surface_stream_errors() {
    let events = stream::iter(vec![
        Ok(completion_chunk(Some("x"))),
        Err(OpenAIError::InvalidArgument("connection reset".to_string())),
    ]);

    let items: Vec<_> = text_fragments(events).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0], Ok("x".to_string()));
    assert!(matches!(
        &items[1],
        Err(ProviderError::Transport { message }) if message.contains("connection reset")
    ));
}

#[test]
fn test_router_requires_client_per_profile() {
    let result = ProviderRouter::new(vec![openrouter_profile()], HashMap::new());
    assert_eq!(
        result.unwrap_err(),
        ProviderError::MissingClient {
            backend_id: "primary".to_string()
        }
    );
}

#[test]
fn test_router_allowlist() {
    let router =
        ProviderRouter::from_profiles(vec![openrouter_profile(), azure_profile()]).unwrap();

    assert!(router.ensure_allowed("primary", "anthropic/claude").is_ok());
    assert!(router.ensure_allowed(" azure ", "gpt-4o").is_ok());
    assert!(matches!(
        router.ensure_allowed("secondary", "gpt-4o"),
        Err(ProviderError::UnknownBackend { .. })
    ));
    assert!(matches!(
        router.ensure_allowed("azure", "anthropic/claude"),
        Err(ProviderError::ModelNotAllowed { .. })
    ));
}

#[test]
fn test_router_model_options() {
    let router =
        ProviderRouter::from_profiles(vec![openrouter_profile(), azure_profile()]).unwrap();
    let options = router.model_options();

    assert_eq!(options.len(), 3);
    assert_eq!(options[0].label, "primary (openrouter) \u{00b7} openai/gpt-4o-mini");
    assert_eq!(options[2].backend_id, "azure");
    assert_eq!(options[2].provider, ProviderKind::AzureOpenAi);

    let json = serde_json::to_value(&options[2]).unwrap();
    assert_eq!(json["provider"], "azure_openai");
}

#[tokio::test]
async fn test_router_delegates_to_backend_client() {
    let mock = MockChatStreamer::new().with_script(
        "primary",
        "anthropic/claude",
        MockScript::fragments(["Hello", " there"]),
    );
    let client: Arc<dyn ChatStreamer> = Arc::new(mock.clone());
    let router = ProviderRouter::new(
        vec![openrouter_profile()],
        HashMap::from([("primary".to_string(), client)]),
    )
    .unwrap();

    let stream = router
        .stream("primary", "anthropic/claude", "system", "user")
        .await
        .unwrap();
    let fragments: Vec<String> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(fragments, vec!["Hello", " there"]);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.calls()[0].system_prompt, "system");
}

#[tokio::test]
async fn test_router_rejects_before_calling_client() {
    let mock = MockChatStreamer::new();
    let client: Arc<dyn ChatStreamer> = Arc::new(mock.clone());
    let router = ProviderRouter::new(
        vec![openrouter_profile()],
        HashMap::from([("primary".to_string(), client)]),
    )
    .unwrap();

    let result = router.stream("primary", "gpt-5", "s", "u").await;

    assert!(matches!(result, Err(ProviderError::ModelNotAllowed { .. })));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_mock_scripts() {
    let mock = MockChatStreamer::new()
        .with_script("a", "m", MockScript::fail_after(["one"], "boom"))
        .with_script("b", "m", MockScript::FailOnStart("refused".to_string()));

    let items: Vec<_> = mock.stream("a", "m", "s", "u").await.unwrap().collect().await;
    assert_eq!(items[0], Ok("one".to_string()));
    assert_eq!(
        items[1],
        Err(ProviderError::Transport {
            message: "boom".to_string()
        })
    );

    assert!(mock.stream("b", "m", "s", "u").await.is_err());
    assert_eq!(mock.call_count(), 2);
    assert_eq!(mock.opened_streams(), 1);
    assert_eq!(mock.live_streams(), 0);
}

#[tokio::test]
async fn test_openai_client_rejects_blank_prompts() {
    let client = OpenAiCompatibleClient::new(openrouter_profile()).unwrap();

    let result = client.stream("primary", "anthropic/claude", " ", "u").await;
    assert!(matches!(
        result,
        Err(ProviderError::EmptyPrompt {
            field: "system_prompt"
        })
    ));

    let result = client.stream("primary", "anthropic/claude", "s", "").await;
    assert!(matches!(
        result,
        Err(ProviderError::EmptyPrompt {
            field: "user_prompt"
        })
    ));
}
