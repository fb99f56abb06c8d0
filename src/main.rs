//! Battleground HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use battleground::config::{BackendProfiles, Config};
use battleground::gateway::{HandlerState, create_router_with_state};
use battleground::provider::ProviderRouter;
use battleground::relevance::RelevanceGate;
use battleground::retrieval::{OpenAiEmbedder, RetrievalService};
use battleground::service::{BattlegroundService, ChatService, EvidenceSource};
use battleground::vectordb::QdrantChunkStore;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    let profiles = BackendProfiles::from_env()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        backends = profiles.len(),
        queue_capacity = config.queue_capacity,
        side_idle_timeout_secs = config.side_idle_timeout.map(|t| t.as_secs()),
        "Battleground starting"
    );

    let http = reqwest::Client::new();
    let router = Arc::new(ProviderRouter::from_profiles(profiles.into_inner())?);
    let evidence = build_evidence_source(&config, http).await?;

    let chat = ChatService::new(router.clone(), evidence.clone());
    let battleground = BattlegroundService::new(router, evidence)
        .with_queue_capacity(config.queue_capacity)
        .with_idle_timeout(config.side_idle_timeout);

    let app = create_router_with_state(HandlerState::new(chat, battleground));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Battleground shutdown complete");
    Ok(())
}

async fn build_evidence_source(
    config: &Config,
    http: reqwest::Client,
) -> anyhow::Result<EvidenceSource> {
    let Some(api_key) = config.embed_api_key.clone() else {
        tracing::warn!(
            "No BATTLEGROUND_EMBED_API_KEY configured, answering without document evidence"
        );
        return Ok(EvidenceSource::disabled());
    };

    let store = QdrantChunkStore::new(&config.qdrant_url, config.collection.clone())?;
    if let Err(e) = store.health_check().await {
        tracing::warn!(error = %e, "Qdrant health check failed; retrieval requests may fail");
    }

    let embedder = OpenAiEmbedder::new(
        http,
        config.embed_base_url.clone(),
        api_key,
        config.embed_model.clone(),
    );
    let gate = RelevanceGate::new(config.min_relevance_score)?;
    let catalog = Arc::new(store.clone());
    let retrieval = RetrievalService::new(embedder, store, config.retrieval_top_k, gate)?;

    tracing::info!(
        qdrant_url = %config.qdrant_url,
        collection = %config.collection,
        embed_model = %config.embed_model,
        top_k = config.retrieval_top_k,
        min_relevance_score = config.min_relevance_score,
        "Document retrieval enabled"
    );

    Ok(EvidenceSource::new(Arc::new(retrieval)).with_catalog(catalog))
}

async fn run_health_check() -> i32 {
    let port = std::env::var("BATTLEGROUND_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
