//! Production entrypoint: wires DynamoDB + S3 + Bedrock behind the core's
//! generic `AppState`, initializes tracing, and serves the axum router with
//! graceful shutdown (§5, §9's ambient stack).

use std::sync::Arc;

use rag_api::state::AppState;
use rag_core::config::Config;
use rag_knowledge::BedrockKnowledgeProvider;
use rag_objectstore::S3ObjectStore;
use rag_store::DynamoDbStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "rag_api=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry();

    let config = Arc::new(Config::from_env());

    let store = Arc::new(DynamoDbStore::from_env().await);
    let objects = Arc::new(S3ObjectStore::new(
        config.s3_bucket_name.clone(),
        config.aws_region.clone().unwrap_or_else(|| "us-east-1".to_string()),
        config.s3_endpoint.clone(),
    )?);
    let knowledge = Arc::new(BedrockKnowledgeProvider::from_env().await);

    let state = Arc::new(AppState::new(config.clone(), store, objects, knowledge));
    let app = rag_api::routes::build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!(%addr, version = %config.version, "rag-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Listens for Ctrl+C/SIGTERM to initiate graceful shutdown (§5: background
/// tasks are detached and not drained here — they carry their own bounded
/// deadlines).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }

    tracing::info!("shutting down gracefully");
}
