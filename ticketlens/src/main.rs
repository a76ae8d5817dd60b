use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketlens::api::{create_router, AppState};
use ticketlens::config::Config;
use ticketlens::embeddings::{DenseEmbeddingClient, SparseEncoder};
use ticketlens::vector::{QdrantStore, VectorStore};

#[derive(Parser)]
#[command(name = "ticketlens")]
#[command(about = "Hybrid search over support tickets stored in Qdrant")]
struct Args {
    /// Address to bind (overrides TICKETLENS_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides TICKETLENS_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    init_tracing();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        "Connecting to Qdrant at {} (collection: {})...",
        config.qdrant.url,
        config.qdrant.collection
    );
    let store: Arc<dyn VectorStore> = Arc::new(QdrantStore::new(&config.qdrant)?);
    if let Err(e) = store.health_check().await {
        tracing::warn!("Qdrant is not reachable yet: {} - searches will fail until it is", e);
    }

    tracing::info!(
        "Using embedding service {} (model: {})",
        config.embeddings.base_url,
        config.embeddings.model
    );
    let dense = DenseEmbeddingClient::new(&config.embeddings)?;

    tracing::info!("Loading sparse model: {}...", config.sparse.model);
    let sparse = SparseEncoder::new(&config.sparse)?;

    tracing::info!(
        "Search ranking: {:?}, fetch limit {}, result limit {}",
        config.search.ranking,
        config.search.fetch_limit,
        config.search.result_limit
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store, dense, sparse);
    let app = create_router(state);

    tracing::info!("TicketLens starting on http://{}", addr);
    tracing::info!("  Search UI:    http://{}/", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;

    tracing::info!("TicketLens stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ticketlens=info,tower_http=debug".into());

    let json = std::env::var("TICKETLENS_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
    cancel_token.cancel();
}
