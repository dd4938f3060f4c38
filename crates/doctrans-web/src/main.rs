use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use doctrans_core::Config;
use doctrans_core::translate::{GoogleTranslator, Translator};
use doctrans_ingest::{Ingestor, Pipeline};

mod handlers;
mod models;
mod state;
mod template;
mod upload;


use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();

    // One translator for the whole process, shared by every request.
    let client = reqwest::Client::builder()
        .user_agent(concat!("doctrans/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let google = GoogleTranslator::new(client, &config);
    tracing::info!(service = google.name(), endpoint = google.endpoint(), "translator ready");
    let translator: Arc<dyn Translator> = Arc::new(google);

    let pipeline = Pipeline::new(Ingestor::new(config.temp_dir.clone()), translator);
    let state = Arc::new(AppState {
        pipeline,
        max_upload_bytes: config.max_upload_bytes,
    });

    let addr: SocketAddr = config.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> axum::Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    axum::Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(handlers::health::health))
        .route("/api/extract", post(handlers::extract::extract))
        .route("/api/translate", post(handlers::translate::translate))
        .route("/api/download", post(handlers::download::download))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
