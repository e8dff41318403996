//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use chunkscope_core::config::ChunkScopeConfig;
use chunkscope_corpus::SqliteCorpus;
use chunkscope_retrieval::RetrievalService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: ChunkScopeConfig,
    pub start_time: std::time::Instant,
    /// Corpus store, also held by the retrieval service as a trait object.
    pub corpus: Arc<SqliteCorpus>,
    pub retrieval: Arc<RetrievalService>,
}

impl AppState {
    pub fn new(config: ChunkScopeConfig, corpus: Arc<SqliteCorpus>) -> Self {
        let retrieval = RetrievalService::new(corpus.clone(), config.retrieval.clone());
        Self {
            config,
            start_time: std::time::Instant::now(),
            corpus,
            retrieval: Arc::new(retrieval),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/retrieve", post(super::routes::retrieve))
        .route("/api/v1/corpus/stats", get(super::routes::corpus_stats))
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(std::time::Duration::from_secs(3600));

            // Example: CHUNKSCOPE_CORS_ORIGINS=https://studio.example.org,https://admin.example.org
            if let Ok(origins_str) = std::env::var("CHUNKSCOPE_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Open the corpus and serve until Ctrl-C.
pub async fn start(config: ChunkScopeConfig) -> anyhow::Result<()> {
    let db_path = config.corpus.resolved_db_path();
    let corpus = SqliteCorpus::open(&db_path)?;
    let stats = corpus.stats()?;
    tracing::info!(
        "📚 Corpus {}: {} board(s), {} book(s), {} chunk(s)",
        db_path.display(),
        stats.boards,
        stats.books,
        stats.chunks
    );

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(AppState::new(config, Arc::new(corpus)));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
