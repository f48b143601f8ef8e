mod charts;
mod collections;
mod config;
mod db;
mod errors;
mod models;
mod results;
mod routes;
mod salary;
mod scoring;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::MongoDocumentStore;
use crate::results::{FileResultStore, RedisResultStore, ResultStore};
use crate::routes::build_router;
use crate::scoring::scorer::KeywordJobScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobFit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize MongoDB
    let mongo = db::connect(&config.mongodb_uri, config.mongodb_database.as_deref()).await?;

    // Initialize result storage (Redis when configured, files otherwise)
    let results: Arc<dyn ResultStore> = match &config.redis_url {
        Some(url) => {
            let redis = redis::Client::open(url.as_str())?;
            info!("Redis result store initialized (ttl: {}s)", config.result_ttl_secs);
            Arc::new(RedisResultStore::new(redis, config.result_ttl_secs))
        }
        None => {
            info!(
                "File result store initialized at {} (ttl: {}s)",
                config.results_dir.display(),
                config.result_ttl_secs
            );
            Arc::new(FileResultStore::new(
                config.results_dir.clone(),
                config.result_ttl_secs,
            ))
        }
    };

    let scorer = Arc::new(KeywordJobScorer {
        max_results: config.max_scored_titles,
    });

    // Build app state
    let state = AppState {
        db: Arc::new(MongoDocumentStore::new(mongo)),
        results,
        scorer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
