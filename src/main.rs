mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod storage;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::agents::{AgentStore, PgAgentStore};
use crate::db::users::{PgUserStore, UserStore};
use crate::middleware::cors::{cors_layer, origin_guard, OriginPolicy};
use crate::storage::{BlobStore, HttpBlobClient};

/// Whole-request body cap; per-blob size limits are enforced by the
/// storage client.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub agents: Arc<dyn AgentStore>,
    pub users: Arc<dyn UserStore>,
    pub blobs: Arc<dyn BlobStore>,
}

pub fn app(state: AppState, policy: OriginPolicy) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/agents",
            post(handlers::agent::create_agent).get(handlers::agent::get_agents),
        )
        .route(
            "/api/agents/:id",
            get(handlers::agent::get_agent)
                .put(handlers::agent::update_agent)
                .delete(handlers::agent::delete_agent),
        )
        .route(
            "/api/addUsers",
            post(handlers::user::create_user).get(handlers::user::get_users),
        )
        .route(
            "/api/addUsers/:id",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .fallback(handlers::route_not_found)
        .layer(axum::middleware::from_fn_with_state(
            policy.clone(),
            origin_guard,
        ))
        .layer(cors_layer(policy.origins()))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Agent Registry Service...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    info!("Database connection pool established");

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    info!("Database migrations completed");

    let blob_client = HttpBlobClient::new(config.blob_storage.clone())?;
    // Uploads fail individually if the container never becomes ready.
    if let Err(e) = blob_client.ensure_container().await {
        tracing::warn!("Blob container not ready: {}", e);
    }

    let state = AppState {
        agents: Arc::new(PgAgentStore::new(db_pool.clone())),
        users: Arc::new(PgUserStore::new(db_pool)),
        blobs: Arc::new(blob_client),
    };

    let policy = OriginPolicy::new(config.cors.allowed_origins.clone());
    let app = app(state, policy);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Agent Registry Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
