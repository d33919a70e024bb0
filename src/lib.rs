pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod middleware;
pub mod routes;
pub mod serializers;
pub mod options;
pub mod locks;
pub mod project;
pub mod filters;
pub mod plugins;
pub mod worker;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::locks::PgLockBackend;
use crate::db::project_options::PgOptionStore;
use crate::locks::LockManager;
use crate::options::ConfigSchema;
use crate::plugins::PluginRegistry;
use crate::state::{AppState, SharedState};

pub fn build_state(pool: PgPool, config: Config) -> SharedState {
    let options = Arc::new(PgOptionStore::new(pool.clone()));
    let locks = LockManager::new(Arc::new(PgLockBackend::new(pool.clone())));

    Arc::new(AppState {
        pool,
        config,
        schema: ConfigSchema::project(),
        options,
        locks,
        plugins: PluginRegistry::builtin(),
    })
}

pub fn build_app(state: SharedState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
