//! # ClemBot API - Health Endpoints
//!
//! Liveness, readiness and operator ping endpoints consumed by orchestration
//! infrastructure.
//!
//! ## Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Authentication and capability guards
//! - [`services`] - Database connectivity and JWT services
//! - [`telemetry`] - Tracing subscriber setup
//! - [`utils`] - Constants and secret loading

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::handlers::{livez, ping, readyz};
use crate::middleware::{auth_middleware, bot_master_guard};
use crate::models::AppState;
use crate::services::database::PgConnector;
use crate::services::jwt::JwtService;

/// Creates the application router backed by a PostgreSQL pool.
///
/// # Arguments
///
/// * `config` - Loaded configuration (JWT secret, readiness timeout)
/// * `db_pool` - Pool the readiness probe acquires connections from
/// * `shutdown` - Token cancelled when the server starts shutting down
pub fn app(config: &AppConfig, db_pool: PgPool, shutdown: CancellationToken) -> Router {
    let state = AppState::new(
        Arc::new(PgConnector::new(db_pool)),
        JwtService::from_secret(config.jwt_secret.expose_secret()),
        config.readiness_timeout,
        shutdown,
    );

    app_with_state(Arc::new(state))
}

/// Creates the application router around an existing state.
///
/// Useful when the database connector should be replaced, e.g. in tests.
pub fn app_with_state(state: Arc<AppState>) -> Router {
    // route layers run outermost-last: authentication before the capability check
    let operator_routes = Router::new()
        .route("/api/healthcheck/ping", get(ping))
        .route_layer(from_fn(bot_master_guard))
        .route_layer(from_fn_with_state(Arc::clone(&state), auth_middleware));

    let public_routes = Router::new()
        .route("/livez", get(livez))
        .route("/readyz", get(readyz));

    Router::new()
        .merge(public_routes)
        .merge(operator_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
