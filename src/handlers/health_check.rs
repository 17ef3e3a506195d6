//! # Health Check Handlers
//!
//! Endpoints used by orchestration infrastructure and operators:
//!
//! - `GET /livez` - the process can answer HTTP at all
//! - `GET /readyz` - the process can reach its database
//! - `GET /api/healthcheck/ping` - an authorized operator can reach the API
//!
//! None of them keep state between calls or retry anything.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::middleware::AuthUser;
use crate::models::AppState;
use crate::services::database::probe_connection;

/// Body of a successful liveness probe
#[derive(Debug, Serialize)]
pub struct LivenessStatus {
    pub status: &'static str,
}

/// Body of a failed readiness probe
#[derive(Debug, Serialize)]
pub struct ProbeFailure {
    pub error: String,
}

/// Operator ping.
///
/// GET /api/healthcheck/ping
///
/// Only reachable through the bot master guard, so running at all means the
/// caller is authorized.
///
/// # Returns
///
/// - `200 OK` with body `pong!`
#[instrument(skip_all)]
pub async fn ping(Extension(user): Extension<AuthUser>) -> &'static str {
    debug!(subject = %user.subject, "Operator ping");
    "pong!"
}

/// Liveness probe.
///
/// GET /livez
///
/// Performs no dependency checks.
///
/// # Returns
///
/// - `200 OK` with body `{"status":"ready"}`
#[instrument]
pub async fn livez() -> Json<LivenessStatus> {
    debug!("Liveness probe accessed");
    Json(LivenessStatus { status: "ready" })
}

/// Readiness probe.
///
/// GET /readyz
///
/// Opens a database connection and closes it again, bounded by the configured
/// timeout and by server shutdown. A client that disconnects early drops this
/// future, which releases any connection already opened.
///
/// # Returns
///
/// - `200 OK` with body `ready` - the database answered
/// - `503 Service Unavailable` with `{"error": "..."}` - it did not
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn readyz(State(state): State<Arc<AppState>>) -> Response {
    let result = probe_connection(
        state.database.as_ref(),
        state.readiness_timeout,
        &state.shutdown,
    )
    .await;

    match result {
        Ok(()) => {
            debug!("Readiness probe succeeded");
            (StatusCode::OK, "ready").into_response()
        }
        Err(e) => {
            // The body only carries the sanitized message. Driver detail stays
            // at debug so default output matches the quiet 503 contract.
            debug!(error = ?e, "Readiness probe failed");
            let body = ProbeFailure {
                error: e.to_string(),
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}
