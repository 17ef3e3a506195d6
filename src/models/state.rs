use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::services::{database::DatabaseConnector, jwt::JwtService};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Opens connections to the backing database for readiness checks.
    pub database: Arc<dyn DatabaseConnector>,
    /// JWT service for token validation.
    pub jwt_service: JwtService,
    /// Upper bound for one readiness probe.
    pub readiness_timeout: Duration,
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `database` - Connectivity provider probed by `/readyz`
    /// * `jwt_service` - Service for JWT token operations
    /// * `readiness_timeout` - Deadline for a single readiness probe
    /// * `shutdown` - Token cancelled on graceful shutdown
    pub fn new(
        database: Arc<dyn DatabaseConnector>,
        jwt_service: JwtService,
        readiness_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        info!("Initializing application state");
        debug!(
            readiness_timeout_ms = readiness_timeout.as_millis() as u64,
            "Readiness probe deadline configured"
        );

        Self {
            database,
            jwt_service,
            readiness_timeout,
            shutdown,
        }
    }
}
