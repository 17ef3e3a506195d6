//! # Application Constants
//!
//! Defaults for settings that may be overridden through the environment, plus
//! fixed security parameters.

use std::time::Duration;

/// Address the HTTP server binds to when `BIND_ADDR` is unset
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8090";

/// Upper bound on a single readiness probe round trip
///
/// Orchestrators usually give up on a probe after a few seconds. Answering
/// 503 before they do keeps the reported reason meaningful.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Size of the PostgreSQL pool used by the readiness probe
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Log filter applied when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "clembot_api=info,tower_http=info";

/// Expiration time for operator access tokens
pub const ACCESS_TOKEN_EXPIRY: Duration = Duration::from_secs(60 * 60);
