//! # Capability Guards
//!
//! Route layers that admit only callers whose token grants a given capability.
//! They expect [`auth_middleware`](super::auth_middleware) to run first.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{debug, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::jwt::Claims;

/// Capability held by bot operators ("bot masters")
pub const BOT_MASTER: &str = "bot_master";

/// Whether `claims` grant `capability`.
pub fn has_capability(claims: &Claims, capability: &str) -> bool {
    claims.capabilities.iter().any(|granted| granted == capability)
}

/// Admits only callers holding [`BOT_MASTER`].
///
/// - `401 Unauthorized` if no authenticated caller is attached to the request
/// - `403 Forbidden` if the caller lacks the capability
#[instrument(skip_all, fields(capability = BOT_MASTER))]
pub async fn bot_master_guard(req: Request, next: Next) -> AppResult<Response> {
    require_capability(BOT_MASTER, req, next).await
}

async fn require_capability(
    capability: &'static str,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    let Some(user) = req.extensions().get::<AuthUser>() else {
        warn!("No authenticated caller in request extensions");
        return Err(AppError::Unauthorized("Authentication required"));
    };

    if !has_capability(&user.claims, capability) {
        warn!(subject = %user.subject, "Caller lacks required capability");
        return Err(AppError::Forbidden("Missing required capability"));
    }

    debug!(subject = %user.subject, "Capability check passed");
    Ok(next.run(req).await)
}
