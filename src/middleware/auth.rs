//! # Authentication Middleware
//!
//! Validates bearer tokens and makes the caller's identity available to the
//! layers and handlers behind it.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, trace, warn};

use crate::error::{AppError, AppResult};
use crate::models::AppState;
use crate::services::jwt::Claims;

/// Authentication middleware for protecting routes
///
/// # Authentication Flow
///
/// 1. Extracts `Authorization` header with `Bearer <token>` format
/// 2. Validates the JWT token signature and expiration
/// 3. Adds [`AuthUser`] to request extensions for downstream access
///
/// # Returns
///
/// - **Success**: Continues to next layer with caller context
/// - **Failure**: Returns `401 Unauthorized` for invalid/missing tokens
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    trace!("Processing authentication middleware");

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(auth_header) = auth_header else {
        warn!("Missing Authorization header");
        return Err(AppError::Unauthorized("Missing bearer token"));
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        warn!("Invalid Authorization header format");
        return Err(AppError::Unauthorized("Invalid authorization scheme"));
    };

    match state.jwt_service.validate_access_token(token) {
        Ok(claims) => {
            debug!(subject = %claims.sub, "Authentication successful");
            req.extensions_mut().insert(AuthUser {
                subject: claims.sub.clone(),
                claims,
            });
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(error = %e, "Token validation failed");
            Err(AppError::Unauthorized("Invalid or expired token"))
        }
    }
}

/// Authenticated caller information available to handlers
///
/// Inserted into request extensions by [`auth_middleware`].
///
/// ```rust
/// use axum::extract::Extension;
/// use clembot_api::middleware::AuthUser;
/// async fn protected_handler(Extension(user): Extension<AuthUser>) -> String {
///     format!("Hello {}", user.subject)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Token subject
    pub subject: String,
    /// JWT claims, including granted capabilities
    pub claims: Claims,
}
