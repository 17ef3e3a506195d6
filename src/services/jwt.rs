//! # JWT Service
//!
//! Issues and validates the bearer tokens that operator tooling presents to
//! protected endpoints. Tokens are HS256-signed and carry the caller's
//! capabilities (for example [`BOT_MASTER`](crate::middleware::BOT_MASTER)).
//!
//! Tokens are stateless: validation checks signature and expiry only and never
//! touches the database.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::utils::constant::ACCESS_TOKEN_EXPIRY;

/// Errors that can occur during JWT operations
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// JWT claims structure for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (the operator or bot the token was issued to)
    pub sub: String,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Capabilities granted to the subject
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Service for signing and verifying access tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a new JWT service with the provided keys.
    pub fn new(encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        Self {
            encoding_key,
            decoding_key,
        }
    }

    /// Creates a service that signs and verifies with one shared HMAC secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
        )
    }

    /// Issues an access token for `subject` carrying `capabilities`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::EncodingError`] if signing fails.
    #[instrument(skip(self))]
    pub fn create_access_token(
        &self,
        subject: &str,
        capabilities: &[&str],
    ) -> Result<String, JwtError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            exp: now + ACCESS_TOKEN_EXPIRY.as_secs(),
            iat: now,
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        trace!("Access token created");
        Ok(token)
    }

    /// Validates an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`JwtError::TokenExpired`] - Token has expired
    /// - [`JwtError::InvalidToken`] - Token is malformed or has invalid signature
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        trace!("Validating access token");

        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                trace!(subject = %token_data.claims.sub, "Access token validated successfully");
                Ok(token_data.claims)
            }
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Access token expired");
                Err(JwtError::TokenExpired)
            }
            Err(e) => {
                debug!(error = %e, "Invalid access token");
                Err(JwtError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SECRET: &[u8] = b"unit-test-secret";

    #[test]
    fn issued_token_round_trips_capabilities() {
        let service = JwtService::from_secret(SECRET);

        let token = service
            .create_access_token("clembot", &["bot_master"])
            .unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "clembot");
        assert_eq!(claims.capabilities, vec!["bot_master".to_string()]);
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY.as_secs());
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issuer = JwtService::from_secret(b"someone-else");
        let service = JwtService::from_secret(SECRET);

        let token = issuer.create_access_token("mallory", &["bot_master"]).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = JwtService::from_secret(SECRET);
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: "clembot".into(),
            exp: now - 3600,
            iat: now - 7200,
            capabilities: vec!["bot_master".into()],
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn missing_capabilities_claim_defaults_to_empty() {
        let service = JwtService::from_secret(SECRET);
        let now = jsonwebtoken::get_current_timestamp();
        let token = encode(
            &Header::default(),
            &json!({ "sub": "user", "exp": now + 60, "iat": now }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert!(claims.capabilities.is_empty());
    }

    #[test]
    fn garbage_is_invalid() {
        let service = JwtService::from_secret(SECRET);
        assert!(matches!(
            service.validate_access_token("not.a.jwt"),
            Err(JwtError::InvalidToken)
        ));
    }
}
