//! Caller identity.
//!
//! Requests carry `Authorization: Bearer <jwt>`, an HS256 token signed with
//! the shared `JWT_SECRET`. Its `id` claim is the caller's user id. Issuing
//! tokens is left to the auth service in front of this API.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracker_core::UserId;

use super::{error::ApiError, state::AppState};

/// Token payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: String,
    /// Expiry, seconds since the epoch
    pub exp: u64,
}

/// Checks bearer tokens against the shared secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// User id named by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<UserId, ApiError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            ApiError::InvalidToken
        })?;

        data.claims.id.parse().map_err(|_| ApiError::InvalidToken)
    }
}

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        state.auth.verify(token).map(Caller)
    }
}

/// Sign a token for `user`, valid for `ttl_secs` (negative for already expired).
#[cfg(test)]
pub(crate) fn sign(secret: &str, user: UserId, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let exp = (chrono::Utc::now().timestamp() + ttl_secs).max(0) as u64;
    let claims = Claims {
        id: user.to_string(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
