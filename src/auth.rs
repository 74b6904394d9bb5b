//! Signed session tokens (HS256) and the authenticated-user extractor.

use crate::error::AppError;
use crate::registry::Resource;
use crate::service::ResourceService;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens stay valid this many days after issue.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        }
    }
}

pub fn issue_token(secret: &str, user_id: &str) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        &Claims::new(user_id),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token generation: {}", e)))
}

/// Check signature and expiry; a token without a subject is invalid.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        AppError::Unauthorized("Invalid token".into())
    })?;
    if data.claims.sub.is_empty() {
        return Err(AppError::Unauthorized("Invalid token".into()));
    }
    Ok(data.claims)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The user named by a valid bearer token, as an external (camelCase) record.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Value);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;
        let claims = verify_token(&state.config.jwt_secret, token)?;
        let user = ResourceService::get(&state.pool, Resource::Users, &claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
        Ok(CurrentUser(user))
    }
}
