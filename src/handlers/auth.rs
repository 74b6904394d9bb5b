//! PIN login, current user, logout.

use super::resource::json_body;
use crate::auth::{issue_token, CurrentUser};
use crate::error::AppError;
use crate::registry::Resource;
use crate::schema::{validate, LoginFields, Mode};
use crate::service::ResourceService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Value,
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let body = validate::<LoginFields>(json_body(body)?, Mode::Create)?;
    let pin = body.get("pin").and_then(Value::as_str).unwrap_or_default();
    let user = ResourceService::find_by(&state.pool, Resource::Users, "pin", pin)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid PIN".into()))?;
    let user_id = user.get("id").and_then(Value::as_str).unwrap_or_default();
    let token = issue_token(&state.config.jwt_secret, user_id)?;
    tracing::info!(user = %user_id, "login");
    Ok(Json(LoginResponse { token, user }))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(user)
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<Value> {
    Json(json!({}))
}
