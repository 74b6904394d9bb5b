//! Resource CRUD handlers: list, create, read, update, delete.
//! The path segment picks the resource; bodies go through the resource's schema before the service.

use crate::error::AppError;
use crate::registry::Resource;
use crate::schema::{validate_body, Mode};
use crate::service::{ListParams, ResourceService};
use crate::sql::SortOrder;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn resolve(segment: &str) -> Result<Resource, AppError> {
    Resource::from_path(segment).ok_or_else(|| AppError::NotFound(format!("Unknown resource: {}", segment)))
}

/// Unwrap a JSON body, reporting syntax errors the same way as schema violations.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(v)| v).map_err(|e| AppError::invalid("body", e.body_text()))
}

fn parse_int(field: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| AppError::invalid(field, "must be an integer"))
}

/// Split list query parameters into paging/sort controls and column filters.
pub fn list_params(query: HashMap<String, String>) -> Result<ListParams, AppError> {
    let mut params = ListParams::default();
    for (k, v) in query {
        match k.as_str() {
            "limit" => params.limit = Some(parse_int("limit", &v)?),
            "offset" => params.offset = Some(parse_int("offset", &v)?),
            "orderBy" | "order_by" => params.order_by = Some(v).filter(|s| !s.is_empty()),
            "order" => {
                params.order = SortOrder::parse(&v)
                    .ok_or_else(|| AppError::BadRequest(format!("Invalid order '{}'. Allowed: asc, desc", v)))?;
            }
            _ => params.filters.push((k, v)),
        }
    }
    params.filters.sort();
    Ok(params)
}

pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&segment)?;
    let params = list_params(query)?;
    let rows = ResourceService::list(&state.pool, resource, &params).await?;
    Ok(Json(Value::Array(rows)))
}

pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&segment)?;
    let body = validate_body(resource, Mode::Create, json_body(body)?)?;
    let row = ResourceService::create(&state.pool, resource, body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn read(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&segment)?;
    let row = ResourceService::get(&state.pool, resource, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&segment)?;
    let patch = validate_body(resource, Mode::Update, json_body(body)?)?;
    let row = ResourceService::update(&state.pool, resource, &id, patch).await?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&segment)?;
    ResourceService::delete(&state.pool, resource, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
