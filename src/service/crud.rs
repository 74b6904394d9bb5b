//! Generic CRUD execution against SQLite, one resource at a time.
//!
//! Bodies arrive validated and camelCase-keyed; rows leave decoded and camelCase-keyed. Every
//! write runs in its own transaction, and a transaction dropped on an error path rolls back.

use crate::case::{object_keys_to_camel_case, object_keys_to_snake_case, to_camel_case, to_snake_case};
use crate::codec::{decode_row, encode_row};
use crate::error::AppError;
use crate::registry::{ColumnKind, Resource, PK};
use crate::sql::{delete, insert, select_by_column, select_by_id, select_list, update, BindValue, QueryBuf, SortOrder};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 500;

/// List request as received: raw bounds, sort field in either case, filters as text.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Option<String>,
    pub order: SortOrder,
    /// (field name, raw value); unknown and JSON-valued fields are ignored.
    pub filters: Vec<(String, String)>,
}

pub struct ResourceService;

impl ResourceService {
    /// One page of rows. Bounds and sort key are checked before any query runs.
    pub async fn list(pool: &SqlitePool, resource: Resource, params: &ListParams) -> Result<Vec<Value>, AppError> {
        let limit = match params.limit {
            None => DEFAULT_LIMIT,
            Some(n) if (1..=i64::from(MAX_LIMIT)).contains(&n) => n as u32,
            Some(_) => {
                return Err(AppError::invalid("limit", format!("must be between 1 and {}", MAX_LIMIT)));
            }
        };
        let offset = match params.offset {
            None => 0,
            Some(n) if n < 0 => return Err(AppError::invalid("offset", "must be at least 0")),
            Some(n) => u32::try_from(n)
                .map_err(|_| AppError::invalid("offset", format!("must be at most {}", u32::MAX)))?,
        };
        let sort = match &params.order_by {
            None => None,
            Some(field) => Some((sort_column(resource, field)?, params.order)),
        };
        let mut filters = Vec::new();
        for (name, raw) in &params.filters {
            let Some(column) = resource.column(&to_snake_case(name)) else {
                continue;
            };
            if column.kind == ColumnKind::Json {
                continue;
            }
            filters.push((column.name, BindValue::coerce(column, raw, name)?));
        }
        let q = select_list(resource, filters, sort, limit, offset);
        let mut conn = pool.acquire().await?;
        Self::query_many(&mut conn, resource, &q).await
    }

    /// One row by primary key, or None.
    pub async fn get(pool: &SqlitePool, resource: Resource, id: &str) -> Result<Option<Value>, AppError> {
        let mut conn = pool.acquire().await?;
        Self::query_one(&mut conn, resource, &select_by_id(resource, id)).await
    }

    /// First row whose `column` (internal name) equals `value`.
    pub async fn find_by(
        pool: &SqlitePool,
        resource: Resource,
        column: &str,
        value: &str,
    ) -> Result<Option<Value>, AppError> {
        if resource.column(column).is_none() {
            return Err(AppError::Internal(format!("{} has no column {}", resource, column)));
        }
        let q = select_by_column(resource, column, BindValue::Text(value.to_string()));
        let mut conn = pool.acquire().await?;
        Self::query_one(&mut conn, resource, &q).await
    }

    /// Insert one row and return it as stored. Assigns an id when none was supplied.
    pub async fn create(pool: &SqlitePool, resource: Resource, body: Map<String, Value>) -> Result<Value, AppError> {
        let mut row = body;
        object_keys_to_snake_case(&mut row);
        let id = match row.get(PK) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                let id = resource.new_id();
                row.insert(PK.to_string(), Value::String(id.clone()));
                id
            }
        };
        if resource == Resource::Projects && row.get("client_id").and_then(Value::as_str) == Some("") {
            row.insert("client_id".to_string(), Value::Null);
        }
        encode_row(&mut row, resource);

        let mut tx = pool.begin().await?;
        Self::execute(&mut tx, &insert(resource, &row)).await?;
        let created = Self::query_one(&mut tx, resource, &select_by_id(resource, &id))
            .await?
            .ok_or_else(|| AppError::Internal(format!("{} {} missing after insert", resource, id)))?;
        tx.commit().await?;
        tracing::debug!(%resource, %id, "created");
        Ok(created)
    }

    /// Apply a partial update; fields not in `patch` keep their stored values.
    pub async fn update(
        pool: &SqlitePool,
        resource: Resource,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Value, AppError> {
        let mut row = patch;
        object_keys_to_snake_case(&mut row);
        row.remove(PK);
        encode_row(&mut row, resource);

        let Some(q) = update(resource, id, &row) else {
            return Self::get(pool, resource, id).await?.ok_or_else(AppError::not_found);
        };
        // Write before reading: a deferred read transaction in WAL mode cannot wait to upgrade.
        let mut tx = pool.begin().await?;
        if Self::execute(&mut tx, &q).await? == 0 {
            return Err(AppError::not_found());
        }
        let updated = Self::query_one(&mut tx, resource, &select_by_id(resource, id))
            .await?
            .ok_or_else(AppError::not_found)?;
        tx.commit().await?;
        tracing::debug!(%resource, %id, "updated");
        Ok(updated)
    }

    /// Delete one row. No cascade: a referenced row fails with an integrity error.
    pub async fn delete(pool: &SqlitePool, resource: Resource, id: &str) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;
        let affected = Self::execute(&mut tx, &delete(resource, id)).await?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        tx.commit().await?;
        tracing::debug!(%resource, %id, "deleted");
        Ok(())
    }

    async fn execute(conn: &mut SqliteConnection, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.execute(&mut *conn).await?.rows_affected())
    }

    async fn query_one(conn: &mut SqliteConnection, resource: Resource, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        match query.fetch_optional(&mut *conn).await? {
            Some(row) => Ok(Some(row_to_json(&row, resource)?)),
            None => Ok(None),
        }
    }

    async fn query_many(conn: &mut SqliteConnection, resource: Resource, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let rows = query.fetch_all(&mut *conn).await?;
        rows.iter().map(|r| row_to_json(r, resource)).collect()
    }
}

/// Resolve an `orderBy` value (camelCase or snake_case) against the resource's allowlist.
fn sort_column(resource: Resource, field: &str) -> Result<&'static str, AppError> {
    let wanted = to_snake_case(field);
    resource
        .sortable_fields()
        .iter()
        .copied()
        .find(|c| *c == wanted)
        .ok_or_else(|| {
            let allowed: Vec<String> = resource.sortable_fields().iter().map(|c| to_camel_case(c)).collect();
            AppError::BadRequest(format!(
                "Invalid orderBy '{}'. Allowed: {}",
                field,
                allowed.join(", ")
            ))
        })
}

/// Decode a row by the catalogue's column kinds, then decode JSON columns and camelCase the keys.
fn row_to_json(row: &SqliteRow, resource: Resource) -> Result<Value, AppError> {
    let mut map = Map::new();
    for col in resource.columns() {
        let name = col.name;
        let v = match col.kind {
            ColumnKind::Text | ColumnKind::Json => row.try_get::<Option<String>, _>(name)?.map(Value::String),
            ColumnKind::Integer => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
            ColumnKind::Real => row.try_get::<Option<f64>, _>(name)?.map(Value::from),
            ColumnKind::Bool => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        };
        map.insert(name.to_string(), v.unwrap_or(Value::Null));
    }
    decode_row(&mut map, resource);
    object_keys_to_camel_case(&mut map);
    Ok(Value::Object(map))
}
