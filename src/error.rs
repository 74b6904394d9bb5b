//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// At most this many field violations are reported per request.
pub const MAX_VIOLATIONS: usize = 3;

pub const DUPLICATE_ENTRY: &str = "Duplicate entry: a record with this value already exists";
pub const MISSING_REFERENCE: &str = "Referenced record not found";
pub const INTEGRITY_ERROR: &str = "Data integrity error";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("config load: {0}")]
    Load(String),
}

/// One rejected input field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{}", join_violations(.0))]
    Validation(Vec<Violation>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("database: {0}")]
    Db(sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![Violation::new(field, message)])
    }

    pub fn not_found() -> Self {
        AppError::NotFound("Not found".into())
    }
}

/// Constraint family of a rejected write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Integrity {
    Unique,
    ForeignKey,
    Other,
}

/// Classify a database error as an integrity violation, if it is one.
/// Uses the driver's error kind first and falls back to SQLite's message text.
pub fn integrity_kind(e: &sqlx::Error) -> Option<Integrity> {
    let sqlx::Error::Database(db) = e else {
        return None;
    };
    match db.kind() {
        ErrorKind::UniqueViolation => Some(Integrity::Unique),
        ErrorKind::ForeignKeyViolation => Some(Integrity::ForeignKey),
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => Some(Integrity::Other),
        _ => {
            let msg = db.message();
            if msg.contains("UNIQUE constraint") {
                Some(Integrity::Unique)
            } else if msg.contains("FOREIGN KEY constraint") {
                Some(Integrity::ForeignKey)
            } else if msg.contains("constraint failed") {
                Some(Integrity::Other)
            } else {
                None
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match integrity_kind(&e) {
            Some(kind) => {
                tracing::warn!(?kind, error = %e, "integrity violation");
                match kind {
                    Integrity::Unique => AppError::Conflict(DUPLICATE_ENTRY.into()),
                    Integrity::ForeignKey => AppError::Unprocessable(MISSING_REFERENCE.into()),
                    Integrity::Other => AppError::BadRequest(INTEGRITY_ERROR.into()),
                }
            }
            None => AppError::Db(e),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Conflict(_) => "conflict",
            AppError::Unprocessable(_) => "unprocessable",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Db(sqlx::Error::RowNotFound) => "not_found",
            AppError::Db(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let details = match &self {
            AppError::Validation(violations) => serde_json::to_value(violations).ok(),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_fields() {
        let err = AppError::Validation(vec![
            Violation::new("efficiency", "must be at most 100"),
            Violation::new("name", "field required"),
        ]);
        assert_eq!(err.to_string(), "efficiency: must be at most 100; name: field required");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn non_database_errors_are_not_integrity_violations() {
        assert_eq!(integrity_kind(&sqlx::Error::RowNotFound), None);
        assert_eq!(AppError::from(sqlx::Error::RowNotFound).status(), StatusCode::NOT_FOUND);
    }

    async fn insert_err(sql: &str) -> sqlx::Error {
        let pool = crate::store::connect_in_memory().await.unwrap();
        sqlx::query(sql).execute(&pool).await.unwrap_err()
    }

    #[tokio::test]
    async fn check_violation_is_a_bad_request() {
        let e = insert_err(
            "INSERT INTO inventory (id, name, sku, quantity, unit, location) \
             VALUES ('INV-1', 'Bolt', 'B-1', -1, 'pcs', 'A1')",
        )
        .await;
        assert_eq!(integrity_kind(&e), Some(Integrity::Other));
        let err = AppError::from(e);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), INTEGRITY_ERROR);
    }

    #[tokio::test]
    async fn not_null_violation_is_a_bad_request() {
        let e = insert_err("INSERT INTO inventory (id, sku, unit, location) VALUES ('INV-2', 'B-2', 'pcs', 'A1')").await;
        assert_eq!(integrity_kind(&e), Some(Integrity::Other));
        assert_eq!(AppError::from(e).status(), StatusCode::BAD_REQUEST);
    }
}
