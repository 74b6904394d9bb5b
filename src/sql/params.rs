//! Convert serde_json::Value (and query-string text) to values sqlx can bind.

use crate::error::AppError;
use crate::registry::{Column, ColumnKind};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
use sqlx::Database;

/// A value that can be bound to a SQLite query.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl BindValue {
    /// Bind value for a JSON body value. Arrays and objects are written as JSON text.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => BindValue::Null,
            Value::Bool(b) => BindValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => BindValue::I64(i),
                None => BindValue::F64(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => BindValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => BindValue::Text(v.to_string()),
        }
    }

    /// Bind value for a filter given as text, coerced to the column's storage kind.
    pub fn coerce(column: &Column, raw: &str, field: &str) -> Result<Self, AppError> {
        let bad = |what: &str| AppError::invalid(field, format!("must be {}", what));
        Ok(match column.kind {
            ColumnKind::Text | ColumnKind::Json => BindValue::Text(raw.to_string()),
            ColumnKind::Integer => BindValue::I64(raw.trim().parse().map_err(|_| bad("an integer"))?),
            ColumnKind::Real => BindValue::F64(raw.trim().parse().map_err(|_| bad("a number"))?),
            ColumnKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => BindValue::Bool(true),
                "false" | "0" => BindValue::Bool(false),
                _ => return Err(bad("a boolean")),
            },
        })
    }
}

impl<'q> Encode<'q, Sqlite> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            BindValue::Null => <Option<i64> as Encode<Sqlite>>::encode_by_ref(&None, buf)?,
            BindValue::Bool(b) => <bool as Encode<Sqlite>>::encode_by_ref(b, buf)?,
            BindValue::I64(n) => <i64 as Encode<Sqlite>>::encode_by_ref(n, buf)?,
            BindValue::F64(n) => <f64 as Encode<Sqlite>>::encode_by_ref(n, buf)?,
            BindValue::Text(s) => <String as Encode<Sqlite>>::encode_by_ref(s, buf)?,
        })
    }
}

impl sqlx::Type<Sqlite> for BindValue {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}
