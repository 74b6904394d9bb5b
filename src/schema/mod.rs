//! Closed per-resource input schemas.
//!
//! Each resource declares its fields once; the declaration yields a typed struct whose fields are
//! [`Field`] values, so "absent" and "explicit null" stay distinguishable. The same struct serves
//! both modes: [`Mode::Create`] enforces required fields and fills defaults, [`Mode::Update`]
//! keeps only what the caller supplied.
//!
//! Validation output is the canonical externally-keyed (camelCase) body handed to the service.

use crate::case::to_camel_case;
use crate::error::{AppError, Violation, MAX_VIOLATIONS};
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// Input value with explicit presence.
#[derive(Clone, Debug, PartialEq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// How a field behaves when omitted or null.
#[derive(Clone, Debug)]
pub enum Presence {
    /// Primary key: optional on create, rejected on update.
    Key,
    /// Must be supplied (non-null) on create.
    Required,
    /// Nullable; null when omitted on create.
    Optional,
    /// Non-null; this value when omitted on create.
    Default(Value),
}

/// Constraint checked against the supplied value.
#[derive(Clone, Copy, Debug)]
pub enum Rule {
    /// Inclusive character-count bounds.
    Length(usize, usize),
    Min(f64),
    Max(f64),
    Pattern(&'static str),
    Email,
}

/// Schema for one resource. Implemented by `resource_schema!`.
pub trait Schema: Sized {
    /// Field identifiers as declared (snake_case, raw identifiers allowed).
    const FIELDS: &'static [&'static str];

    fn parse(body: &Map<String, Value>, report: &mut Report) -> Self;

    fn emit(self, mode: Mode, report: &mut Report) -> Map<String, Value>;
}

/// External (camelCase) name for a declared field identifier.
pub fn external_name(declared: &str) -> String {
    to_camel_case(declared.trim_start_matches("r#"))
}

/// Collected violations for one request body.
#[derive(Debug, Default)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    fn has(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    pub fn finish(mut self) -> Result<(), AppError> {
        if self.violations.is_empty() {
            return Ok(());
        }
        self.violations.truncate(MAX_VIOLATIONS);
        Err(AppError::Validation(self.violations))
    }

    /// Read one field out of the body. Type errors are recorded and yield `Absent`.
    pub fn parse<T: DeserializeOwned>(&mut self, body: &Map<String, Value>, declared: &str) -> Field<T> {
        let name = external_name(declared);
        match body.get(&name) {
            None => Field::Absent,
            Some(Value::Null) => Field::Null,
            Some(v) => match T::deserialize(v) {
                Ok(t) => Field::Value(t),
                Err(e) => {
                    self.push(name, e.to_string());
                    Field::Absent
                }
            },
        }
    }

    /// Write one field into the canonical output according to mode and presence.
    pub fn emit<T: Serialize>(
        &mut self,
        out: &mut Map<String, Value>,
        mode: Mode,
        declared: &str,
        field: Field<T>,
        presence: Presence,
        rules: &[Rule],
    ) {
        let name = external_name(declared);
        if self.has(&name) {
            return;
        }
        if mode == Mode::Update && matches!(presence, Presence::Key) {
            if !field.is_absent() {
                self.push(name, "field cannot be changed");
            }
            return;
        }
        match field {
            Field::Value(v) => match serde_json::to_value(v) {
                Ok(value) => {
                    if let Some(message) = rules.iter().find_map(|r| check_rule(&value, r)) {
                        self.push(name, message);
                    } else {
                        out.insert(name, value);
                    }
                }
                Err(e) => self.push(name, e.to_string()),
            },
            Field::Null => match presence {
                Presence::Key | Presence::Optional => {
                    out.insert(name, Value::Null);
                }
                Presence::Required | Presence::Default(_) => self.push(name, "may not be null"),
            },
            Field::Absent => {
                if mode == Mode::Update {
                    return;
                }
                match presence {
                    Presence::Required => self.push(name, "field required"),
                    Presence::Key | Presence::Optional => {
                        out.insert(name, Value::Null);
                    }
                    Presence::Default(d) => {
                        out.insert(name, d);
                    }
                }
            }
        }
    }
}

fn check_rule(v: &Value, rule: &Rule) -> Option<String> {
    match *rule {
        Rule::Length(min, max) => {
            let len = v.as_str()?.chars().count();
            if len < min {
                Some(format!("must be at least {} characters", min))
            } else if len > max {
                Some(format!("must be at most {} characters", max))
            } else {
                None
            }
        }
        Rule::Min(min) => {
            let n = v.as_f64()?;
            (n < min).then(|| format!("must be at least {}", min))
        }
        Rule::Max(max) => {
            let n = v.as_f64()?;
            (n > max).then(|| format!("must be at most {}", max))
        }
        Rule::Pattern(pattern) => {
            let s = v.as_str()?;
            match Regex::new(pattern) {
                Ok(re) if re.is_match(s) => None,
                Ok(_) => Some("does not match required pattern".into()),
                Err(_) => Some("invalid pattern".into()),
            }
        }
        Rule::Email => {
            let s = v.as_str()?;
            (!s.contains('@') || s.len() < 3).then(|| "must be a valid email".into())
        }
    }
}

/// Validate a raw body against schema `S`: closed field set, types, presence, rules.
pub fn validate<S: Schema>(body: Value, mode: Mode) -> Result<Map<String, Value>, AppError> {
    let Value::Object(body) = body else {
        return Err(AppError::invalid("body", "must be a JSON object"));
    };
    let mut report = Report::default();
    let known: Vec<String> = S::FIELDS.iter().map(|f| external_name(f)).collect();
    for key in body.keys() {
        if !known.iter().any(|k| k == key) {
            report.push(key.clone(), "extra inputs are not permitted");
        }
    }
    let parsed = S::parse(&body, &mut report);
    let out = parsed.emit(mode, &mut report);
    report.finish()?;
    Ok(out)
}

/// Declares a resource schema: a struct of [`Field`]s plus its [`Schema`] impl.
///
/// `field: Type = presence, rule, rule;`
macro_rules! resource_schema {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident : $ty:ty = $presence:expr $(, $rule:expr)* ; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $name {
            $( pub $field: $crate::schema::Field<$ty>, )*
        }

        impl $crate::schema::Schema for $name {
            const FIELDS: &'static [&'static str] = &[ $( stringify!($field) ),* ];

            fn parse(
                body: &serde_json::Map<String, serde_json::Value>,
                report: &mut $crate::schema::Report,
            ) -> Self {
                $name {
                    $( $field: report.parse::<$ty>(body, stringify!($field)), )*
                }
            }

            fn emit(
                self,
                mode: $crate::schema::Mode,
                report: &mut $crate::schema::Report,
            ) -> serde_json::Map<String, serde_json::Value> {
                let mut out = serde_json::Map::new();
                $(
                    report.emit(
                        &mut out,
                        mode,
                        stringify!($field),
                        self.$field,
                        $presence,
                        &[$($rule),*],
                    );
                )*
                out
            }
        }
    };
}

mod enums;
mod resources;

pub use enums::*;
pub use resources::*;
