//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for one resource table.
//! Identifiers come from the registry only; values are always bound.

use super::params::BindValue;
use crate::registry::{Resource, PK};
use serde_json::{Map, Value};

/// Quote identifier for SQLite (needed for columns such as "from" and "to").
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> &'static str {
        self.params.push(v);
        "?"
    }
}

fn select_column_list(resource: Resource) -> String {
    resource
        .columns()
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key.
pub fn select_by_id(resource: Resource, id: &str) -> QueryBuf {
    select_by_column(resource, PK, BindValue::Text(id.to_string()))
}

/// SELECT rows where one column equals a value, ordered by primary key.
pub fn select_by_column(resource: Resource, column: &str, value: BindValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(value);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} ORDER BY {}",
        select_column_list(resource),
        quoted(resource.table()),
        quoted(column),
        ph,
        quoted(PK)
    );
    q
}

/// SELECT page with equality filters (AND-ed, bound in order), optional sort, LIMIT/OFFSET.
/// Without a sort key rows come back in primary-key order; with one, the primary key breaks ties.
pub fn select_list(
    resource: Resource,
    filters: Vec<(&'static str, BindValue)>,
    sort: Option<(&'static str, SortOrder)>,
    limit: u32,
    offset: u32,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        let ph = q.push_param(val);
        where_parts.push(format!("{} = {}", quoted(col), ph));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = match sort {
        Some((col, order)) if col == PK => format!(" ORDER BY {} {}", quoted(PK), order.keyword()),
        Some((col, order)) => format!(" ORDER BY {} {}, {}", quoted(col), order.keyword(), quoted(PK)),
        None => format!(" ORDER BY {}", quoted(PK)),
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(resource),
        quoted(resource.table()),
        where_clause,
        order_clause,
        limit,
        offset
    );
    q
}

/// INSERT of the catalogue columns present in `row` (internal names, JSON columns already encoded).
pub fn insert(resource: Resource, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in resource.columns() {
        let Some(v) = row.get(c.name) else { continue };
        placeholders.push(q.push_param(BindValue::from_json(v)));
        cols.push(quoted(c.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(resource.table()),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// INSERT that overwrites the supplied columns when the primary key already exists.
pub fn upsert(resource: Resource, row: &Map<String, Value>) -> QueryBuf {
    let mut q = insert(resource, row);
    let sets: Vec<String> = resource
        .columns()
        .iter()
        .filter(|c| c.name != PK && row.contains_key(c.name))
        .map(|c| format!("{0} = excluded.{0}", quoted(c.name)))
        .collect();
    if sets.is_empty() {
        q.sql.push_str(&format!(" ON CONFLICT({}) DO NOTHING", quoted(PK)));
    } else {
        q.sql.push_str(&format!(" ON CONFLICT({}) DO UPDATE SET {}", quoted(PK), sets.join(", ")));
    }
    q
}

/// UPDATE by id: SET only catalogue columns present in `patch`, primary key excluded.
/// Returns None when nothing would be set.
pub fn update(resource: Resource, id: &str, patch: &Map<String, Value>) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in resource.columns() {
        if c.name == PK {
            continue;
        }
        let Some(v) = patch.get(c.name) else { continue };
        let ph = q.push_param(BindValue::from_json(v));
        sets.push(format!("{} = {}", quoted(c.name), ph));
    }
    if sets.is_empty() {
        return None;
    }
    let ph = q.push_param(BindValue::Text(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(resource.table()),
        sets.join(", "),
        quoted(PK),
        ph
    );
    Some(q)
}

/// DELETE by id.
pub fn delete(resource: Resource, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(BindValue::Text(id.to_string()));
    q.sql = format!("DELETE FROM {} WHERE {} = {}", quoted(resource.table()), quoted(PK), ph);
    q
}
