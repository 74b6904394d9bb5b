//! Deterministic fixture data: known users and machines, upserted by id.

use crate::codec::encode_row;
use crate::error::AppError;
use crate::registry::Resource;
use crate::sql::{quoted, upsert, QueryBuf};
use serde_json::{json, Value};
use sqlx::{SqliteConnection, SqlitePool};

fn users() -> Vec<Value> {
    vec![
        json!({ "id": "U-001", "name": "Admin Principal", "role": "ADMIN", "pin": "1234", "avatar": null }),
        json!({ "id": "U-002", "name": "Juan Perez", "role": "OPERATOR", "pin": "0000", "avatar": null }),
        json!({ "id": "U-003", "name": "Maria Gomez", "role": "OPERATOR", "pin": "1111", "avatar": null }),
        json!({ "id": "U-004", "name": "Carlos Diaz", "role": "OPERATOR", "pin": "2222", "avatar": null }),
    ]
}

#[allow(clippy::too_many_arguments)]
fn machine(
    id: &str,
    name: &str,
    brand: &str,
    kind: &str,
    category: Option<&str>,
    oee: [u32; 4],
    operators: &[&str],
    last_maintenance: Option<&str>,
    color: &str,
    meters: [i64; 2],
) -> Value {
    json!({
        "id": id,
        "name": name,
        "brand": brand,
        "type": kind,
        "category": category,
        "status": "IDLE",
        "efficiency": oee[0],
        "oee_availability": oee[1],
        "oee_performance": oee[2],
        "oee_quality": oee[3],
        "operator_ids": operators,
        "current_job_id": null,
        "is_active": true,
        "last_maintenance": last_maintenance,
        "color": color,
        "total_meters_produced": meters[0],
        "next_maintenance_meters": meters[1],
    })
}

fn machines() -> Vec<Value> {
    vec![
        machine("M-01", "Conf. China 1", "China", "CONFORMADORA", Some("STANDARD"), [92, 95, 97, 99], &["U-002"], Some("2023-10-01"), "#10b981", [12000, 15000]),
        machine("M-02", "Conf. Cunmac", "Cunmac", "CONFORMADORA", Some("STANDARD"), [0, 0, 0, 0], &[], Some("2023-09-15"), "#f59e0b", [8000, 10000]),
        machine("M-03", "Conf. Framemac", "Framemac", "CONFORMADORA", Some("STANDARD"), [88, 90, 95, 98], &["U-004"], Some("2023-10-10"), "#06b6d4", [15000, 20000]),
        machine("M-06", "Taller Herrería", "Interno", "HERRERIA", None, [100; 4], &["U-004"], None, "#f97316", [0, 0]),
        machine("M-07", "Estación Panelizado", "Pinnacle", "PANELIZADO", None, [100; 4], &["U-003"], None, "#8b5cf6", [0, 0]),
        machine("M-CARGA", "Unidad de Despacho", "Logística", "CARGA", None, [100; 4], &[], None, "#3b82f6", [0, 0]),
    ]
}

/// Rows written per table.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub machines: usize,
}

async fn execute(conn: &mut SqliteConnection, q: &QueryBuf) -> Result<(), AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "seed");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query.execute(&mut *conn).await?;
    Ok(())
}

async fn upsert_all(conn: &mut SqliteConnection, resource: Resource, rows: Vec<Value>) -> Result<usize, AppError> {
    let mut n = 0;
    for row in rows {
        let Value::Object(mut row) = row else { continue };
        encode_row(&mut row, resource);
        execute(conn, &upsert(resource, &row)).await?;
        n += 1;
    }
    Ok(n)
}

/// Upsert the fixtures in one transaction. With `reset`, users and machines are emptied first;
/// that fails with an integrity error while other rows still reference them.
pub async fn run(pool: &SqlitePool, reset: bool) -> Result<SeedReport, AppError> {
    let mut tx = pool.begin().await?;
    if reset {
        for resource in [Resource::Users, Resource::Machines] {
            let q = QueryBuf {
                sql: format!("DELETE FROM {}", quoted(resource.table())),
                params: Vec::new(),
            };
            execute(&mut tx, &q).await?;
        }
    }
    let report = SeedReport {
        users: upsert_all(&mut tx, Resource::Users, users()).await?,
        machines: upsert_all(&mut tx, Resource::Machines, machines()).await?,
    };
    tx.commit().await?;
    tracing::info!(users = report.users, machines = report.machines, reset, "seed done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::object_keys_to_camel_case;
    use crate::schema::{validate_body, Mode};
    use crate::service::{ListParams, ResourceService};
    use crate::store::connect_in_memory;

    #[test]
    fn fixtures_satisfy_their_schemas() {
        let all = users()
            .into_iter()
            .map(|u| (Resource::Users, u))
            .chain(machines().into_iter().map(|m| (Resource::Machines, m)));
        for (resource, row) in all {
            let mut row = row.as_object().cloned().unwrap();
            object_keys_to_camel_case(&mut row);
            validate_body(resource, Mode::Create, Value::Object(row)).unwrap();
        }
    }

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        let first = run(&pool, false).await.unwrap();
        let second = run(&pool, false).await.unwrap();
        assert_eq!(first, SeedReport { users: 4, machines: 6 });
        assert_eq!(first, second);

        let rows = ResourceService::list(&pool, Resource::Machines, &ListParams::default()).await.unwrap();
        assert_eq!(rows.len(), 6);
        let m01 = ResourceService::get(&pool, Resource::Machines, "M-01").await.unwrap().unwrap();
        assert_eq!(m01["operatorIds"], json!(["U-002"]));
        assert_eq!(m01["isActive"], json!(true));
    }

    #[tokio::test]
    async fn reset_restores_fixture_values() {
        let pool = connect_in_memory().await.unwrap();
        run(&pool, false).await.unwrap();
        sqlx::query("UPDATE users SET name = 'Changed' WHERE id = 'U-002'")
            .execute(&pool)
            .await
            .unwrap();
        run(&pool, true).await.unwrap();
        let u = ResourceService::get(&pool, Resource::Users, "U-002").await.unwrap().unwrap();
        assert_eq!(u["name"], json!("Juan Perez"));
    }
}
