use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use structura_api::{connect, seed, AppConfig, Resource, ResourceService};

fn scratch_db() -> PathBuf {
    std::env::temp_dir()
        .join(format!("structura-concurrent-{}", uuid::Uuid::new_v4().simple()))
        .join("structura.db")
}

fn patch(body: Value) -> Map<String, Value> {
    body.as_object().cloned().expect("object body")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_wait_for_the_writer_lock() {
    let path = scratch_db();
    let config = AppConfig {
        database_path: path.clone(),
        busy_timeout: Duration::from_secs(10),
        ..AppConfig::default()
    };
    let pool = connect(&config).await.expect("file database");
    seed::run(&pool, false).await.expect("seed");

    let mut tasks = Vec::new();
    for n in 0..100u32 {
        let pool = pool.clone();
        tasks.push(tokio::spawn(async move {
            ResourceService::update(&pool, Resource::Machines, "M-01", patch(json!({ "efficiency": n % 101 }))).await
        }));
    }
    let mut failures = Vec::new();
    for task in tasks {
        if let Err(e) = task.await.expect("join") {
            failures.push(e.to_string());
        }
    }
    assert!(failures.is_empty(), "{} updates failed, first: {:?}", failures.len(), failures.first());

    let m01 = ResourceService::get(&pool, Resource::Machines, "M-01").await.unwrap().unwrap();
    assert_eq!(m01["name"], json!("Conf. China 1"));
    assert_eq!(m01["operatorIds"], json!(["U-002"]));

    pool.close().await;
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test]
async fn update_of_missing_row_writes_nothing() {
    let pool = structura_api::connect_in_memory().await.unwrap();
    let err = ResourceService::update(&pool, Resource::Machines, "M-404", patch(json!({ "efficiency": 50 })))
        .await
        .unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    let err = ResourceService::update(&pool, Resource::Machines, "M-404", Map::new()).await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
}
