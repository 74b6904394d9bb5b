//! SQLite pool construction and table DDL. DDL is idempotent and runs on every start.

use crate::config::AppConfig;
use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id VARCHAR(64) PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        role VARCHAR(32) NOT NULL,
        pin VARCHAR(32) NOT NULL,
        avatar VARCHAR(512),
        CONSTRAINT uq_users_pin UNIQUE (pin)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id VARCHAR(64) PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        contact_person VARCHAR(256) NOT NULL,
        email VARCHAR(256) NOT NULL,
        phone VARCHAR(64) NOT NULL,
        address TEXT,
        tax_id VARCHAR(64),
        CONSTRAINT uq_clients_email UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id VARCHAR(64) PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        client_id VARCHAR(64) REFERENCES clients (id),
        deadline VARCHAR(32) NOT NULL,
        status VARCHAR(32) NOT NULL,
        description TEXT,
        budget REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS machines (
        id VARCHAR(64) PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        type VARCHAR(64) NOT NULL,
        category VARCHAR(32),
        brand VARCHAR(128),
        status VARCHAR(32) NOT NULL,
        current_job_id VARCHAR(64),
        operator_ids TEXT NOT NULL DEFAULT '[]',
        efficiency REAL NOT NULL DEFAULT 0,
        oee_availability REAL NOT NULL DEFAULT 0,
        oee_performance REAL NOT NULL DEFAULT 0,
        oee_quality REAL NOT NULL DEFAULT 0,
        temperature REAL,
        last_maintenance VARCHAR(32),
        maintenance_reason VARCHAR(256),
        is_active BOOLEAN NOT NULL DEFAULT 1,
        color VARCHAR(32),
        total_meters_produced INTEGER NOT NULL DEFAULT 0,
        next_maintenance_meters INTEGER NOT NULL DEFAULT 0,
        CONSTRAINT ck_machine_efficiency CHECK (efficiency >= 0 AND efficiency <= 100),
        CONSTRAINT ck_machine_oee_avail CHECK (oee_availability >= 0 AND oee_availability <= 100),
        CONSTRAINT ck_machine_oee_perf CHECK (oee_performance >= 0 AND oee_performance <= 100),
        CONSTRAINT ck_machine_oee_qual CHECK (oee_quality >= 0 AND oee_quality <= 100)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id VARCHAR(64) PRIMARY KEY,
        project_id VARCHAR(64) NOT NULL REFERENCES projects (id),
        machine_type VARCHAR(64) NOT NULL,
        assigned_machine_id VARCHAR(64) REFERENCES machines (id),
        operator_ids TEXT NOT NULL DEFAULT '[]',
        product_name VARCHAR(256) NOT NULL,
        target_quantity INTEGER NOT NULL DEFAULT 0,
        completed_quantity INTEGER NOT NULL DEFAULT 0,
        scrap_quantity INTEGER,
        unit VARCHAR(32) NOT NULL,
        status VARCHAR(32) NOT NULL,
        start_date VARCHAR(32),
        end_date VARCHAR(32),
        priority_index INTEGER,
        file_url VARCHAR(512),
        notes TEXT,
        operator_notes TEXT,
        requires_panelizado BOOLEAN,
        linked_job_id VARCHAR(64) REFERENCES jobs (id),
        workflow_stages TEXT NOT NULL DEFAULT '[]',
        current_coil_id VARCHAR(64),
        is_stock BOOLEAN,
        tonnage REAL,
        completed_at VARCHAR(32),
        CONSTRAINT ck_job_completed_qty CHECK (completed_quantity >= 0),
        CONSTRAINT ck_job_target_qty CHECK (target_quantity >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id VARCHAR(64) PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        sku VARCHAR(64) NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0,
        unit VARCHAR(16) NOT NULL,
        min_threshold INTEGER NOT NULL DEFAULT 0,
        location VARCHAR(256) NOT NULL,
        is_manufactured BOOLEAN,
        CONSTRAINT uq_inventory_sku UNIQUE (sku),
        CONSTRAINT ck_inventory_quantity CHECK (quantity >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS alerts (
        id VARCHAR(64) PRIMARY KEY,
        type VARCHAR(64) NOT NULL,
        message TEXT NOT NULL,
        timestamp VARCHAR(64) NOT NULL,
        severity VARCHAR(16) NOT NULL,
        related_id VARCHAR(64)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id VARCHAR(64) PRIMARY KEY,
        timestamp VARCHAR(64) NOT NULL,
        machine_id VARCHAR(64) NOT NULL REFERENCES machines (id),
        type VARCHAR(64) NOT NULL,
        description TEXT NOT NULL,
        severity VARCHAR(16) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id VARCHAR(64) PRIMARY KEY,
        "from" VARCHAR(64) NOT NULL REFERENCES users (id),
        "to" VARCHAR(64) NOT NULL REFERENCES users (id),
        content TEXT NOT NULL,
        timestamp VARCHAR(64) NOT NULL,
        is_read BOOLEAN NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS project_accessories (
        id VARCHAR(64) PRIMARY KEY,
        project_id VARCHAR(64) NOT NULL REFERENCES projects (id),
        inventory_item_id VARCHAR(64) NOT NULL REFERENCES inventory (id),
        quantity_required INTEGER NOT NULL,
        quantity_allocated INTEGER NOT NULL DEFAULT 0,
        is_fulfilled BOOLEAN NOT NULL DEFAULT 0
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS ix_machines_status ON machines (status)",
    "CREATE INDEX IF NOT EXISTS ix_projects_client_id ON projects (client_id)",
    "CREATE INDEX IF NOT EXISTS ix_projects_status ON projects (status)",
    "CREATE INDEX IF NOT EXISTS ix_jobs_project_id ON jobs (project_id)",
    "CREATE INDEX IF NOT EXISTS ix_jobs_assigned_machine_id ON jobs (assigned_machine_id)",
    "CREATE INDEX IF NOT EXISTS ix_jobs_status ON jobs (status)",
    "CREATE INDEX IF NOT EXISTS ix_alerts_timestamp ON alerts (timestamp)",
    "CREATE INDEX IF NOT EXISTS ix_alerts_severity ON alerts (severity)",
    "CREATE INDEX IF NOT EXISTS ix_events_machine_id ON events (machine_id)",
    "CREATE INDEX IF NOT EXISTS ix_events_timestamp ON events (timestamp)",
    "CREATE INDEX IF NOT EXISTS ix_messages_to ON messages (\"to\")",
    "CREATE INDEX IF NOT EXISTS ix_messages_is_read ON messages (is_read)",
    "CREATE INDEX IF NOT EXISTS ix_pa_project_id ON project_accessories (project_id)",
    "CREATE INDEX IF NOT EXISTS ix_pa_inventory_item_id ON project_accessories (inventory_item_id)",
];

/// Create every table and index if missing.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for ddl in TABLES.iter().chain(INDEXES) {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Open the configured database file (creating it and its directory) and apply the schema.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, AppError> {
    let path = &config.database_path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(format!("create {}: {}", parent.display(), e)))?;
    }
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;
    ensure_schema(&pool).await?;
    tracing::info!(path = %path.display(), "database ready");
    Ok(pool)
}

/// Private in-memory database with the schema applied. A single connection that is never
/// recycled, so every caller sees the same data.
pub async fn connect_in_memory() -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}
