//! Structura API: REST CRUD over a manufacturing-operations SQLite store, with PIN login.

pub mod auth;
pub mod case;
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError};
pub use registry::Resource;
pub use routes::app;
pub use service::{ListParams, ResourceService};
pub use state::AppState;
pub use store::{connect, connect_in_memory, ensure_schema};
