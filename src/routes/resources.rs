//! Resource CRUD routes. The resource segment is a path parameter; handlers resolve it
//! against the registry, so an unknown name is a 404 on every verb.

use crate::handlers::resource::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/api/:resource", get(list).post(create))
        .route(
            "/api/:resource/:id",
            get(read).patch(update).delete(delete_handler),
        )
}
