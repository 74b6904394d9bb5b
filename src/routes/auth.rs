//! Authentication routes. Static paths take precedence over `/api/:resource/:id`.

use crate::handlers::auth::{login, logout, me};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
}
