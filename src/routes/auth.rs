use axum::routing::{get, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(handlers::auth_page))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout))
}
