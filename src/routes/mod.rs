pub mod assets;
pub mod auth;
pub mod dashboard;
pub mod feed;
pub mod home;
pub mod posts;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router with every route, layer and the uploads directory.
pub fn app(state: AppState) -> Router {
    let upload_limit = state.config.storage.max_upload_mb * 1024 * 1024;
    let uploads = ServeDir::new(state.config.uploads_path());

    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .nest_service("/uploads", uploads)
        .merge(auth::router())
        .merge(feed::router())
        .merge(posts::router())
        .merge(dashboard::router())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
