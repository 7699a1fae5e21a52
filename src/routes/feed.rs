use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::AppResult;
use crate::feed::{FeedPage, FeedService, PageQuery, Pagination};
use crate::state::AppState;

/// GET /all-posts?page=&limit= - one newest-first page of the feed
async fn all_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<FeedPage>> {
    let pagination = Pagination::from_query(&query, &state.config.feed);
    let page = FeedService::new(state.posts.clone())
        .list_posts(pagination)
        .await?;
    Ok(Json(page))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/all-posts", get(all_posts))
}
