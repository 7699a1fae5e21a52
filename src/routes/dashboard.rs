use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::db::models::{Post, UserWithPostCount};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
struct DashboardTemplate {
    user_name: String,
    is_admin: bool,
    posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "pages/admin.html")]
struct AdminTemplate {
    user_name: String,
    users: Vec<UserWithPostCount>,
    total_posts: u64,
}

/// Personal dashboard: the user's own posts plus the add-post form
async fn dashboard(State(state): State<AppState>, maybe_user: MaybeUser) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(Redirect::to("/auth").into_response());
    };

    let posts = state.posts.list_by_user(user.id).await?;
    let is_admin = user.is_admin();
    Ok(Html(DashboardTemplate {
        user_name: user.name,
        is_admin,
        posts,
    })
    .into_response())
}

/// Admin dashboard: every user with their post count, and the total
async fn admin(State(state): State<AppState>, maybe_user: MaybeUser) -> AppResult<Response> {
    let user = match maybe_user.0 {
        Some(user) if user.is_admin() => user,
        _ => return Ok(Redirect::to("/auth").into_response()),
    };

    let users = state.users.list_with_post_counts().await?;
    let total_posts = state.posts.count().await?;
    Ok(Html(AdminTemplate {
        user_name: user.name,
        users,
        total_posts,
    })
    .into_response())
}

async fn set_blocked(
    state: &AppState,
    admin: &CurrentUser,
    id: i64,
    blocked: bool,
) -> AppResult<Redirect> {
    if !admin.is_admin() {
        return Err(AppError::Forbidden);
    }
    if admin.id == id {
        return Err(AppError::BadRequest("You cannot block yourself".into()));
    }

    state.users.set_blocked(id, blocked).await?;
    tracing::info!(user_id = id, blocked, by = admin.id, "Updated user block flag");
    Ok(Redirect::to("/admin"))
}

/// POST /admin/users/{id}/block
async fn block_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    set_blocked(&state, &user, id, true).await
}

/// POST /admin/users/{id}/unblock
async fn unblock_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    set_blocked(&state, &user, id, false).await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .route("/admin/users/{id}/block", post(block_user))
        .route("/admin/users/{id}/unblock", post(unblock_user))
}
