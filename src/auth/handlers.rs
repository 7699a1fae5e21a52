use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::{password, session};
use crate::db::models::Role;
use crate::error::{AppError, AppResult};
use crate::extractors::{cookie_value, MaybeUser};
use crate::routes::home::Html;
use crate::state::AppState;
use crate::users::NewUser;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/auth.html")]
pub struct AuthTemplate {
    pub notice: Option<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct AuthQuery {
    pub registered: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

fn see_other(location: &str, cookie: Option<String>) -> Response {
    let mut response =
        (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response();
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

// -- Handlers --

/// GET /auth - combined login and registration page
pub async fn auth_page(
    maybe_user: MaybeUser,
    Query(query): Query<AuthQuery>,
) -> AppResult<Response> {
    if let Some(user) = maybe_user.0 {
        return Ok(Redirect::to(user.role.dashboard_path()).into_response());
    }

    let notice = query
        .registered
        .map(|_| "Account created. You can log in now.".to_string());
    Ok(Html(AuthTemplate { notice }).into_response())
}

/// POST /register - create a regular account, then send the user to log in
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let name = required("Name", &form.name)?;
    let email = required("Email", &form.email)?.to_lowercase();
    if form.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }

    let password_hash = password::hash_password(&form.password)?;
    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = user.id, "Registered new user");
    Ok(see_other("/auth?registered=1", None))
}

/// POST /login - verify credentials, set the session cookie, redirect by role
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let email = form.email.trim().to_lowercase();
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !password::verify_password(&form.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }
    if user.is_blocked {
        return Err(AppError::Forbidden);
    }

    let hours = state.config.auth.session_hours;
    let token = session::create_session(&state.db, user.id, hours)?;
    let cookie = session_cookie(&state.config.auth.cookie_name, &token, hours);

    tracing::info!(user_id = user.id, role = user.role.as_str(), "User logged in");
    Ok(see_other(user.role.dashboard_path(), Some(cookie)))
}

/// GET /logout - delete session and redirect
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = cookie_value(&headers, cookie_name) {
        if let Err(e) = session::delete_session(&state.db, token) {
            tracing::warn!("Failed to delete session on logout: {}", e);
        }
    }

    Ok(see_other("/", Some(clear_session_cookie(cookie_name))))
}
