use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::feed::render::HtmlSurface;
use crate::feed::{FeedController, FeedError, FeedService};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub user_name: Option<String>,
    pub dashboard_path: &'static str,
    pub selected_type: String,
    pub tag_filter: String,
    pub cards_html: String,
    pub pagination_html: String,
    pub notice: Option<String>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// `?type=&tag=&page=` on the home page. Same rules as the in-page filters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub tag: Option<String>,
    pub page: Option<String>,
}

fn origin(headers: &HeaderMap, config: &Config) -> String {
    match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        Some(host) => format!("http://{}", host),
        None => format!("http://{}:{}", config.server.host, config.server.port),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Run the feed controller in-process and keep the rendered fragments.
/// `feed.js` takes over once the page is loaded.
async fn render_feed(
    state: &AppState,
    query: &HomeQuery,
    origin: String,
) -> Result<HtmlSurface, FeedError> {
    let page_url = format!("{}/", origin);
    let mut controller = FeedController::new(
        FeedService::new(state.posts.clone()),
        HtmlSurface::default(),
        page_url,
        origin,
    );
    controller.load().await?;
    if controller.state().view().is_none() {
        return Ok(controller.into_surface());
    }

    if let Some(kind) = non_empty(&query.kind) {
        controller.filter_by_type(kind)?;
    }
    if let Some(tag) = non_empty(&query.tag) {
        controller.filter_by_tag(tag)?;
    }
    if let Some(page) = non_empty(&query.page).and_then(|p| p.parse::<usize>().ok()) {
        controller.change_page(page)?;
    }
    Ok(controller.into_surface())
}

/// Feed page. Server-rendered first page, then filtered and paginated
/// client-side from `/all-posts`.
pub async fn index(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Query(query): Query<HomeQuery>,
    headers: HeaderMap,
) -> AppResult<Html<HomeTemplate>> {
    let (user_name, dashboard_path) = match maybe_user.0 {
        Some(user) => (Some(user.name), user.role.dashboard_path()),
        None => (None, "/auth"),
    };

    let origin = origin(&headers, &state.config);
    let surface = render_feed(&state, &query, origin)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Html(HomeTemplate {
        user_name,
        dashboard_path,
        selected_type: non_empty(&query.kind).unwrap_or("all").to_string(),
        tag_filter: non_empty(&query.tag).unwrap_or_default().to_string(),
        cards_html: surface.cards_html,
        pagination_html: surface.pagination_html,
        notice: surface.messages.into_iter().next(),
    }))
}
