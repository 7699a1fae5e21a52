// Fetch boundary - typed feed contract and the HTTP source behind it
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::db::models::Post;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Contract(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("failed to render feed: {0}")]
    Render(String),

    #[error("failed to build share link: {0}")]
    Share(String),
}

/// Body of `GET /all-posts`. Only `posts` is mandatory; the pagination
/// fields are informational for a client that paginates locally.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub posts: Vec<Post>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub has_prev_page: Option<bool>,
}

pub fn parse_feed_response(body: &[u8]) -> Result<FeedResponse, FeedError> {
    serde_json::from_slice(body).map_err(|e| FeedError::Contract(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 100,
        }
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, query: FeedQuery) -> Result<FeedResponse, FeedError>;
}

/// Reads the feed from a running server over HTTP.
pub struct HttpFeedSource {
    client: reqwest::Client,
    base: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpFeedSource {
    pub fn new(base: &str) -> Result<Self, FeedError> {
        let base = Url::parse(base).map_err(|e| FeedError::Transport(e.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    /// Scheme, host and port of the server, used for absolute upload links.
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn feed_url(&self, query: FeedQuery) -> Result<Url, FeedError> {
        let mut url = self
            .base
            .join("/all-posts")
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("page", &query.page.to_string())
            .append_pair("limit", &query.limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, query: FeedQuery) -> Result<FeedResponse, FeedError> {
        let url = self.feed_url(query)?;
        tracing::debug!(%url, "Fetching feed");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(FeedError::Server {
                status: status.as_u16(),
                message,
            });
        }

        parse_feed_response(&body)
    }
}
