use async_trait::async_trait;
use std::sync::Arc;

use crate::db::StoreResult;
use crate::feed::client::{FeedError, FeedQuery, FeedResponse, FeedSource};
use crate::feed::pagination::{FeedPage, Pagination};
use crate::posts::PostRepository;

/// Composes Post Store reads into a page of the feed.
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Newest-first page of posts. Pages past the end come back empty with
    /// the same metadata shape.
    pub async fn list_posts(&self, pagination: Pagination) -> StoreResult<FeedPage> {
        let posts = self
            .posts
            .list_page(pagination.limit, pagination.offset())
            .await?;
        let total = self.posts.count().await?;

        tracing::debug!(
            page = pagination.page,
            limit = pagination.limit,
            total,
            returned = posts.len(),
            "Listed feed page"
        );
        Ok(FeedPage::new(posts, pagination, total))
    }
}

impl From<FeedPage> for FeedResponse {
    fn from(page: FeedPage) -> Self {
        Self {
            posts: page.posts,
            current_page: Some(page.current_page),
            total_pages: Some(page.total_pages),
            has_next_page: Some(page.has_next_page),
            has_prev_page: Some(page.has_prev_page),
        }
    }
}

/// In-process source, so server-rendered pages go through the same
/// controller as remote clients.
#[async_trait]
impl FeedSource for FeedService {
    async fn fetch(&self, query: FeedQuery) -> Result<FeedResponse, FeedError> {
        match self.list_posts(Pagination::new(query.page, query.limit)).await {
            Ok(page) => Ok(page.into()),
            Err(e) => {
                tracing::error!("Feed read failed: {}", e);
                Err(FeedError::Server {
                    status: 500,
                    message: "Internal server error".into(),
                })
            }
        }
    }
}
