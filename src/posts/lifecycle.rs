use bytes::Bytes;
use std::sync::Arc;

use crate::db::models::{Post, PostKind, Role};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::posts::repository::{NewPost, PostRepository};
use crate::posts::uploads::AssetStore;

/// What the author sent for the post body.
#[derive(Debug, Clone)]
pub enum PostBody {
    Text(String),
    Image { filename: String, data: Bytes },
}

impl PostBody {
    pub fn kind(&self) -> PostKind {
        match self {
            Self::Text(_) => PostKind::Text,
            Self::Image { .. } => PostKind::Image,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostSubmission {
    pub tag: String,
    pub body: PostBody,
}

/// Owners may delete their own posts; admins may delete any post.
pub fn can_delete(user: &CurrentUser, post: &Post) -> bool {
    user.role == Role::Admin || user.id == post.user_id
}

/// Create/delete orchestration across the post store and the asset store.
pub struct PostLifecycle {
    posts: Arc<dyn PostRepository>,
    assets: Arc<dyn AssetStore>,
}

impl PostLifecycle {
    pub fn new(posts: Arc<dyn PostRepository>, assets: Arc<dyn AssetStore>) -> Self {
        Self { posts, assets }
    }

    pub async fn create_post(
        &self,
        author: Option<&CurrentUser>,
        submission: PostSubmission,
    ) -> AppResult<Post> {
        let author = author.ok_or(AppError::Unauthorized)?;

        let kind = submission.body.kind();
        let content = match submission.body {
            PostBody::Text(text) => text,
            PostBody::Image { filename, data } => self.assets.save(&filename, data).await?,
        };

        let created = self
            .posts
            .create(NewPost {
                user_id: author.id,
                tag: submission.tag,
                kind,
                content: content.clone(),
            })
            .await;
        let post = match created {
            Ok(post) => post,
            Err(e) => {
                if kind == PostKind::Image {
                    self.discard_asset(&content).await;
                }
                return Err(e.into());
            }
        };

        tracing::info!(post_id = post.id, user_id = author.id, kind = %kind, "Post created");
        Ok(post)
    }

    /// Drop an image whose row never made it into the store.
    async fn discard_asset(&self, name: &str) {
        match self.assets.remove(name).await {
            Ok(_) => tracing::info!(asset = %name, "Discarded asset of failed post"),
            Err(e) => tracing::warn!(asset = %name, "Failed to discard asset: {}", e),
        }
    }

    /// The asset goes first, then the row. If the row delete fails afterwards
    /// the asset is already gone.
    pub async fn delete_post(&self, id: i64, requester: Option<&CurrentUser>) -> AppResult<()> {
        let requester = requester.ok_or(AppError::Unauthorized)?;

        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post".into()))?;

        if !can_delete(requester, &post) {
            return Err(AppError::Forbidden);
        }

        if post.kind == PostKind::Image {
            let removed = self.assets.remove(&post.content).await?;
            if !removed {
                tracing::warn!(post_id = id, asset = %post.content, "Image asset already missing");
            }
        }

        if !self.posts.delete_by_id(id).await? {
            return Err(AppError::NotFound("Post".into()));
        }

        tracing::info!(post_id = id, user_id = requester.id, "Post deleted");
        Ok(())
    }
}
