use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{delete, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::json;

use crate::db::models::PostKind;
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::posts::{PostBody, PostSubmission};
use crate::state::AppState;

/// Fields collected from the add-post form before they are validated.
#[derive(Default)]
struct AddPostForm {
    tag: Option<String>,
    kind: Option<String>,
    content: Option<String>,
    image: Option<(String, Bytes)>,
}

impl AddPostForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !filename.is_empty() && !data.is_empty() {
                        form.image = Some((filename, data));
                    }
                }
                "tag" | "type" | "content" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    match name.as_str() {
                        "tag" => form.tag = Some(value),
                        "type" => form.kind = Some(value),
                        _ => form.content = Some(value),
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    fn into_submission(self) -> AppResult<PostSubmission> {
        let tag = self.tag.map(|t| t.trim().to_string()).unwrap_or_default();
        if tag.is_empty() {
            return Err(AppError::BadRequest("Tag is required".into()));
        }

        let kind: PostKind = self
            .kind
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(AppError::BadRequest)?;

        let body = match kind {
            PostKind::Text => {
                let text = self.content.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(AppError::BadRequest("Content is required".into()));
                }
                PostBody::Text(text)
            }
            PostKind::Image => {
                let (filename, data) = self
                    .image
                    .ok_or_else(|| AppError::BadRequest("Image file is required".into()))?;
                PostBody::Image { filename, data }
            }
        };

        Ok(PostSubmission { tag, body })
    }
}

/// POST /add-post - multipart form with `tag`, `type` and `content` or `image`
async fn add_post(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let user = maybe_user.0.ok_or(AppError::Unauthorized)?;
    let submission = AddPostForm::read(multipart).await?.into_submission()?;

    state
        .lifecycle()
        .create_post(Some(&user), submission)
        .await?;

    Ok(Redirect::to("/dashboard"))
}

/// DELETE /delete-post/{id} - owner or admin only
async fn delete_post(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state.lifecycle().delete_post(id, maybe_user.0.as_ref()).await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-post", post(add_post))
        .route("/delete-post/{id}", delete(delete_post))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(tag: &str, kind: &str, content: Option<&str>) -> AddPostForm {
        AddPostForm {
            tag: Some(tag.into()),
            kind: Some(kind.into()),
            content: content.map(String::from),
            image: None,
        }
    }

    #[test]
    fn text_submission_keeps_content_verbatim() {
        let submission = form(" news ", "text", Some("line one\r\n<b>two</b>"))
            .into_submission()
            .unwrap();
        assert_eq!(submission.tag, "news");
        match submission.body {
            PostBody::Text(text) => assert_eq!(text, "line one\r\n<b>two</b>"),
            other => panic!("expected text body, got {:?}", other),
        }
    }

    #[test]
    fn image_submission_needs_a_file() {
        let err = form("pics", "image", None).into_submission().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Image file is required"));

        let mut with_file = form("pics", "image", None);
        with_file.image = Some(("cat.png".into(), Bytes::from_static(b"png")));
        let submission = with_file.into_submission().unwrap();
        assert_eq!(submission.body.kind(), PostKind::Image);
    }

    #[test]
    fn unknown_type_and_missing_tag_are_rejected() {
        assert!(matches!(
            form("x", "video", Some("hi")).into_submission(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            form("  ", "text", Some("hi")).into_submission(),
            Err(AppError::BadRequest(msg)) if msg == "Tag is required"
        ));
        assert!(matches!(
            form("x", "text", Some("   ")).into_submission(),
            Err(AppError::BadRequest(_))
        ));
    }
}
