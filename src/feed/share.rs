// Share/Copy adapter - outbound share links and clipboard text per post
use url::Url;

use crate::db::models::{Post, PostKind};

/// Shared in place of an image, since share targets take text or links.
pub const IMAGE_SHARE_TEXT: &str = "Check out this awesome image on ShareFeed!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShareTarget {
    Whatsapp,
    Facebook,
    Twitter,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 3] = [Self::Whatsapp, Self::Facebook, Self::Twitter];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Whatsapp => "WhatsApp",
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
        }
    }
}

pub fn shareable_text(post: &Post) -> &str {
    match post.kind {
        PostKind::Text => &post.content,
        PostKind::Image => IMAGE_SHARE_TEXT,
    }
}

/// Build the outbound link for `target`. `page_url` is the page being shared.
pub fn share_url(target: ShareTarget, post: &Post, page_url: &str) -> Result<Url, url::ParseError> {
    let text = shareable_text(post);
    match target {
        ShareTarget::Whatsapp => Url::parse_with_params(
            "https://wa.me/",
            &[("text", format!("{} {}", text, page_url))],
        ),
        ShareTarget::Facebook => Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            &[("u", page_url)],
        ),
        ShareTarget::Twitter => Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[("text", text), ("url", page_url)],
        ),
    }
}

/// Clipboard text: the literal content of a text post, or the absolute
/// upload URL of an image post.
pub fn copy_text(post: &Post, origin: &str) -> String {
    match post.kind {
        PostKind::Text => post.content.clone(),
        PostKind::Image => format!("{}/uploads/{}", origin.trim_end_matches('/'), post.content),
    }
}

/// Position of the post with `id` in `posts`, if any.
pub fn find_post_index(posts: &[Post], id: i64) -> Option<usize> {
    posts.iter().position(|p| p.id == id)
}
