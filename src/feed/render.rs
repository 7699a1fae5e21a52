// Card and pagination view models, plus the askama surface that renders them
use askama::Template;

use crate::db::models::{Post, PostKind};
use crate::feed::client::FeedError;
use crate::feed::controller::Surface;
use crate::feed::share::{share_url, ShareTarget};

#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub target: &'static str,
    pub label: &'static str,
    pub href: String,
}

/// Everything a card needs, with content already split for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: i64,
    pub tag: String,
    pub kind: PostKind,
    /// Text content split on line breaks; empty for image posts.
    pub lines: Vec<String>,
    /// `/uploads/<name>` for image posts.
    pub image_src: Option<String>,
    pub share_links: Vec<ShareLink>,
}

impl CardView {
    pub fn from_post(post: &Post, page_url: &str) -> Self {
        let (lines, image_src) = match post.kind {
            PostKind::Text => (post.content.lines().map(String::from).collect(), None),
            PostKind::Image => (Vec::new(), Some(format!("/uploads/{}", post.content))),
        };

        let share_links = ShareTarget::ALL
            .iter()
            .filter_map(|target| {
                let href = share_url(*target, post, page_url).ok()?;
                Some(ShareLink {
                    target: target.key(),
                    label: target.label(),
                    href: href.to_string(),
                })
            })
            .collect();

        Self {
            id: post.id,
            tag: post.tag.clone(),
            kind: post.kind,
            lines,
            image_src,
            share_links,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == PostKind::Image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub number: usize,
    pub active: bool,
}

/// Previous / numbered / Next controls. Hidden when there is at most one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: usize,
    pub total: usize,
    pub pages: Vec<PageButton>,
}

impl PaginationView {
    pub fn new(current: usize, total: usize) -> Self {
        let pages = (1..=total)
            .map(|number| PageButton {
                number,
                active: number == current,
            })
            .collect();
        Self {
            current,
            total,
            pages,
        }
    }

    pub fn visible(&self) -> bool {
        self.total > 1
    }

    pub fn prev_disabled(&self) -> bool {
        self.current <= 1
    }

    pub fn next_disabled(&self) -> bool {
        self.current >= self.total
    }
}

#[derive(Template)]
#[template(path = "components/post_cards.html")]
pub struct PostCardsTemplate<'a> {
    pub cards: &'a [CardView],
}

#[derive(Template)]
#[template(path = "components/pagination.html")]
pub struct PaginationTemplate<'a> {
    pub view: &'a PaginationView,
}

/// Surface that renders HTML fragments and keeps the latest ones.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    pub cards_html: String,
    pub pagination_html: String,
    pub messages: Vec<String>,
    pub scrolls: usize,
}

impl Surface for HtmlSurface {
    fn render(
        &mut self,
        cards: &[CardView],
        pagination: &PaginationView,
    ) -> Result<(), FeedError> {
        self.cards_html = PostCardsTemplate { cards }
            .render()
            .map_err(|e| FeedError::Render(e.to_string()))?;
        self.pagination_html = PaginationTemplate { view: pagination }
            .render()
            .map_err(|e| FeedError::Render(e.to_string()))?;
        Ok(())
    }

    fn scroll_to_top(&mut self) {
        self.scrolls += 1;
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
