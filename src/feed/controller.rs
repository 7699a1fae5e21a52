// Client feed state machine - pure transitions plus a driver that talks to a surface
use url::Url;

use crate::db::models::Post;
use crate::feed::client::{FeedError, FeedQuery, FeedResponse, FeedSource};
use crate::feed::render::{CardView, PaginationView};
use crate::feed::share::{copy_text, find_post_index, share_url, ShareTarget};

pub const POSTS_PER_PAGE: usize = 8;
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load posts. Please try again later.";
pub const COPIED_MESSAGE: &str = "Copied to clipboard!";

/// Where rendered cards, pagination controls and notices go.
pub trait Surface {
    fn render(&mut self, cards: &[CardView], pagination: &PaginationView)
        -> Result<(), FeedError>;

    fn scroll_to_top(&mut self);

    fn show_message(&mut self, message: &str);
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

/// The active filter criterion. Only one applies at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    Type(String),
    Tag(String),
}

impl FeedFilter {
    /// `"all"` clears the filter.
    pub fn by_type(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Type(value.to_string())
        }
    }

    pub fn by_tag(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Tag(value.to_string())
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Type(kind) => post.kind.as_str() == kind,
            Self::Tag(tag) => &post.tag == tag,
        }
    }
}

/// Loaded feed: everything fetched, the filtered subset, and the page shown.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    all_posts: Vec<Post>,
    filtered_posts: Vec<Post>,
    current_page: usize,
    posts_per_page: usize,
    filter: FeedFilter,
}

impl FeedView {
    pub fn new(posts: Vec<Post>, posts_per_page: usize) -> Self {
        Self {
            filtered_posts: posts.clone(),
            all_posts: posts,
            current_page: 1,
            posts_per_page: posts_per_page.max(1),
            filter: FeedFilter::All,
        }
    }

    pub fn all_posts(&self) -> &[Post] {
        &self.all_posts
    }

    pub fn filtered_posts(&self) -> &[Post] {
        &self.filtered_posts
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn posts_per_page(&self) -> usize {
        self.posts_per_page
    }

    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }

    /// Recompute the filtered subset from every fetched post and go back to page 1.
    pub fn with_filter(self, filter: FeedFilter) -> Self {
        let filtered_posts = self
            .all_posts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Self {
            filtered_posts,
            current_page: 1,
            filter,
            ..self
        }
    }

    pub fn filter_by_type(self, kind: &str) -> Self {
        self.with_filter(FeedFilter::by_type(kind))
    }

    pub fn filter_by_tag(self, tag: &str) -> Self {
        self.with_filter(FeedFilter::by_tag(tag))
    }

    pub fn total_pages(&self) -> usize {
        self.filtered_posts.len().div_ceil(self.posts_per_page)
    }

    pub fn has_page(&self, page: usize) -> bool {
        page >= 1 && page <= self.total_pages()
    }

    /// Move to `page`; out of range leaves the view untouched.
    pub fn change_page(self, page: usize) -> Self {
        if !self.has_page(page) {
            return self;
        }
        Self {
            current_page: page,
            ..self
        }
    }

    pub fn visible_posts(&self) -> &[Post] {
        let start = (self.current_page - 1) * self.posts_per_page;
        if start >= self.filtered_posts.len() {
            return &[];
        }
        let end = (start + self.posts_per_page).min(self.filtered_posts.len());
        &self.filtered_posts[start..end]
    }

    pub fn find_post(&self, id: i64) -> Option<&Post> {
        find_post_index(&self.all_posts, id).map(|i| &self.all_posts[i])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Loading,
    Loaded(FeedView),
    Error {
        message: String,
    },
}

/// Pure state transitions
impl FeedState {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Loaded(_) => "Loaded",
            Self::Error { .. } => "Error",
        }
    }

    pub fn view(&self) -> Option<&FeedView> {
        match self {
            Self::Loaded(view) => Some(view),
            _ => None,
        }
    }

    /// Transition: Idle | Loaded | Error → Loading
    pub fn begin_load(self) -> Result<Self, FeedError> {
        match self {
            Self::Loading => Err(FeedError::InvalidTransition(
                "A feed load is already in flight".into(),
            )),
            _ => Ok(Self::Loading),
        }
    }

    /// Transition: Loading → Loaded | Error
    pub fn finish_load(
        self,
        outcome: Result<FeedResponse, FeedError>,
        posts_per_page: usize,
    ) -> Result<Self, FeedError> {
        match self {
            Self::Loading => Ok(match outcome {
                Ok(response) => Self::Loaded(FeedView::new(response.posts, posts_per_page)),
                Err(_) => Self::Error {
                    message: LOAD_FAILED_MESSAGE.to_string(),
                },
            }),
            other => Err(FeedError::InvalidTransition(format!(
                "Cannot finish loading from {} state",
                other.state_name()
            ))),
        }
    }

    /// Self-loop on Loaded: filter or paginate.
    pub fn update(self, f: impl FnOnce(FeedView) -> FeedView) -> Result<Self, FeedError> {
        match self {
            Self::Loaded(view) => Ok(Self::Loaded(f(view))),
            other => Err(FeedError::InvalidTransition(format!(
                "Cannot update the feed from {} state",
                other.state_name()
            ))),
        }
    }
}

/// Drives the state machine: fetches from a source and pushes every change
/// to a surface.
pub struct FeedController<S: FeedSource, V: Surface> {
    source: S,
    surface: V,
    state: FeedState,
    posts_per_page: usize,
    fetch_limit: u32,
    page_url: String,
    origin: String,
}

impl<S: FeedSource, V: Surface> FeedController<S, V> {
    /// `page_url` is what share links point at; `origin` prefixes copied upload links.
    pub fn new(
        source: S,
        surface: V,
        page_url: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            source,
            surface,
            state: FeedState::Idle,
            posts_per_page: POSTS_PER_PAGE,
            fetch_limit: FeedQuery::default().limit,
            page_url: page_url.into(),
            origin: origin.into(),
        }
    }

    pub fn with_posts_per_page(mut self, posts_per_page: usize) -> Self {
        self.posts_per_page = posts_per_page.max(1);
        self
    }

    pub fn with_fetch_limit(mut self, limit: u32) -> Self {
        self.fetch_limit = limit.max(1);
        self
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn into_surface(self) -> V {
        self.surface
    }

    /// Move the state through a pure transition. Callers check the source
    /// state first; `mem::take` leaves `Idle` behind if `f` still rejects it.
    fn advance(
        &mut self,
        f: impl FnOnce(FeedState) -> Result<FeedState, FeedError>,
    ) -> Result<(), FeedError> {
        self.state = f(std::mem::take(&mut self.state))?;
        Ok(())
    }

    fn update_view(&mut self, f: impl FnOnce(FeedView) -> FeedView) -> Result<(), FeedError> {
        self.loaded_view()?;
        self.advance(|s| s.update(f))
    }

    fn loaded_view(&self) -> Result<&FeedView, FeedError> {
        self.state.view().ok_or_else(|| {
            FeedError::InvalidTransition(format!(
                "No feed loaded (state is {})",
                self.state.state_name()
            ))
        })
    }

    fn render_current(&mut self) -> Result<(), FeedError> {
        let view = self.loaded_view()?;
        let cards: Vec<CardView> = view
            .visible_posts()
            .iter()
            .map(|p| CardView::from_post(p, &self.page_url))
            .collect();
        let pagination = PaginationView::new(view.current_page(), view.total_pages());
        self.surface.render(&cards, &pagination)
    }

    /// Fetch the feed and show its first page. A failed fetch lands in the
    /// Error state with a fallback notice instead of returning an error.
    pub async fn load(&mut self) -> Result<(), FeedError> {
        if matches!(self.state, FeedState::Loading) {
            return Err(FeedError::InvalidTransition(
                "A feed load is already in flight".into(),
            ));
        }
        self.advance(FeedState::begin_load)?;

        let outcome = self
            .source
            .fetch(FeedQuery {
                page: 1,
                limit: self.fetch_limit,
            })
            .await;
        if let Err(e) = &outcome {
            tracing::warn!("Feed load failed: {}", e);
        }

        let per_page = self.posts_per_page;
        self.advance(|s| s.finish_load(outcome, per_page))?;

        match &self.state {
            FeedState::Error { message } => {
                let message = message.clone();
                self.surface.show_message(&message);
                Ok(())
            }
            _ => self.render_current(),
        }
    }

    pub fn filter_by_type(&mut self, kind: &str) -> Result<(), FeedError> {
        self.update_view(|v| v.filter_by_type(kind))?;
        self.render_current()
    }

    pub fn filter_by_tag(&mut self, tag: &str) -> Result<(), FeedError> {
        self.update_view(|v| v.filter_by_tag(tag))?;
        self.render_current()
    }

    pub fn show_all(&mut self) -> Result<(), FeedError> {
        self.update_view(|v| v.with_filter(FeedFilter::All))?;
        self.render_current()
    }

    /// Returns whether the page changed. Out-of-range pages do nothing.
    pub fn change_page(&mut self, page: usize) -> Result<bool, FeedError> {
        if !self.loaded_view()?.has_page(page) {
            return Ok(false);
        }
        self.update_view(|v| v.change_page(page))?;
        self.render_current()?;
        self.surface.scroll_to_top();
        Ok(true)
    }

    /// Copy a post to the clipboard and report the result on the surface.
    /// Unknown ids are a no-op and return `false`.
    pub fn copy_post(
        &mut self,
        id: i64,
        clipboard: &mut impl Clipboard,
    ) -> Result<bool, FeedError> {
        let text = match self.loaded_view()?.find_post(id) {
            Some(post) => copy_text(post, &self.origin),
            None => return Ok(false),
        };

        match clipboard.write_text(&text) {
            Ok(()) => {
                self.surface.show_message(COPIED_MESSAGE);
                Ok(true)
            }
            Err(e) => {
                self.surface.show_message(&format!("Failed to copy: {}", e));
                Ok(false)
            }
        }
    }

    /// Share link for a post, or `None` when the id is not in the feed.
    pub fn share_link(&self, id: i64, target: ShareTarget) -> Result<Option<Url>, FeedError> {
        let Some(post) = self.loaded_view()?.find_post(id) else {
            return Ok(None);
        };
        share_url(target, post, &self.page_url)
            .map(Some)
            .map_err(|e| FeedError::Share(e.to_string()))
    }
}
