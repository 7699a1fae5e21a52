use async_trait::async_trait;

use sharefeed::db::models::{Post, PostKind};
use sharefeed::feed::controller::{COPIED_MESSAGE, LOAD_FAILED_MESSAGE};
use sharefeed::feed::render::HtmlSurface;
use sharefeed::feed::{
    Clipboard, FeedController, FeedError, FeedQuery, FeedResponse, FeedSource, FeedState,
    ShareTarget,
};

const ORIGIN: &str = "http://localhost:3000";
const PAGE_URL: &str = "http://localhost:3000/";

struct FakeSource {
    result: Result<Vec<Post>, FeedError>,
}

#[async_trait]
impl FeedSource for FakeSource {
    async fn fetch(&self, query: FeedQuery) -> Result<FeedResponse, FeedError> {
        assert_eq!(query.page, 1);
        self.result.clone().map(|posts| FeedResponse {
            posts,
            current_page: Some(1),
            total_pages: Some(1),
            has_next_page: Some(false),
            has_prev_page: Some(false),
        })
    }
}

#[derive(Default)]
struct FakeClipboard {
    copied: Vec<String>,
    fail: bool,
}

impl Clipboard for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        if self.fail {
            return Err("permission denied".into());
        }
        self.copied.push(text.to_string());
        Ok(())
    }
}

fn post(id: i64, kind: PostKind, tag: &str, content: &str) -> Post {
    Post {
        id,
        user_id: 1,
        tag: tag.into(),
        kind,
        content: content.into(),
        created_at: format!("2025-01-01T00:00:{:02}.000Z", id),
    }
}

/// Newest first, like the server returns them.
fn text_posts(n: i64) -> Vec<Post> {
    (1..=n)
        .rev()
        .map(|i| post(i, PostKind::Text, "news", &format!("post {}", i)))
        .collect()
}

async fn loaded(posts: Vec<Post>) -> FeedController<FakeSource, HtmlSurface> {
    let mut controller = FeedController::new(
        FakeSource { result: Ok(posts) },
        HtmlSurface::default(),
        PAGE_URL,
        ORIGIN,
    );
    controller.load().await.unwrap();
    controller
}

fn visible_ids(controller: &FeedController<FakeSource, HtmlSurface>) -> Vec<i64> {
    controller
        .state()
        .view()
        .unwrap()
        .visible_posts()
        .iter()
        .map(|p| p.id)
        .collect()
}

#[tokio::test]
async fn nine_posts_paginate_eight_then_one() {
    let mut controller = loaded(text_posts(9)).await;
    let view = controller.state().view().unwrap();
    assert_eq!(view.total_pages(), 2);
    assert_eq!(view.current_page(), 1);
    assert_eq!(visible_ids(&controller), vec![9, 8, 7, 6, 5, 4, 3, 2]);
    assert!(controller.surface().pagination_html.contains("Next"));

    assert!(controller.change_page(2).unwrap());
    assert_eq!(visible_ids(&controller), vec![1]);
    assert_eq!(controller.surface().scrolls, 1);
}

#[tokio::test]
async fn out_of_range_pages_change_nothing() {
    let mut controller = loaded(text_posts(9)).await;
    let before = controller.state().clone();

    assert!(!controller.change_page(0).unwrap());
    assert!(!controller.change_page(3).unwrap());
    assert_eq!(controller.state(), &before);
    assert_eq!(controller.surface().scrolls, 0);
}

#[tokio::test]
async fn filter_by_type_over_mixed_feed() {
    let mut posts = text_posts(5);
    posts.extend((6..=8).map(|i| post(i, PostKind::Image, "pics", &format!("{}.png", i))));
    let mut controller = loaded(posts).await;

    controller.filter_by_type("image").unwrap();
    let view = controller.state().view().unwrap();
    assert_eq!(view.filtered_posts().len(), 3);
    assert!(view.filtered_posts().iter().all(|p| p.kind == PostKind::Image));
    assert!(controller.surface().cards_html.contains("6.png"));

    controller.filter_by_type("all").unwrap();
    assert_eq!(controller.state().view().unwrap().filtered_posts().len(), 8);
}

#[tokio::test]
async fn filter_change_resets_to_page_one() {
    let mut controller = loaded(text_posts(20)).await;
    controller.change_page(3).unwrap();
    assert_eq!(controller.state().view().unwrap().current_page(), 3);

    controller.filter_by_tag("news").unwrap();
    assert_eq!(controller.state().view().unwrap().current_page(), 1);

    controller.change_page(2).unwrap();
    controller.show_all().unwrap();
    assert_eq!(controller.state().view().unwrap().current_page(), 1);
}

#[tokio::test]
async fn tag_all_is_identity() {
    let posts = text_posts(4);
    let mut controller = loaded(posts.clone()).await;
    controller.filter_by_tag("all").unwrap();
    assert_eq!(controller.state().view().unwrap().filtered_posts(), &posts[..]);
}

#[tokio::test]
async fn copy_text_post_copies_literal_content() {
    let mut controller = loaded(vec![post(1, PostKind::Text, "t", "hello")]).await;
    let mut clipboard = FakeClipboard::default();

    assert!(controller.copy_post(1, &mut clipboard).unwrap());
    assert_eq!(clipboard.copied, vec!["hello"]);
    assert_eq!(controller.surface().messages, vec![COPIED_MESSAGE]);
}

#[tokio::test]
async fn copy_image_post_copies_absolute_upload_url() {
    let mut controller = loaded(vec![post(2, PostKind::Image, "t", "123.png")]).await;
    let mut clipboard = FakeClipboard::default();

    controller.copy_post(2, &mut clipboard).unwrap();
    assert_eq!(clipboard.copied, vec!["http://localhost:3000/uploads/123.png"]);
}

#[tokio::test]
async fn copy_unknown_id_is_a_no_op() {
    let mut controller = loaded(text_posts(2)).await;
    let mut clipboard = FakeClipboard::default();

    assert!(!controller.copy_post(42, &mut clipboard).unwrap());
    assert!(clipboard.copied.is_empty());
    assert!(controller.surface().messages.is_empty());
}

#[tokio::test]
async fn copy_failure_is_reported() {
    let mut controller = loaded(text_posts(1)).await;
    let mut clipboard = FakeClipboard {
        fail: true,
        ..Default::default()
    };

    assert!(!controller.copy_post(1, &mut clipboard).unwrap());
    assert_eq!(
        controller.surface().messages,
        vec!["Failed to copy: permission denied"]
    );
}

#[tokio::test]
async fn copy_looks_past_the_active_filter() {
    let posts = vec![
        post(1, PostKind::Text, "a", "first"),
        post(2, PostKind::Text, "b", "second"),
    ];
    let mut controller = loaded(posts).await;
    controller.filter_by_tag("a").unwrap();

    let mut clipboard = FakeClipboard::default();
    assert!(controller.copy_post(2, &mut clipboard).unwrap());
    assert_eq!(clipboard.copied, vec!["second"]);
}

#[tokio::test]
async fn share_links_by_post_shape() {
    let controller = loaded(vec![
        post(1, PostKind::Text, "t", "hello world"),
        post(2, PostKind::Image, "t", "1.png"),
    ])
    .await;

    let url = controller
        .share_link(1, ShareTarget::Twitter)
        .unwrap()
        .unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("text".to_string(), "hello world".to_string()),
            ("url".to_string(), PAGE_URL.to_string()),
        ]
    );

    let url = controller
        .share_link(2, ShareTarget::Whatsapp)
        .unwrap()
        .unwrap();
    let text = url.query_pairs().next().unwrap().1.into_owned();
    assert!(text.ends_with(PAGE_URL));
    assert!(!text.contains("1.png"));

    assert!(controller.share_link(99, ShareTarget::Facebook).unwrap().is_none());
}

#[tokio::test]
async fn failed_load_shows_fallback_message() {
    let mut controller = FeedController::new(
        FakeSource {
            result: Err(FeedError::Contract("missing field `posts`".into())),
        },
        HtmlSurface::default(),
        PAGE_URL,
        ORIGIN,
    );

    controller.load().await.unwrap();
    assert_eq!(
        controller.state(),
        &FeedState::Error {
            message: LOAD_FAILED_MESSAGE.into()
        }
    );
    assert_eq!(controller.surface().messages, vec![LOAD_FAILED_MESSAGE]);

    let err = controller.filter_by_type("text").unwrap_err();
    assert!(matches!(err, FeedError::InvalidTransition(_)));
    assert!(matches!(controller.state(), FeedState::Error { .. }));
}

#[tokio::test]
async fn reload_replaces_all_posts() {
    let mut controller = loaded(text_posts(3)).await;
    controller.filter_by_tag("nothing-matches").unwrap();
    assert!(controller.state().view().unwrap().filtered_posts().is_empty());
    assert!(controller.surface().cards_html.contains("No posts"));

    controller.load().await.unwrap();
    let view = controller.state().view().unwrap();
    assert_eq!(view.filtered_posts().len(), 3);
    assert_eq!(view.current_page(), 1);
}

#[tokio::test]
async fn custom_page_size() {
    let mut controller = FeedController::new(
        FakeSource {
            result: Ok(text_posts(5)),
        },
        HtmlSurface::default(),
        PAGE_URL,
        ORIGIN,
    )
    .with_posts_per_page(2);
    controller.load().await.unwrap();

    assert_eq!(controller.state().view().unwrap().total_pages(), 3);
    controller.change_page(3).unwrap();
    assert_eq!(visible_ids(&controller), vec![1]);
}

#[tokio::test]
async fn updates_before_load_are_rejected_without_touching_state() {
    let mut controller = FeedController::new(
        FakeSource {
            result: Ok(text_posts(3)),
        },
        HtmlSurface::default(),
        PAGE_URL,
        ORIGIN,
    );

    assert!(matches!(
        controller.change_page(1),
        Err(FeedError::InvalidTransition(_))
    ));
    assert!(matches!(
        controller.show_all(),
        Err(FeedError::InvalidTransition(_))
    ));
    assert_eq!(controller.state(), &FeedState::Idle);

    controller.load().await.unwrap();
    controller.filter_by_type("image").unwrap();
    let view = controller.state().view().unwrap();
    assert_eq!(view.all_posts().len(), 3);
    assert!(view.filtered_posts().is_empty());
}
