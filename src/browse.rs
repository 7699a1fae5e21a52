// `sharefeed browse` - drive the feed controller against a running server
use std::fmt::Write as _;

use crate::config::BrowseArgs;
use crate::feed::render::{CardView, PaginationView};
use crate::feed::{Clipboard, FeedController, FeedError, FeedState, HttpFeedSource, Surface};

/// Plain-text surface. Keeps the latest frame so a run prints it once.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    pub frame: String,
    pub messages: Vec<String>,
}

impl Surface for TerminalSurface {
    fn render(
        &mut self,
        cards: &[CardView],
        pagination: &PaginationView,
    ) -> Result<(), FeedError> {
        self.frame = format_frame(cards, pagination);
        Ok(())
    }

    fn scroll_to_top(&mut self) {}

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Clipboard stand-in that captures the copied text for printing.
#[derive(Debug, Default)]
pub struct CapturedClipboard {
    pub text: Option<String>,
}

impl Clipboard for CapturedClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

fn bounded(label: &str, disabled: bool) -> String {
    if disabled {
        format!("({})", label)
    } else {
        label.to_string()
    }
}

pub fn format_frame(cards: &[CardView], pagination: &PaginationView) -> String {
    let mut out = String::new();
    if cards.is_empty() {
        out.push_str("No posts to show.\n");
    }
    for card in cards {
        let _ = writeln!(out, "[{}] #{} ({})", card.id, card.tag, card.kind);
        match &card.image_src {
            Some(src) => {
                let _ = writeln!(out, "    image: {}", src);
            }
            None => {
                for line in &card.lines {
                    let _ = writeln!(out, "    {}", line);
                }
            }
        }
    }

    if pagination.visible() {
        let mut bar = Vec::with_capacity(pagination.pages.len() + 2);
        bar.push(bounded("Previous", pagination.prev_disabled()));
        for button in &pagination.pages {
            bar.push(if button.active {
                format!("[{}]", button.number)
            } else {
                button.number.to_string()
            });
        }
        bar.push(bounded("Next", pagination.next_disabled()));
        let _ = writeln!(out, "{}", bar.join(" "));
    }
    out
}

pub async fn run(args: BrowseArgs) -> anyhow::Result<()> {
    let source = HttpFeedSource::new(&args.url)?;
    let origin = source.origin();
    let page_url = source.base_url().to_string();

    let mut controller = FeedController::new(source, TerminalSurface::default(), page_url, origin)
        .with_posts_per_page(args.per_page)
        .with_fetch_limit(args.limit);

    controller.load().await?;
    if let FeedState::Error { message } = controller.state() {
        anyhow::bail!("{}", message);
    }

    if let Some(kind) = args.kind.as_deref() {
        controller.filter_by_type(kind)?;
    }
    if let Some(tag) = args.tag.as_deref() {
        controller.filter_by_tag(tag)?;
    }
    if args.page != 1 && !controller.change_page(args.page)? {
        eprintln!("Page {} is out of range, showing page 1", args.page);
    }

    let mut clipboard = CapturedClipboard::default();
    if let Some(id) = args.copy {
        if !controller.copy_post(id, &mut clipboard)? {
            eprintln!("No post with id {} in the feed", id);
        }
    }

    let share = match (args.share, args.post) {
        (Some(target), Some(id)) => match controller.share_link(id, target)? {
            Some(url) => Some(url),
            None => anyhow::bail!("No post with id {} in the feed", id),
        },
        _ => None,
    };

    let surface = controller.into_surface();
    print!("{}", surface.frame);
    for message in &surface.messages {
        eprintln!("{}", message);
    }
    if let Some(text) = clipboard.text {
        println!("{}", text);
    }
    if let Some(url) = share {
        println!("{}", url);
    }
    Ok(())
}
