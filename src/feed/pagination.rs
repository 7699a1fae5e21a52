// Page arithmetic for the feed endpoint
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;
use crate::db::models::Post;

/// Raw `?page=&limit=` query. Kept as strings so junk values fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Resolve a query against the feed config. Missing, non-numeric and
    /// zero values use the defaults; `max_limit` clamps when set.
    pub fn from_query(query: &PageQuery, config: &FeedConfig) -> Self {
        let page = query.page.as_deref().and_then(parse_leading_int).unwrap_or(1);
        let mut limit = query
            .limit
            .as_deref()
            .and_then(parse_leading_int)
            .unwrap_or(config.default_limit);
        if let Some(max) = config.max_limit {
            limit = limit.min(max);
        }
        Self::new(page, limit)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Leading decimal digits of `raw`, so "3abc" reads as 3. Runs too large
/// for `u32` saturate. Zero and unparseable input yield `None`.
fn parse_leading_int(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let n = match digits.parse::<u32>() {
        Ok(n) => n,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
        Err(_) => return None,
    };
    (n > 0).then_some(n)
}

pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// One page of the feed as returned by `GET /all-posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub current_page: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl FeedPage {
    pub fn new(posts: Vec<Post>, pagination: Pagination, total: u64) -> Self {
        let total_pages = total_pages(total, pagination.limit);
        Self {
            posts,
            current_page: pagination.page,
            total_pages,
            has_next_page: u64::from(pagination.page) < total_pages,
            has_prev_page: pagination.page > 1,
        }
    }
}
