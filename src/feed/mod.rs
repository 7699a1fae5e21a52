pub mod client;
pub mod controller;
pub mod pagination;
pub mod render;
pub mod service;
pub mod share;

pub use client::{FeedError, FeedQuery, FeedResponse, FeedSource, HttpFeedSource};
pub use controller::{Clipboard, FeedController, FeedFilter, FeedState, FeedView, Surface};
pub use pagination::{FeedPage, PageQuery, Pagination};
pub use service::FeedService;
pub use share::ShareTarget;
