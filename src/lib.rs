// Library exports for ShareFeed
// This allows integration tests and the binary to share the same modules

pub mod auth;
pub mod browse;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feed;
pub mod posts;
pub mod routes;
pub mod state;
pub mod users;
