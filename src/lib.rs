pub mod cache;
pub mod config;
pub mod engine;
pub mod environment;
pub mod keywords;
pub mod logging;
pub mod profile;
pub mod server;
pub mod source;
pub mod types;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_RANKING: &str = "ranking";
pub const TARGET_CACHE: &str = "cache";
