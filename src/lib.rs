//! TikTok Gateway - Core Library
//!
//! A stateless content retrieval gateway: one logical request (download,
//! search, profile, feed) is routed to one of several backend extraction
//! strategies, and their structurally different responses are collapsed
//! into one stable output schema. Consumed as a library/service boundary;
//! there is no CLI surface.

pub mod backends;
pub mod core;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    errors::{ErrorKind, GatewayError},
    gateway::Gateway,
    models::{
        ApiResponse, Author, CollectionKind, Comment, ContentKind, ContentRef, DownloadOptions,
        DownloadResult, DownloadVersion, FeedKind, FeedPage, GatewayConfig, MediaLinks, MediaType,
        PaginationCursor, Post, Profile, SearchKind, SearchResult, Session, Statistics,
    },
    resolver::resolve,
};
pub use backends::BackendVariant;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    // 初始化日志系统（如果还没有初始化）
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "tiktok_gateway=info");
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok(); // 忽略重复初始化错误

    tracing::info!("{} v{} initialized", NAME, VERSION);
    Ok(())
}
