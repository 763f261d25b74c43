//! Backend extraction strategies
//!
//! Each variant scrapes a distinct upstream surface and returns its raw,
//! backend-native payload; nothing here normalizes. The capability split is
//! static: every variant can fetch a video, only the Primary surface
//! implements search/profile/feed traffic, and the gateway never probes the
//! mirrors for capabilities they lack.

pub mod mirror_a;
pub mod mirror_b;
pub mod primary;

// Re-export backends
pub use mirror_a::MirrorABackend;
pub use mirror_b::MirrorBBackend;
pub use primary::PrimaryBackend;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::BackendFailure;
use crate::core::models::{
    ContentRef, DownloadVersion, FeedKind, PaginationCursor, SearchKind, Session,
};

/// Concrete upstream surface discriminator

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendVariant {
    Primary,

    MirrorA,

    MirrorB,
}

impl BackendVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::MirrorA => "mirror_a",
            Self::MirrorB => "mirror_b",
        }
    }
}

impl From<DownloadVersion> for BackendVariant {
    fn from(version: DownloadVersion) -> Self {
        match version {
            DownloadVersion::V1 => Self::Primary,
            DownloadVersion::V2 => Self::MirrorA,
            DownloadVersion::V3 => Self::MirrorB,
        }
    }
}

/// Download capability, implemented by every variant

#[async_trait]
pub trait VideoBackend: Send + Sync {
    fn variant(&self) -> BackendVariant;

    /// Fetch the raw, backend-native payload for one video or photo post.
    async fn fetch_video(
        &self,
        content: &ContentRef,
        session: &Session,
    ) -> Result<Value, BackendFailure>;
}

/// Capabilities only the Primary surface offers
///
/// Auth preconditions for gated capabilities are enforced by the gateway
/// before any of these are invoked.
#[async_trait]
pub trait PrimaryApi: VideoBackend {
    async fn fetch_search(
        &self,
        keyword: &str,
        kind: SearchKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure>;

    async fn fetch_profile(
        &self,
        username: &str,
        session: &Session,
    ) -> Result<Value, BackendFailure>;

    async fn fetch_feed(
        &self,
        username: &str,
        kind: FeedKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure>;

    async fn fetch_collection_items(
        &self,
        content: &ContentRef,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure>;

    async fn fetch_comments(
        &self,
        content: &ContentRef,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure>;

    async fn fetch_trending_posts(&self, session: &Session) -> Result<Value, BackendFailure>;

    async fn fetch_trending_creators(&self, session: &Session) -> Result<Value, BackendFailure>;

    async fn fetch_music_feed(
        &self,
        content: &ContentRef,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure>;
}
