//! Canonical data model for the content retrieval gateway
//!
//! These are the only shapes that ever cross the gateway boundary. Raw
//! backend payloads stay inside the normalizer (see `core::normalizer`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::{ErrorKind, GatewayError};

/// Content categories the resolver can produce

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,

    Collection,

    Playlist,

    Music,

    User,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Collection => "collection",
            Self::Playlist => "playlist",
            Self::Music => "music",
            Self::User => "user",
        }
    }
}

/// Canonical, backend-agnostic content reference
///
/// Produced once by the resolver and immutable thereafter. The identity is
/// `(kind, id)`; `source_url` is kept only so mirror backends can resolve
/// through the original share link when one was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub kind: ContentKind,

    pub id: String,

    pub source_url: Option<String>,
}

/// Download backend selector exposed to callers
///
/// `v1` is the richest surface (official-API emulation); `v2`/`v3` are
/// mirror services callers fall back to when `v1` is blocked. Fallback
/// chaining is a caller decision, never automatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadVersion {
    #[serde(rename = "v1")]
    V1,

    #[serde(rename = "v2")]
    V2,

    #[serde(rename = "v3")]
    V3,
}

impl Default for DownloadVersion {
    fn default() -> Self {
        Self::V1
    }
}

/// Per-download options

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadOptions {
    pub version: DownloadVersion,

    /// Attach the raw backend payload to the result. Off by default.
    pub include_raw: bool,
}

/// Search categories

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    User,

    Video,

    Live,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Video => "video",
            Self::Live => "live",
        }
    }

    /// Video and live search hit non-public surfaces and need a cookie.
    pub fn requires_cookie(&self) -> bool {
        matches!(self, Self::Video | Self::Live)
    }
}

/// User feed categories

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Posts,

    Reposts,

    Liked,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Reposts => "reposts",
            Self::Liked => "liked",
        }
    }

    /// The liked-videos feed is gated behind the owner's cookie.
    pub fn requires_cookie(&self) -> bool {
        matches!(self, Self::Liked)
    }
}

/// Item-list container categories

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Collection,

    Playlist,
}

impl CollectionKind {
    pub fn content_kind(&self) -> ContentKind {
        match self {
            Self::Collection => ContentKind::Collection,
            Self::Playlist => ContentKind::Playlist,
        }
    }
}

/// Media classification of a download result

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,

    Image,
}

/// Playable media links of a single post
///
/// Invariant: exactly one of `video_urls` / `image_urls` is non-empty,
/// never both, never neither. The normalizer enforces this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaLinks {
    pub video_urls: Vec<String>,

    pub image_urls: Vec<String>,

    pub music_url: Option<String>,
}

/// Content author

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub unique_id: String,

    pub nickname: String,

    pub avatar_url: Option<String>,

    pub verified: bool,
}

/// Engagement counters
///
/// `None` means "not reported by this backend", never zero-by-default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_count: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u64>,
}

impl Statistics {
    pub fn is_empty(&self) -> bool {
        self.like_count.is_none()
            && self.comment_count.is_none()
            && self.share_count.is_none()
            && self.play_count.is_none()
            && self.follower_count.is_none()
            && self.following_count.is_none()
            && self.heart_count.is_none()
            && self.video_count.is_none()
    }
}

/// Normalized download result

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResult {
    #[serde(rename = "type")]
    pub media_type: MediaType,

    pub author: Author,

    pub statistics: Statistics,

    pub media: MediaLinks,

    /// Raw backend payload, populated only on explicit request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// Normalized feed/collection post

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,

    pub description: String,

    pub created_at: Option<DateTime<Utc>>,

    pub author: Author,

    pub statistics: Statistics,

    pub cover_url: Option<String>,
}

/// Normalized user profile

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub author: Author,

    pub statistics: Statistics,

    pub signature: Option<String>,
}

/// Normalized comment

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,

    pub text: String,

    pub author: Author,

    pub like_count: Option<u64>,

    pub reply_count: Option<u64>,

    pub created_at: Option<DateTime<Utc>>,
}

/// User search hit

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserHit {
    pub author: Author,

    pub statistics: Statistics,
}

/// Video search hit

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoHit {
    pub post: Post,
}

/// Live-room search hit

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveHit {
    pub room_id: String,

    pub title: Option<String>,

    pub author: Author,

    pub viewer_count: Option<u64>,
}

/// Tagged union over the search hit kinds

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchResult {
    User(UserHit),

    Video(VideoHit),

    Live(LiveHit),
}

/// Stateless pagination cursor
///
/// Re-derivable from `(page, page_size)` alone, so cursors are safely
/// replayable and cacheable by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    pub page: u32,

    pub page_size: u32,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl PaginationCursor {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Zero-based item offset of this page.
    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.page_size.max(1) as u64
    }

    /// Clamp degenerate values so a cursor never addresses page 0 or asks
    /// for zero items.
    pub fn sanitized(&self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.max(1),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

/// One page of a feed-style result

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,

    pub cursor: PaginationCursor,

    pub has_more: bool,
}

/// Per-call credential/proxy bundle
///
/// Supplied per call and never persisted; lifetime is the single call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub cookie: Option<String>,

    pub proxy: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Gateway configuration

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bounded timeout applied to every outbound backend call (seconds)
    pub timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,

            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

/// Discriminated boundary result
///
/// Every gateway operation answers with this shape; classified errors cross
/// the boundary as data, never as a raised fault.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    Success { result: T },

    Error { message: String, kind: ErrorKind },
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn into_result(self) -> Option<T> {
        match self {
            Self::Success { result } => Some(result),
            Self::Error { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Error { kind, .. } => Some(*kind),
        }
    }
}

impl<T> From<Result<T, GatewayError>> for ApiResponse<T> {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(result) => Self::Success { result },
            Err(err) => Self::Error {
                message: err.to_string(),
                kind: err.kind(),
            },
        }
    }
}
