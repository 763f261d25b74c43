//! The gateway: single public entry point over the backend strategies
//!
//! Every operation follows the same path: resolve identifiers, enforce the
//! auth precondition, issue exactly one outbound backend call with a bounded
//! timeout, normalize, and classify failures. Classified errors cross the
//! boundary as [`ApiResponse::Error`] data, never as a raised fault. The
//! gateway holds no cross-request state: cookie and proxy live in the
//! per-call [`Session`], and concurrent calls share nothing mutable.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backends::{
    BackendVariant, MirrorABackend, MirrorBBackend, PrimaryApi, PrimaryBackend, VideoBackend,
};
use crate::core::errors::{classify, BackendFailure, GatewayError};
use crate::core::models::{
    ApiResponse, Author, CollectionKind, Comment, ContentKind, DownloadOptions, DownloadResult,
    FeedKind, FeedPage, GatewayConfig, PaginationCursor, Post, Profile, SearchKind, SearchResult,
    Session,
};
use crate::core::normalizer;
use crate::core::resolver;

pub struct Gateway {
    primary: Arc<dyn PrimaryApi>,

    mirror_a: Arc<dyn VideoBackend>,

    mirror_b: Arc<dyn VideoBackend>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            primary: Arc::new(PrimaryBackend::new(config.clone())),
            mirror_a: Arc::new(MirrorABackend::new(config.clone())),
            mirror_b: Arc::new(MirrorBBackend::new(config)),
        }
    }

    /// Construct over injected backends. Used by tests to substitute
    /// doubles; production code goes through [`Gateway::new`].
    pub fn with_backends(
        primary: Arc<dyn PrimaryApi>,
        mirror_a: Arc<dyn VideoBackend>,
        mirror_b: Arc<dyn VideoBackend>,
    ) -> Self {
        Self {
            primary,
            mirror_a,
            mirror_b,
        }
    }

    /// Download one video or photo post through the explicitly selected
    /// backend version. Fallback to another version is the caller's call.
    pub async fn download(
        &self,
        input: &str,
        options: &DownloadOptions,
        session: &Session,
    ) -> ApiResponse<DownloadResult> {
        self.try_download(input, options, session).await.into()
    }

    pub async fn search(
        &self,
        keyword: &str,
        kind: SearchKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> ApiResponse<FeedPage<SearchResult>> {
        self.try_search(keyword, kind, session, cursor).await.into()
    }

    pub async fn profile(&self, username: &str, session: &Session) -> ApiResponse<Profile> {
        self.try_profile(username, session).await.into()
    }

    pub async fn feed(
        &self,
        username: &str,
        kind: FeedKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> ApiResponse<FeedPage<Post>> {
        self.try_feed(username, kind, session, cursor).await.into()
    }

    pub async fn collection_items(
        &self,
        input: &str,
        kind: CollectionKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> ApiResponse<FeedPage<Post>> {
        self.try_collection_items(input, kind, session, cursor)
            .await
            .into()
    }

    pub async fn comments(
        &self,
        input: &str,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> ApiResponse<FeedPage<Comment>> {
        self.try_comments(input, session, cursor).await.into()
    }

    pub async fn trending(&self, session: &Session) -> ApiResponse<Vec<Post>> {
        self.try_trending(session).await.into()
    }

    pub async fn trending_creators(&self, session: &Session) -> ApiResponse<Vec<Author>> {
        self.try_trending_creators(session).await.into()
    }

    pub async fn videos_by_music(
        &self,
        music_id: &str,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> ApiResponse<FeedPage<Post>> {
        self.try_videos_by_music(music_id, session, cursor)
            .await
            .into()
    }

    async fn try_download(
        &self,
        input: &str,
        options: &DownloadOptions,
        session: &Session,
    ) -> Result<DownloadResult, GatewayError> {
        let content = resolver::resolve(input, ContentKind::Video)?;
        let variant = BackendVariant::from(options.version);

        debug!(id = %content.id, variant = variant.as_str(), "download");

        let raw = match variant {
            BackendVariant::Primary => self.primary.fetch_video(&content, session).await,
            BackendVariant::MirrorA => self.mirror_a.fetch_video(&content, session).await,
            BackendVariant::MirrorB => self.mirror_b.fetch_video(&content, session).await,
        }
        .map_err(|f| classified("download", variant, f, false))?;

        normalizer::normalize_video(variant, &raw, options.include_raw)
            .map_err(|f| classified("download", variant, f, false))
    }

    async fn try_search(
        &self,
        keyword: &str,
        kind: SearchKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<FeedPage<SearchResult>, GatewayError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(GatewayError::InvalidReference(
                "search keyword is empty".to_string(),
            ));
        }

        let gated = kind.requires_cookie();
        if gated {
            require_cookie(session, "search")?;
        }
        let cursor = cursor.sanitized();

        debug!(keyword = %keyword, kind = kind.as_str(), page = cursor.page, "search");

        let raw = self
            .primary
            .fetch_search(keyword, kind, session, &cursor)
            .await
            .map_err(|f| classified("search", BackendVariant::Primary, f, gated))?;

        normalizer::normalize_search(&raw, kind, &cursor)
            .map_err(|f| classified("search", BackendVariant::Primary, f, gated))
    }

    async fn try_profile(
        &self,
        username: &str,
        session: &Session,
    ) -> Result<Profile, GatewayError> {
        let user = resolver::resolve(username, ContentKind::User)?;

        debug!(username = %user.id, "profile");

        let raw = self
            .primary
            .fetch_profile(&user.id, session)
            .await
            .map_err(|f| classified("profile", BackendVariant::Primary, f, false))?;

        normalizer::normalize_profile(&raw)
            .map_err(|f| classified("profile", BackendVariant::Primary, f, false))
    }

    async fn try_feed(
        &self,
        username: &str,
        kind: FeedKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<FeedPage<Post>, GatewayError> {
        let user = resolver::resolve(username, ContentKind::User)?;

        let gated = kind.requires_cookie();
        if gated {
            require_cookie(session, "the liked-videos feed")?;
        }
        let cursor = cursor.sanitized();

        debug!(username = %user.id, kind = kind.as_str(), page = cursor.page, "feed");

        let raw = self
            .primary
            .fetch_feed(&user.id, kind, session, &cursor)
            .await
            .map_err(|f| classified("feed", BackendVariant::Primary, f, gated))?;

        normalizer::normalize_post_feed(&raw, &cursor)
            .map_err(|f| classified("feed", BackendVariant::Primary, f, gated))
    }

    async fn try_collection_items(
        &self,
        input: &str,
        kind: CollectionKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<FeedPage<Post>, GatewayError> {
        let content = resolver::resolve(input, kind.content_kind())?;
        let cursor = cursor.sanitized();

        debug!(id = %content.id, kind = content.kind.as_str(), page = cursor.page, "collection items");

        let raw = self
            .primary
            .fetch_collection_items(&content, session, &cursor)
            .await
            .map_err(|f| classified("collection", BackendVariant::Primary, f, false))?;

        normalizer::normalize_post_feed(&raw, &cursor)
            .map_err(|f| classified("collection", BackendVariant::Primary, f, false))
    }

    async fn try_comments(
        &self,
        input: &str,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<FeedPage<Comment>, GatewayError> {
        let content = resolver::resolve(input, ContentKind::Video)?;
        let cursor = cursor.sanitized();

        debug!(id = %content.id, page = cursor.page, "comments");

        let raw = self
            .primary
            .fetch_comments(&content, session, &cursor)
            .await
            .map_err(|f| classified("comments", BackendVariant::Primary, f, false))?;

        normalizer::normalize_comments(&raw, &cursor)
            .map_err(|f| classified("comments", BackendVariant::Primary, f, false))
    }

    async fn try_trending(&self, session: &Session) -> Result<Vec<Post>, GatewayError> {
        let raw = self
            .primary
            .fetch_trending_posts(session)
            .await
            .map_err(|f| classified("trending", BackendVariant::Primary, f, false))?;

        normalizer::normalize_trending_posts(&raw)
            .map_err(|f| classified("trending", BackendVariant::Primary, f, false))
    }

    async fn try_trending_creators(&self, session: &Session) -> Result<Vec<Author>, GatewayError> {
        let raw = self
            .primary
            .fetch_trending_creators(session)
            .await
            .map_err(|f| classified("trending creators", BackendVariant::Primary, f, false))?;

        normalizer::normalize_creator_list(&raw)
            .map_err(|f| classified("trending creators", BackendVariant::Primary, f, false))
    }

    async fn try_videos_by_music(
        &self,
        music_id: &str,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<FeedPage<Post>, GatewayError> {
        let content = resolver::resolve(music_id, ContentKind::Music)?;
        let cursor = cursor.sanitized();

        debug!(id = %content.id, page = cursor.page, "videos by music");

        let raw = self
            .primary
            .fetch_music_feed(&content, session, &cursor)
            .await
            .map_err(|f| classified("music feed", BackendVariant::Primary, f, false))?;

        normalizer::normalize_post_feed(&raw, &cursor)
            .map_err(|f| classified("music feed", BackendVariant::Primary, f, false))
    }
}

/// Auth precondition for gated capabilities. Checked before any outbound
/// call so an unauthenticated request never wastes a round trip.
fn require_cookie(session: &Session, capability: &str) -> Result<(), GatewayError> {
    if session.has_cookie() {
        Ok(())
    } else {
        Err(GatewayError::AuthRequired(format!(
            "{} requires an authentication cookie",
            capability
        )))
    }
}

fn classified(
    operation: &str,
    variant: BackendVariant,
    failure: BackendFailure,
    gated: bool,
) -> GatewayError {
    let err = classify(&failure, gated);
    warn!(
        operation = operation,
        variant = variant.as_str(),
        failure = %failure,
        kind = ?err.kind(),
        "backend call failed"
    );
    err
}
