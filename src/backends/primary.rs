//! Primary backend: official-API emulation
//!
//! Richest metadata of the three variants. Video detail goes through the
//! mobile feed endpoint (no cookie needed for public content); search,
//! profile and feed traffic goes through the web API and forwards the
//! caller's cookie verbatim. Device identifiers are randomized per call so
//! no fingerprint accumulates across requests.

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{COOKIE, REFERER};
use serde_json::Value;
use tracing::debug;

use crate::backends::{BackendVariant, PrimaryApi, VideoBackend};
use crate::core::errors::BackendFailure;
use crate::core::models::{
    ContentKind, ContentRef, FeedKind, GatewayConfig, PaginationCursor, SearchKind, Session,
};
use crate::utils::network;

const MOBILE_API_BASE: &str = "https://api16-normal-c-useast1a.tiktokv.com";
const WEB_API_BASE: &str = "https://www.tiktok.com/api";
const WEB_REFERER: &str = "https://www.tiktok.com/";

pub struct PrimaryBackend {
    config: GatewayConfig,
}

impl PrimaryBackend {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// One GET against an upstream endpoint, cookie forwarded when present.
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        session: &Session,
    ) -> Result<Value, BackendFailure> {
        let client = network::client_for(session, self.config.timeout(), &self.config.user_agent)?;

        let mut request = client.get(url).query(query).header(REFERER, WEB_REFERER);
        if let Some(cookie) = session.cookie.as_deref().filter(|c| !c.trim().is_empty()) {
            request = request.header(COOKIE, cookie);
        }

        debug!(url = %url, "primary backend request");

        let response = request.send().await.map_err(BackendFailure::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendFailure::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| BackendFailure::Decode(e.to_string()))
    }

    /// Mobile-surface device parameters, randomized per call.
    fn device_query() -> Vec<(&'static str, String)> {
        let mut rng = rand::thread_rng();
        let device_id: u64 = rng.gen_range(7_000_000_000_000_000_000..7_300_000_000_000_000_000);
        let install_id: u64 = rng.gen_range(7_000_000_000_000_000_000..7_300_000_000_000_000_000);

        vec![
            ("device_id", device_id.to_string()),
            ("iid", install_id.to_string()),
            ("channel", "googleplay".to_string()),
            ("app_name", "musical_ly".to_string()),
            ("version_code", "300904".to_string()),
            ("device_platform", "android".to_string()),
            ("os_version", "9".to_string()),
            ("aid", "1233".to_string()),
        ]
    }

    fn paging_query(cursor: &PaginationCursor) -> [(&'static str, String); 2] {
        [
            ("cursor", cursor.offset().to_string()),
            ("count", cursor.page_size.to_string()),
        ]
    }
}

#[async_trait]
impl VideoBackend for PrimaryBackend {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Primary
    }

    async fn fetch_video(
        &self,
        content: &ContentRef,
        session: &Session,
    ) -> Result<Value, BackendFailure> {
        let mut query = Self::device_query();
        query.push(("aweme_id", content.id.clone()));

        let url = format!("{}/aweme/v1/feed/", MOBILE_API_BASE);
        self.get_json(&url, &query, session).await
    }
}

#[async_trait]
impl PrimaryApi for PrimaryBackend {
    async fn fetch_search(
        &self,
        keyword: &str,
        kind: SearchKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure> {
        let surface = match kind {
            SearchKind::User => "user",
            SearchKind::Video => "item",
            SearchKind::Live => "live",
        };
        let url = format!("{}/search/{}/full/", WEB_API_BASE, surface);
        let query = [
            ("keyword", keyword.to_string()),
            ("offset", cursor.offset().to_string()),
            ("count", cursor.page_size.to_string()),
        ];
        self.get_json(&url, &query, session).await
    }

    async fn fetch_profile(
        &self,
        username: &str,
        session: &Session,
    ) -> Result<Value, BackendFailure> {
        let url = format!("{}/user/detail/", WEB_API_BASE);
        let query = [("uniqueId", username.to_string())];
        self.get_json(&url, &query, session).await
    }

    async fn fetch_feed(
        &self,
        username: &str,
        kind: FeedKind,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure> {
        let surface = match kind {
            FeedKind::Posts => "post",
            FeedKind::Reposts => "repost",
            FeedKind::Liked => "favorite",
        };
        let url = format!("{}/{}/item_list/", WEB_API_BASE, surface);
        let [cursor_param, count_param] = Self::paging_query(cursor);
        let query = [
            ("uniqueId", username.to_string()),
            cursor_param,
            count_param,
        ];
        self.get_json(&url, &query, session).await
    }

    async fn fetch_collection_items(
        &self,
        content: &ContentRef,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure> {
        // Playlists ride the "mix" surface upstream.
        let (url, id_param) = match content.kind {
            ContentKind::Playlist => (format!("{}/mix/item_list/", WEB_API_BASE), "mixId"),
            _ => (
                format!("{}/collection/item_list/", WEB_API_BASE),
                "collectionId",
            ),
        };
        let [cursor_param, count_param] = Self::paging_query(cursor);
        let query = [(id_param, content.id.clone()), cursor_param, count_param];
        self.get_json(&url, &query, session).await
    }

    async fn fetch_comments(
        &self,
        content: &ContentRef,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure> {
        let url = format!("{}/comment/list/", WEB_API_BASE);
        let [cursor_param, count_param] = Self::paging_query(cursor);
        let query = [("aweme_id", content.id.clone()), cursor_param, count_param];
        self.get_json(&url, &query, session).await
    }

    async fn fetch_trending_posts(&self, session: &Session) -> Result<Value, BackendFailure> {
        let url = format!("{}/recommend/item_list/", WEB_API_BASE);
        let query = [("count", "16".to_string())];
        self.get_json(&url, &query, session).await
    }

    async fn fetch_trending_creators(&self, session: &Session) -> Result<Value, BackendFailure> {
        let url = format!("{}/discover/user/", WEB_API_BASE);
        let query = [("count", "30".to_string())];
        self.get_json(&url, &query, session).await
    }

    async fn fetch_music_feed(
        &self,
        content: &ContentRef,
        session: &Session,
        cursor: &PaginationCursor,
    ) -> Result<Value, BackendFailure> {
        let url = format!("{}/music/item_list/", WEB_API_BASE);
        let [cursor_param, count_param] = Self::paging_query(cursor);
        let query = [("musicID", content.id.clone()), cursor_param, count_param];
        self.get_json(&url, &query, session).await
    }
}
