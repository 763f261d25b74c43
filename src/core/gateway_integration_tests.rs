//! Gateway integration tests
//!
//! Exercised against test-double backends so no network is ever touched.
//! The doubles count invocations, which is what the auth-precondition
//! assertions hang off.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::backends::{BackendVariant, PrimaryApi, VideoBackend};
    use crate::core::errors::{BackendFailure, ErrorKind};
    use crate::core::gateway::Gateway;
    use crate::core::models::{
        CollectionKind, ContentRef, DownloadOptions, DownloadVersion, FeedKind, MediaType,
        PaginationCursor, SearchKind, Session,
    };

    /// Primary test double: serves canned payloads and counts calls.
    #[derive(Default)]
    struct StubPrimary {
        calls: AtomicUsize,
        video: Option<Value>,
        search: Option<Value>,
        profile: Option<Value>,
        /// Indexed by `cursor.page - 1`.
        feed_pages: Vec<Value>,
        failure: Option<fn() -> BackendFailure>,
    }

    impl StubPrimary {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer(&self, payload: Option<&Value>) -> Result<Value, BackendFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(make_failure) = self.failure {
                return Err(make_failure());
            }
            payload.cloned().ok_or(BackendFailure::Empty)
        }
    }

    #[async_trait]
    impl VideoBackend for StubPrimary {
        fn variant(&self) -> BackendVariant {
            BackendVariant::Primary
        }

        async fn fetch_video(
            &self,
            _content: &ContentRef,
            _session: &Session,
        ) -> Result<Value, BackendFailure> {
            self.answer(self.video.as_ref())
        }
    }

    #[async_trait]
    impl PrimaryApi for StubPrimary {
        async fn fetch_search(
            &self,
            _keyword: &str,
            _kind: SearchKind,
            _session: &Session,
            _cursor: &PaginationCursor,
        ) -> Result<Value, BackendFailure> {
            self.answer(self.search.as_ref())
        }

        async fn fetch_profile(
            &self,
            _username: &str,
            _session: &Session,
        ) -> Result<Value, BackendFailure> {
            self.answer(self.profile.as_ref())
        }

        async fn fetch_feed(
            &self,
            _username: &str,
            _kind: FeedKind,
            _session: &Session,
            cursor: &PaginationCursor,
        ) -> Result<Value, BackendFailure> {
            let index = (cursor.page.max(1) - 1) as usize;
            self.answer(self.feed_pages.get(index))
        }

        async fn fetch_collection_items(
            &self,
            _content: &ContentRef,
            _session: &Session,
            cursor: &PaginationCursor,
        ) -> Result<Value, BackendFailure> {
            let index = (cursor.page.max(1) - 1) as usize;
            self.answer(self.feed_pages.get(index))
        }

        async fn fetch_comments(
            &self,
            _content: &ContentRef,
            _session: &Session,
            _cursor: &PaginationCursor,
        ) -> Result<Value, BackendFailure> {
            self.answer(self.search.as_ref())
        }

        async fn fetch_trending_posts(
            &self,
            _session: &Session,
        ) -> Result<Value, BackendFailure> {
            self.answer(self.search.as_ref())
        }

        async fn fetch_trending_creators(
            &self,
            _session: &Session,
        ) -> Result<Value, BackendFailure> {
            self.answer(self.search.as_ref())
        }

        async fn fetch_music_feed(
            &self,
            _content: &ContentRef,
            _session: &Session,
            cursor: &PaginationCursor,
        ) -> Result<Value, BackendFailure> {
            let index = (cursor.page.max(1) - 1) as usize;
            self.answer(self.feed_pages.get(index))
        }
    }

    /// Mirror test double (download capability only).
    struct StubMirror {
        variant: BackendVariant,
        calls: AtomicUsize,
        payload: Value,
    }

    #[async_trait]
    impl VideoBackend for StubMirror {
        fn variant(&self) -> BackendVariant {
            self.variant
        }

        async fn fetch_video(
            &self,
            _content: &ContentRef,
            _session: &Session,
        ) -> Result<Value, BackendFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    fn gateway_with(primary: StubPrimary) -> (Gateway, Arc<StubPrimary>) {
        let primary = Arc::new(primary);
        let mirror_a = Arc::new(StubMirror {
            variant: BackendVariant::MirrorA,
            calls: AtomicUsize::new(0),
            payload: mirror_a_payload(),
        });
        let mirror_b = Arc::new(StubMirror {
            variant: BackendVariant::MirrorB,
            calls: AtomicUsize::new(0),
            payload: mirror_b_payload(),
        });
        let gateway = Gateway::with_backends(primary.clone(), mirror_a, mirror_b);
        (gateway, primary)
    }

    fn primary_video_payload() -> Value {
        json!({
            "aweme_list": [{
                "author": { "unique_id": "user", "nickname": "User" },
                "statistics": { "digg_count": 5 },
                "video": { "play_addr": { "url_list": ["https://cdn.example/v.mp4"] } },
                "music": { "play_url": { "url_list": ["https://cdn.example/m.mp3"] } }
            }]
        })
    }

    fn mirror_a_payload() -> Value {
        json!({
            "code": 0,
            "data": {
                "play": "https://mirror.example/v.mp4",
                "author": { "unique_id": "user", "nickname": "User" }
            }
        })
    }

    fn mirror_b_payload() -> Value {
        json!({
            "author": { "unique_id": "user", "nickname": "User" },
            "video": { "noWatermark": "https://b.example/v.mp4" }
        })
    }

    fn profile_payload() -> Value {
        json!({
            "userInfo": {
                "user": { "uniqueId": "user", "nickname": "User", "verified": true },
                "stats": { "followerCount": 100, "videoCount": 3 }
            }
        })
    }

    /// One feed page with sequential post IDs `[start, start + len)`.
    fn feed_page_payload(start: u64, len: u64, has_more: bool) -> Value {
        let items: Vec<Value> = (start..start + len)
            .map(|id| {
                json!({
                    "id": id.to_string(),
                    "desc": format!("post {}", id),
                    "author": { "uniqueId": "user", "nickname": "User" }
                })
            })
            .collect();
        json!({ "itemList": items, "hasMore": has_more })
    }

    fn cookie_session() -> Session {
        Session {
            cookie: Some("sessionid=abc".to_string()),
            proxy: None,
        }
    }

    const VIDEO_URL: &str = "https://www.tiktok.com/@user/video/7191234567890123456";

    #[tokio::test]
    async fn gated_search_without_cookie_never_reaches_the_backend() {
        let (gateway, primary) = gateway_with(StubPrimary::default());

        for kind in [SearchKind::Video, SearchKind::Live] {
            let response = gateway
                .search("x", kind, &Session::anonymous(), &PaginationCursor::default())
                .await;
            assert_eq!(response.error_kind(), Some(ErrorKind::AuthRequired));
        }

        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn liked_feed_without_cookie_never_reaches_the_backend() {
        let (gateway, primary) = gateway_with(StubPrimary::default());

        let response = gateway
            .feed(
                "@user",
                FeedKind::Liked,
                &Session::anonymous(),
                &PaginationCursor::default(),
            )
            .await;

        assert_eq!(response.error_kind(), Some(ErrorKind::AuthRequired));
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn user_search_is_ungated() {
        let (gateway, primary) = gateway_with(StubPrimary {
            search: Some(json!({ "userList": [], "hasMore": false })),
            ..StubPrimary::default()
        });

        let response = gateway
            .search(
                "x",
                SearchKind::User,
                &Session::anonymous(),
                &PaginationCursor::default(),
            )
            .await;

        assert!(response.is_success());
        assert_eq!(primary.call_count(), 1);
    }

    #[tokio::test]
    async fn download_routes_each_version_to_its_variant() {
        let (gateway, primary) = gateway_with(StubPrimary {
            video: Some(primary_video_payload()),
            ..StubPrimary::default()
        });
        let session = Session::anonymous();

        for version in [
            DownloadVersion::V1,
            DownloadVersion::V2,
            DownloadVersion::V3,
        ] {
            let options = DownloadOptions {
                version,
                include_raw: false,
            };
            let response = gateway.download(VIDEO_URL, &options, &session).await;
            let result = response.into_result().expect("download should succeed");

            // Exactly one media list is populated, for every variant.
            assert!(
                !result.media.video_urls.is_empty() ^ !result.media.image_urls.is_empty()
            );
            assert_eq!(result.media_type, MediaType::Video);
            assert_eq!(result.author.unique_id, "user");
        }

        // Only v1 touched the primary; the mirrors handled v2/v3.
        assert_eq!(primary.call_count(), 1);
    }

    #[tokio::test]
    async fn download_v1_without_cookie_succeeds_for_public_content() {
        let (gateway, _primary) = gateway_with(StubPrimary {
            video: Some(primary_video_payload()),
            ..StubPrimary::default()
        });

        let response = gateway
            .download(VIDEO_URL, &DownloadOptions::default(), &Session::anonymous())
            .await;
        let result = response.into_result().unwrap();

        assert_eq!(result.media_type, MediaType::Video);
        assert!(!result.media.video_urls.is_empty());
        assert_eq!(result.author.unique_id, "user");
    }

    #[tokio::test]
    async fn raw_payload_is_carried_only_on_request() {
        let (gateway, _primary) = gateway_with(StubPrimary {
            video: Some(primary_video_payload()),
            ..StubPrimary::default()
        });
        let session = Session::anonymous();

        let plain = gateway
            .download(VIDEO_URL, &DownloadOptions::default(), &session)
            .await
            .into_result()
            .unwrap();
        assert!(plain.raw.is_none());

        let with_raw = gateway
            .download(
                VIDEO_URL,
                &DownloadOptions {
                    version: DownloadVersion::V1,
                    include_raw: true,
                },
                &session,
            )
            .await
            .into_result()
            .unwrap();
        assert_eq!(with_raw.raw, Some(primary_video_payload()));
    }

    #[tokio::test]
    async fn pagination_returns_disjoint_pages_and_terminates() {
        // 21 underlying posts, 20 per page.
        let (gateway, _primary) = gateway_with(StubPrimary {
            feed_pages: vec![
                feed_page_payload(0, 20, true),
                feed_page_payload(20, 1, false),
            ],
            ..StubPrimary::default()
        });
        let session = Session::anonymous();

        let first = gateway
            .feed("user", FeedKind::Posts, &session, &PaginationCursor::new(1, 20))
            .await
            .into_result()
            .unwrap();
        let second = gateway
            .feed("user", FeedKind::Posts, &session, &PaginationCursor::new(2, 20))
            .await
            .into_result()
            .unwrap();

        assert_eq!(first.items.len(), 20);
        assert!(first.has_more);
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_more);

        for post in &second.items {
            assert!(
                first.items.iter().all(|p| p.id != post.id),
                "page 2 repeated post {}",
                post.id
            );
        }
    }

    #[tokio::test]
    async fn identical_profile_calls_are_idempotent() {
        let (gateway, primary) = gateway_with(StubPrimary {
            profile: Some(profile_payload()),
            ..StubPrimary::default()
        });
        let session = Session::anonymous();

        let first = gateway.profile("user", &session).await.into_result().unwrap();
        let second = gateway.profile("user", &session).await.into_result().unwrap();

        assert_eq!(first, second);
        assert_eq!(primary.call_count(), 2);
    }

    #[tokio::test]
    async fn invalid_references_fail_locally() {
        let (gateway, primary) = gateway_with(StubPrimary::default());

        let response = gateway
            .download(
                "definitely not a reference",
                &DownloadOptions::default(),
                &Session::anonymous(),
            )
            .await;
        assert_eq!(response.error_kind(), Some(ErrorKind::InvalidReference));

        let response = gateway
            .search(
                "   ",
                SearchKind::User,
                &Session::anonymous(),
                &PaginationCursor::default(),
            )
            .await;
        assert_eq!(response.error_kind(), Some(ErrorKind::InvalidReference));

        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn backend_failures_are_classified_not_raised() {
        let cases: [(fn() -> BackendFailure, ErrorKind); 4] = [
            (|| BackendFailure::Timeout, ErrorKind::Unavailable),
            (
                || BackendFailure::Transport("connection reset".to_string()),
                ErrorKind::Unavailable,
            ),
            (
                || BackendFailure::Decode("missing field".to_string()),
                ErrorKind::UpstreamChanged,
            ),
            (
                || BackendFailure::Status { status: 500 },
                ErrorKind::Unknown,
            ),
        ];

        for (make_failure, expected) in cases {
            let (gateway, _primary) = gateway_with(StubPrimary {
                failure: Some(make_failure),
                ..StubPrimary::default()
            });
            let response = gateway.profile("user", &Session::anonymous()).await;
            assert_eq!(response.error_kind(), Some(expected));
        }
    }

    #[tokio::test]
    async fn rejected_cookie_on_gated_search_maps_to_auth_required() {
        let (gateway, _primary) = gateway_with(StubPrimary {
            failure: Some(|| BackendFailure::Status { status: 403 }),
            ..StubPrimary::default()
        });

        let response = gateway
            .search(
                "x",
                SearchKind::Video,
                &cookie_session(),
                &PaginationCursor::default(),
            )
            .await;
        assert_eq!(response.error_kind(), Some(ErrorKind::AuthRequired));
    }

    #[tokio::test]
    async fn missing_profile_maps_to_not_found() {
        // StubPrimary without a profile payload answers Empty.
        let (gateway, _primary) = gateway_with(StubPrimary::default());

        let response = gateway.profile("user", &Session::anonymous()).await;
        assert_eq!(response.error_kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn collection_and_music_feeds_share_the_post_page_shape() {
        let (gateway, _primary) = gateway_with(StubPrimary {
            feed_pages: vec![feed_page_payload(0, 2, false)],
            ..StubPrimary::default()
        });
        let session = Session::anonymous();
        let cursor = PaginationCursor::new(1, 20);

        let collection = gateway
            .collection_items(
                "https://www.tiktok.com/@user/collection/favs-7191234567890123456",
                CollectionKind::Collection,
                &session,
                &cursor,
            )
            .await
            .into_result()
            .unwrap();
        assert_eq!(collection.items.len(), 2);
        assert!(!collection.has_more);

        let by_music = gateway
            .videos_by_music("7191234567890123456", &session, &cursor)
            .await
            .into_result()
            .unwrap();
        assert_eq!(by_music.items.len(), 2);
    }

    #[tokio::test]
    async fn trending_creators_map_to_authors() {
        let (gateway, _primary) = gateway_with(StubPrimary {
            search: Some(json!({
                "userList": [
                    { "user": { "uniqueId": "a", "nickname": "A" } },
                    { "user": { "uniqueId": "b", "nickname": "B", "verified": true } }
                ]
            })),
            ..StubPrimary::default()
        });

        let creators = gateway
            .trending_creators(&Session::anonymous())
            .await
            .into_result()
            .unwrap();
        assert_eq!(creators.len(), 2);
        assert_eq!(creators[0].unique_id, "a");
        assert!(creators[1].verified);
    }

    #[tokio::test]
    async fn comments_operation_resolves_the_video_first() {
        let (gateway, primary) = gateway_with(StubPrimary {
            search: Some(json!({ "comments": [], "has_more": false })),
            ..StubPrimary::default()
        });

        let response = gateway
            .comments(VIDEO_URL, &Session::anonymous(), &PaginationCursor::default())
            .await;
        assert!(response.is_success());

        let response = gateway
            .comments("nope", &Session::anonymous(), &PaginationCursor::default())
            .await;
        assert_eq!(response.error_kind(), Some(ErrorKind::InvalidReference));

        assert_eq!(primary.call_count(), 1);
    }

    #[test]
    fn boundary_serialization_is_stable() {
        // Sync caller, driven through tokio-test.
        let (gateway, _primary) = gateway_with(StubPrimary {
            profile: Some(profile_payload()),
            ..StubPrimary::default()
        });

        let response =
            tokio_test::block_on(gateway.profile("user", &Session::anonymous()));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["result"]["author"]["unique_id"], "user");

        let response = tokio_test::block_on(gateway.profile(
            "!!!",
            &Session::anonymous(),
        ));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["kind"], "invalid_reference");
        assert!(value["message"].as_str().unwrap().len() > 0);
    }
}
