//! Identifier resolver unit tests

#[cfg(test)]
mod tests {
    use crate::core::errors::ErrorKind;
    use crate::core::models::ContentKind;
    use crate::core::resolver::resolve;

    #[test]
    fn video_url_and_bare_id_share_the_same_identity() {
        let from_url = resolve(
            "https://www.tiktok.com/@user/video/7191234567890123456",
            ContentKind::Video,
        )
        .unwrap();
        let from_id = resolve("7191234567890123456", ContentKind::Video).unwrap();

        // Identity is (kind, id); source_url only records provenance.
        assert_eq!(from_url.kind, from_id.kind);
        assert_eq!(from_url.id, from_id.id);
        assert_eq!(from_url.id, "7191234567890123456");
        assert_eq!(
            from_url.source_url.as_deref(),
            Some("https://www.tiktok.com/@user/video/7191234567890123456")
        );
        assert!(from_id.source_url.is_none());
    }

    #[test]
    fn video_url_tolerates_query_strings_and_locale_prefixes() {
        let content = resolve(
            "https://www.tiktok.com/vi-VN/@user/video/7191234567890123456?is_copy_url=1&lang=en",
            ContentKind::Video,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");

        let content = resolve(
            "https://www.tiktok.com/de/@user/video/7191234567890123456",
            ContentKind::Video,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");
    }

    #[test]
    fn photo_posts_and_legacy_video_paths_resolve() {
        let content = resolve(
            "https://www.tiktok.com/@user/photo/7191234567890123456",
            ContentKind::Video,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");

        let content = resolve(
            "https://www.tiktok.com/v/7191234567890123456.html",
            ContentKind::Video,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");
    }

    #[test]
    fn scheme_is_optional() {
        let content = resolve(
            "www.tiktok.com/@user/video/7191234567890123456",
            ContentKind::Video,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");
    }

    #[test]
    fn user_handles_resolve_with_and_without_at_prefix() {
        for input in [
            "@some.user_42",
            "some.user_42",
            "https://www.tiktok.com/@some.user_42",
            "https://www.tiktok.com/@some.user_42?lang=en",
        ] {
            let content = resolve(input, ContentKind::User).unwrap();
            assert_eq!(content.id, "some.user_42", "input: {}", input);
            assert_eq!(content.kind, ContentKind::User);
        }
    }

    #[test]
    fn slugged_collection_and_playlist_urls_resolve_to_trailing_id() {
        let content = resolve(
            "https://www.tiktok.com/@user/collection/my-favs-7191234567890123456",
            ContentKind::Collection,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");

        let content = resolve(
            "https://www.tiktok.com/@user/playlist/workout-7191234567890123456",
            ContentKind::Playlist,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");

        let content = resolve(
            "https://www.tiktok.com/music/catchy-song-7191234567890123456",
            ContentKind::Music,
        )
        .unwrap();
        assert_eq!(content.id, "7191234567890123456");
    }

    #[test]
    fn bare_numeric_ids_resolve_for_container_kinds() {
        for kind in [
            ContentKind::Collection,
            ContentKind::Playlist,
            ContentKind::Music,
        ] {
            let content = resolve("7191234567890123456", kind).unwrap();
            assert_eq!(content.id, "7191234567890123456");
            assert_eq!(content.kind, kind);
        }
    }

    #[test]
    fn unrecognizable_input_is_invalid_reference() {
        for input in [
            "",
            "   ",
            "not an id at all!!!",
            "https://www.tiktok.com/@user", // user URL, video expected
            "https://example.com/watch?v=abc",
        ] {
            let err = resolve(input, ContentKind::Video).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidReference, "input: {:?}", input);
        }
    }

    #[test]
    fn kind_mismatches_follow_the_expected_kind() {
        // A video URL still contains a handle, so user resolution extracts it.
        let user = resolve(
            "https://www.tiktok.com/@user/video/7191234567890123456",
            ContentKind::User,
        )
        .unwrap();
        assert_eq!(user.id, "user");

        // A handle is never a numeric video ID.
        let err = resolve("@some.user", ContentKind::Video).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
    }

    #[test]
    fn short_digit_runs_are_not_ids() {
        let err = resolve("123", ContentKind::Video).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
    }
}
