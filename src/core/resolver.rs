//! Identifier resolution
//!
//! Turns an arbitrary URL or bare ID string into a canonical [`ContentRef`].
//! Permissive about trailing query strings and locale path prefixes, strict
//! about ID shape once isolated. Pure string processing, no I/O.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::core::errors::GatewayError;
use crate::core::models::{ContentKind, ContentRef};

lazy_static! {
    /// Bare numeric IDs (video/collection/playlist/music)
    static ref NUMERIC_ID: Regex = Regex::new(r"^\d{4,}$").unwrap();

    /// User handles, with or without the leading `@`
    static ref HANDLE: Regex = Regex::new(r"^[A-Za-z0-9_.]{1,64}$").unwrap();

    /// Leading digit run of a path segment, e.g. `7191234567890.html`
    static ref LEADING_ID: Regex = Regex::new(r"^(\d{4,})").unwrap();

    /// Trailing digit run of a slugged segment, e.g. `my-favs-7191234567890`
    static ref TRAILING_ID: Regex = Regex::new(r"(\d{4,})$").unwrap();

    /// Locale path prefixes such as `/vi-VN/` or `/de/`
    static ref LOCALE_PREFIX: Regex = Regex::new(r"^[a-z]{2}(-[A-Za-z]{2,4})?$").unwrap();
}

/// Resolve an arbitrary input string into a canonical content reference.
///
/// Fails with `InvalidReference` when the input contains no recognizable ID
/// pattern for `expected`.
pub fn resolve(input: &str, expected: ContentKind) -> Result<ContentRef, GatewayError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(expected, "input is empty"));
    }

    if looks_like_url(trimmed) {
        resolve_url(trimmed, expected)
    } else {
        resolve_bare(trimmed, expected)
    }
}

fn looks_like_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://") || input.contains('/')
}

fn resolve_url(raw: &str, expected: ContentKind) -> Result<ContentRef, GatewayError> {
    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&candidate)
        .map_err(|_| invalid(expected, "input is not a valid URL"))?;

    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    // Locale prefixes (`/vi-VN/@user/...`) carry no identity.
    if segments
        .first()
        .map(|s| LOCALE_PREFIX.is_match(s))
        .unwrap_or(false)
    {
        segments.remove(0);
    }

    let id = match expected {
        ContentKind::Video => extract_after_marker(&segments, &["video", "photo", "v"])
            .and_then(|seg| LEADING_ID.captures(seg))
            .map(|c| c[1].to_string()),
        ContentKind::User => segments
            .iter()
            .find(|s| s.starts_with('@'))
            .map(|s| s.trim_start_matches('@'))
            .filter(|h| HANDLE.is_match(h))
            .map(|h| h.to_string()),
        ContentKind::Collection => slugged_id(&segments, "collection"),
        ContentKind::Playlist => slugged_id(&segments, "playlist"),
        ContentKind::Music => slugged_id(&segments, "music"),
    };

    match id {
        Some(id) => Ok(ContentRef {
            kind: expected,
            id,
            source_url: Some(raw.trim().to_string()),
        }),
        None => Err(invalid(
            expected,
            "the URL contains no recognizable ID for this kind",
        )),
    }
}

fn resolve_bare(raw: &str, expected: ContentKind) -> Result<ContentRef, GatewayError> {
    let id = match expected {
        ContentKind::User => {
            let handle = raw.trim_start_matches('@');
            HANDLE.is_match(handle).then(|| handle.to_string())
        }
        _ => NUMERIC_ID.is_match(raw).then(|| raw.to_string()),
    };

    match id {
        Some(id) => Ok(ContentRef {
            kind: expected,
            id,
            source_url: None,
        }),
        None => Err(invalid(expected, "the ID shape is not recognized")),
    }
}

/// First segment following any of the given marker segments.
fn extract_after_marker<'a>(segments: &[&'a str], markers: &[&str]) -> Option<&'a str> {
    segments
        .windows(2)
        .find(|pair| markers.contains(&pair[0]))
        .map(|pair| pair[1])
}

/// ID of a slugged container segment: `/collection/my-favs-7191234567890`.
/// A purely numeric segment is accepted as-is.
fn slugged_id(segments: &[&str], marker: &str) -> Option<String> {
    extract_after_marker(segments, &[marker])
        .and_then(|seg| TRAILING_ID.captures(seg))
        .map(|c| c[1].to_string())
}

fn invalid(expected: ContentKind, reason: &str) -> GatewayError {
    GatewayError::InvalidReference(format!(
        "no {} reference found: {}",
        expected.as_str(),
        reason
    ))
}
