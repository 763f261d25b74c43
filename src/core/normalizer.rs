//! Response normalization
//!
//! One mapping per (backend variant × capability) pair. The raw per-backend
//! schemas live here as private serde structs and never cross the gateway
//! boundary. Mapping is pure data transformation: numeric-looking strings
//! coerce to integers, one-element URL-list wrappers collapse to their first
//! element, and missing optional fields become absent [`Statistics`] entries
//! rather than zeros or errors.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::backends::BackendVariant;
use crate::core::errors::BackendFailure;
use crate::core::models::{
    Author, Comment, DownloadResult, FeedPage, LiveHit, MediaLinks, MediaType, PaginationCursor,
    Post, Profile, SearchKind, SearchResult, Statistics, UserHit, VideoHit,
};

// ---------------------------------------------------------------------------
// Shared deserialization helpers
// ---------------------------------------------------------------------------

/// Counter fields arrive as integers on some surfaces and as numeric strings
/// on others; anything non-numeric is treated as "not reported".
fn de_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// IDs arrive as strings or bare numbers depending on the surface.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// `hasMore` flags arrive as booleans or 0/1 integers.
fn de_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }))
}

fn decode<T: DeserializeOwned>(raw: &Value) -> Result<T, BackendFailure> {
    serde_json::from_value(raw.clone()).map_err(|e| BackendFailure::Decode(e.to_string()))
}

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

/// Collapse an array-wrapped scalar to its first element.
fn first_url(list: Option<UrlList>) -> Option<String> {
    list.and_then(|l| l.url_list.into_iter().find(|u| !u.is_empty()))
}

/// Enforce the exactly-one media invariant. Photo posts carry a stub video
/// upstream, so a non-empty image list wins over any video URL.
fn build_media(
    video_urls: Vec<String>,
    image_urls: Vec<String>,
    music_url: Option<String>,
) -> Result<(MediaType, MediaLinks), BackendFailure> {
    if !image_urls.is_empty() {
        Ok((
            MediaType::Image,
            MediaLinks {
                video_urls: Vec::new(),
                image_urls,
                music_url,
            },
        ))
    } else if !video_urls.is_empty() {
        Ok((
            MediaType::Video,
            MediaLinks {
                video_urls,
                image_urls: Vec::new(),
                music_url,
            },
        ))
    } else {
        Err(BackendFailure::Decode(
            "post carries neither video nor image media".to_string(),
        ))
    }
}

fn resolve_has_more(flag: Option<bool>, item_count: usize, cursor: &PaginationCursor) -> bool {
    // A full page may have more; a short page is exhausted.
    flag.unwrap_or(item_count >= cursor.page_size as usize && item_count > 0)
}

// ---------------------------------------------------------------------------
// Primary backend, mobile surface (video detail)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct UrlList {
    #[serde(default)]
    url_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AwemeEnvelope {
    #[serde(default)]
    aweme_list: Vec<AwemeItem>,
}

#[derive(Debug, Deserialize)]
struct AwemeItem {
    author: Option<AwemeAuthor>,

    statistics: Option<AwemeStatistics>,

    video: Option<AwemeVideo>,

    image_post_info: Option<AwemeImagePost>,

    music: Option<AwemeMusic>,
}

#[derive(Debug, Deserialize)]
struct AwemeAuthor {
    #[serde(default)]
    unique_id: String,

    #[serde(default)]
    nickname: String,

    avatar_thumb: Option<UrlList>,

    #[serde(default)]
    verification_type: i64,

    #[serde(default)]
    custom_verify: String,
}

#[derive(Debug, Default, Deserialize)]
struct AwemeStatistics {
    #[serde(default, deserialize_with = "de_count")]
    digg_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    comment_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    share_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    play_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AwemeVideo {
    play_addr: Option<UrlList>,
}

#[derive(Debug, Deserialize)]
struct AwemeImagePost {
    #[serde(default)]
    images: Vec<AwemeImage>,
}

#[derive(Debug, Deserialize)]
struct AwemeImage {
    display_image: Option<UrlList>,
}

#[derive(Debug, Deserialize)]
struct AwemeMusic {
    play_url: Option<UrlList>,
}

fn author_from_aweme(author: AwemeAuthor) -> Author {
    Author {
        verified: author.verification_type > 0 || !author.custom_verify.is_empty(),
        unique_id: author.unique_id,
        nickname: author.nickname,
        avatar_url: first_url(author.avatar_thumb),
    }
}

fn stats_from_aweme(stats: AwemeStatistics) -> Statistics {
    Statistics {
        like_count: stats.digg_count,
        comment_count: stats.comment_count,
        share_count: stats.share_count,
        play_count: stats.play_count,
        ..Statistics::default()
    }
}

pub fn normalize_primary_video(
    raw: &Value,
    include_raw: bool,
) -> Result<DownloadResult, BackendFailure> {
    let envelope: AwemeEnvelope = decode(raw)?;
    let item = envelope
        .aweme_list
        .into_iter()
        .next()
        .ok_or(BackendFailure::Empty)?;

    let image_urls: Vec<String> = item
        .image_post_info
        .map(|p| {
            p.images
                .into_iter()
                .filter_map(|i| first_url(i.display_image))
                .collect()
        })
        .unwrap_or_default();

    let video_urls: Vec<String> = item
        .video
        .and_then(|v| v.play_addr)
        .map(|u| u.url_list.into_iter().filter(|u| !u.is_empty()).collect())
        .unwrap_or_default();

    let music_url = item.music.and_then(|m| first_url(m.play_url));
    let (media_type, media) = build_media(video_urls, image_urls, music_url)?;

    Ok(DownloadResult {
        media_type,
        author: item.author.map(author_from_aweme).unwrap_or_default(),
        statistics: item.statistics.map(stats_from_aweme).unwrap_or_default(),
        media,
        raw: include_raw.then(|| raw.clone()),
    })
}

// ---------------------------------------------------------------------------
// MirrorA backend
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MirrorAEnvelope {
    #[serde(default)]
    code: i64,

    data: Option<MirrorAData>,
}

#[derive(Debug, Deserialize)]
struct MirrorAData {
    play: Option<String>,

    hdplay: Option<String>,

    music: Option<String>,

    #[serde(default)]
    images: Vec<String>,

    #[serde(default, deserialize_with = "de_count")]
    digg_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    comment_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    share_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    play_count: Option<u64>,

    author: Option<MirrorAAuthor>,
}

#[derive(Debug, Deserialize)]
struct MirrorAAuthor {
    #[serde(default)]
    unique_id: String,

    #[serde(default)]
    nickname: String,

    avatar: Option<String>,
}

pub fn normalize_mirror_a_video(
    raw: &Value,
    include_raw: bool,
) -> Result<DownloadResult, BackendFailure> {
    let envelope: MirrorAEnvelope = decode(raw)?;
    if envelope.code != 0 {
        // The mirror answers unresolvable links with a non-zero code.
        return Err(BackendFailure::Empty);
    }
    let data = envelope
        .data
        .ok_or_else(|| BackendFailure::Decode("missing `data` object".to_string()))?;

    let mut video_urls: Vec<String> = Vec::new();
    for candidate in [data.hdplay.clone(), data.play.clone()].into_iter().flatten() {
        if !candidate.is_empty() && !video_urls.contains(&candidate) {
            video_urls.push(candidate);
        }
    }
    let image_urls: Vec<String> = data.images.into_iter().filter(|u| !u.is_empty()).collect();
    let music_url = data.music.filter(|m| !m.is_empty());

    let (media_type, media) = build_media(video_urls, image_urls, music_url)?;

    Ok(DownloadResult {
        media_type,
        author: data
            .author
            .map(|a| Author {
                unique_id: a.unique_id,
                nickname: a.nickname,
                avatar_url: a.avatar,
                verified: false,
            })
            .unwrap_or_default(),
        statistics: Statistics {
            like_count: data.digg_count,
            comment_count: data.comment_count,
            share_count: data.share_count,
            play_count: data.play_count,
            ..Statistics::default()
        },
        media,
        raw: include_raw.then(|| raw.clone()),
    })
}

// ---------------------------------------------------------------------------
// MirrorB backend
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MirrorBEnvelope {
    author: Option<MirrorBAuthor>,

    video: Option<MirrorBVideo>,

    #[serde(default)]
    images: Vec<MirrorBImage>,

    music: Option<MirrorBMusic>,

    stats: Option<MirrorBStats>,
}

#[derive(Debug, Deserialize)]
struct MirrorBAuthor {
    #[serde(default)]
    unique_id: String,

    #[serde(default)]
    nickname: String,

    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MirrorBVideo {
    #[serde(rename = "noWatermark")]
    no_watermark: Option<String>,

    watermark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MirrorBImage {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct MirrorBMusic {
    play_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MirrorBStats {
    #[serde(default, deserialize_with = "de_count")]
    like_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    comment_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    share_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    play_count: Option<u64>,
}

pub fn normalize_mirror_b_video(
    raw: &Value,
    include_raw: bool,
) -> Result<DownloadResult, BackendFailure> {
    let envelope: MirrorBEnvelope = decode(raw)?;

    let mut video_urls: Vec<String> = Vec::new();
    if let Some(video) = envelope.video {
        for candidate in [video.no_watermark, video.watermark].into_iter().flatten() {
            if !candidate.is_empty() && !video_urls.contains(&candidate) {
                video_urls.push(candidate);
            }
        }
    }
    let image_urls: Vec<String> = envelope
        .images
        .into_iter()
        .map(|i| i.url)
        .filter(|u| !u.is_empty())
        .collect();
    let music_url = envelope
        .music
        .and_then(|m| m.play_url)
        .filter(|m| !m.is_empty());

    let (media_type, media) = build_media(video_urls, image_urls, music_url)?;
    let stats = envelope.stats.unwrap_or_default();

    Ok(DownloadResult {
        media_type,
        author: envelope
            .author
            .map(|a| Author {
                unique_id: a.unique_id,
                nickname: a.nickname,
                avatar_url: a.avatar,
                verified: false,
            })
            .unwrap_or_default(),
        statistics: Statistics {
            like_count: stats.like_count,
            comment_count: stats.comment_count,
            share_count: stats.share_count,
            play_count: stats.play_count,
            ..Statistics::default()
        },
        media,
        raw: include_raw.then(|| raw.clone()),
    })
}

/// Dispatch to the mapping matching the variant that produced the payload.
pub fn normalize_video(
    variant: BackendVariant,
    raw: &Value,
    include_raw: bool,
) -> Result<DownloadResult, BackendFailure> {
    match variant {
        BackendVariant::Primary => normalize_primary_video(raw, include_raw),
        BackendVariant::MirrorA => normalize_mirror_a_video(raw, include_raw),
        BackendVariant::MirrorB => normalize_mirror_b_video(raw, include_raw),
    }
}

// ---------------------------------------------------------------------------
// Primary backend, web surface (search / profile / feeds)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebUser {
    #[serde(default)]
    unique_id: String,

    #[serde(default)]
    nickname: String,

    avatar_larger: Option<String>,

    avatar_thumb: Option<String>,

    #[serde(default)]
    verified: bool,

    signature: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebUserStats {
    #[serde(default, deserialize_with = "de_count")]
    follower_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    following_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    heart_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    video_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebUserEntry {
    user: Option<WebUser>,

    stats: Option<WebUserStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebUserDetail {
    user_info: Option<WebUserEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebUserList {
    #[serde(default)]
    user_list: Vec<WebUserEntry>,

    #[serde(default, deserialize_with = "de_flag")]
    has_more: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebItem {
    #[serde(default, deserialize_with = "de_id")]
    id: String,

    #[serde(default)]
    desc: String,

    create_time: Option<i64>,

    author: Option<WebUser>,

    stats: Option<WebItemStats>,

    video: Option<WebVideo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebItemStats {
    #[serde(default, deserialize_with = "de_count")]
    digg_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    comment_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    share_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    play_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WebVideo {
    cover: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebItemList {
    #[serde(default)]
    item_list: Vec<WebItem>,

    #[serde(default, deserialize_with = "de_flag")]
    has_more: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WebLiveList {
    #[serde(default)]
    data: Vec<WebLiveEntry>,

    #[serde(default, deserialize_with = "de_flag")]
    has_more: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WebLiveEntry {
    live_info: Option<WebLiveInfo>,
}

#[derive(Debug, Deserialize)]
struct WebLiveInfo {
    #[serde(default, deserialize_with = "de_id")]
    room_id: String,

    title: Option<String>,

    #[serde(default, deserialize_with = "de_count")]
    user_count: Option<u64>,

    owner: Option<WebUser>,
}

#[derive(Debug, Deserialize)]
struct WebCommentList {
    #[serde(default)]
    comments: Vec<WebComment>,

    #[serde(default, deserialize_with = "de_flag")]
    has_more: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WebComment {
    #[serde(default, deserialize_with = "de_id")]
    cid: String,

    #[serde(default)]
    text: String,

    #[serde(default, deserialize_with = "de_count")]
    digg_count: Option<u64>,

    #[serde(default, deserialize_with = "de_count")]
    reply_comment_total: Option<u64>,

    create_time: Option<i64>,

    user: Option<AwemeAuthor>,
}

fn author_from_web(user: WebUser) -> Author {
    Author {
        unique_id: user.unique_id,
        nickname: user.nickname,
        avatar_url: user.avatar_larger.or(user.avatar_thumb),
        verified: user.verified,
    }
}

fn stats_from_item(stats: WebItemStats) -> Statistics {
    Statistics {
        like_count: stats.digg_count,
        comment_count: stats.comment_count,
        share_count: stats.share_count,
        play_count: stats.play_count,
        ..Statistics::default()
    }
}

fn stats_from_user(stats: WebUserStats) -> Statistics {
    Statistics {
        follower_count: stats.follower_count,
        following_count: stats.following_count,
        heart_count: stats.heart_count,
        video_count: stats.video_count,
        ..Statistics::default()
    }
}

fn post_from_item(item: WebItem) -> Post {
    Post {
        id: item.id,
        description: item.desc,
        created_at: timestamp(item.create_time),
        author: item.author.map(author_from_web).unwrap_or_default(),
        statistics: item.stats.map(stats_from_item).unwrap_or_default(),
        cover_url: item.video.and_then(|v| v.cover),
    }
}

pub fn normalize_profile(raw: &Value) -> Result<Profile, BackendFailure> {
    let detail: WebUserDetail = decode(raw)?;
    let entry = detail.user_info.ok_or(BackendFailure::Empty)?;
    let user = entry.user.ok_or(BackendFailure::Empty)?;
    let signature = user.signature.clone().filter(|s| !s.is_empty());

    Ok(Profile {
        author: author_from_web(user),
        statistics: entry.stats.map(stats_from_user).unwrap_or_default(),
        signature,
    })
}

pub fn normalize_post_feed(
    raw: &Value,
    cursor: &PaginationCursor,
) -> Result<FeedPage<Post>, BackendFailure> {
    let envelope: WebItemList = decode(raw)?;
    let items: Vec<Post> = envelope.item_list.into_iter().map(post_from_item).collect();
    let has_more = resolve_has_more(envelope.has_more, items.len(), cursor);

    Ok(FeedPage {
        items,
        cursor: *cursor,
        has_more,
    })
}

pub fn normalize_search(
    raw: &Value,
    kind: SearchKind,
    cursor: &PaginationCursor,
) -> Result<FeedPage<SearchResult>, BackendFailure> {
    let (items, flag): (Vec<SearchResult>, Option<bool>) = match kind {
        SearchKind::User => {
            let envelope: WebUserList = decode(raw)?;
            let items = envelope
                .user_list
                .into_iter()
                .filter_map(|entry| {
                    entry.user.map(|user| {
                        SearchResult::User(UserHit {
                            author: author_from_web(user),
                            statistics: entry.stats.map(stats_from_user).unwrap_or_default(),
                        })
                    })
                })
                .collect();
            (items, envelope.has_more)
        }
        SearchKind::Video => {
            let envelope: WebItemList = decode(raw)?;
            let items = envelope
                .item_list
                .into_iter()
                .map(|item| {
                    SearchResult::Video(VideoHit {
                        post: post_from_item(item),
                    })
                })
                .collect();
            (items, envelope.has_more)
        }
        SearchKind::Live => {
            let envelope: WebLiveList = decode(raw)?;
            let items = envelope
                .data
                .into_iter()
                .filter_map(|entry| {
                    entry.live_info.map(|info| {
                        SearchResult::Live(LiveHit {
                            room_id: info.room_id,
                            title: info.title,
                            author: info.owner.map(author_from_web).unwrap_or_default(),
                            viewer_count: info.user_count,
                        })
                    })
                })
                .collect();
            (items, envelope.has_more)
        }
    };

    let has_more = resolve_has_more(flag, items.len(), cursor);
    Ok(FeedPage {
        items,
        cursor: *cursor,
        has_more,
    })
}

pub fn normalize_comments(
    raw: &Value,
    cursor: &PaginationCursor,
) -> Result<FeedPage<Comment>, BackendFailure> {
    let envelope: WebCommentList = decode(raw)?;
    let items: Vec<Comment> = envelope
        .comments
        .into_iter()
        .map(|c| Comment {
            id: c.cid,
            text: c.text,
            author: c.user.map(author_from_aweme).unwrap_or_default(),
            like_count: c.digg_count,
            reply_count: c.reply_comment_total,
            created_at: timestamp(c.create_time),
        })
        .collect();
    let has_more = resolve_has_more(envelope.has_more, items.len(), cursor);

    Ok(FeedPage {
        items,
        cursor: *cursor,
        has_more,
    })
}

pub fn normalize_trending_posts(raw: &Value) -> Result<Vec<Post>, BackendFailure> {
    let envelope: WebItemList = decode(raw)?;
    Ok(envelope.item_list.into_iter().map(post_from_item).collect())
}

pub fn normalize_creator_list(raw: &Value) -> Result<Vec<Author>, BackendFailure> {
    let envelope: WebUserList = decode(raw)?;
    Ok(envelope
        .user_list
        .into_iter()
        .filter_map(|entry| entry.user.map(author_from_web))
        .collect())
}
