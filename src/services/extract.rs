use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::reddit_rs::types::{FeedEntry, Listing};

const SHORT_LINK_HOST: &str = "youtu.be";

static VIDEO_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(youtube\.com|youtu\.be)").expect("valid video host regex"));

static VIDEO_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[&;])v=([a-zA-Z0-9_-]+)").expect("valid video param regex"));

/// A video found in the feed that should end up in the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub video_id: String,
    pub title: String,
    pub permalink: String,
}

/// Derives the video id from a post url.
///
/// `https://youtu.be/<id>` yields the path, anything else on a YouTube domain
/// yields the `v` query parameter.
pub fn video_id_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;

    let video_id = if url.host_str() == Some(SHORT_LINK_HOST) {
        url.path().strip_prefix('/')?.to_string()
    } else {
        let query = url.query()?;
        VIDEO_PARAM.captures(query)?.get(1)?.as_str().to_string()
    };

    (!video_id.is_empty()).then_some(video_id)
}

fn candidate_from_entry(entry: FeedEntry) -> Option<VideoCandidate> {
    if !VIDEO_HOST.is_match(&entry.domain) {
        return None;
    }

    let Some(video_id) = video_id_from_url(&entry.url) else {
        tracing::debug!("Dropping video post without a video id: {}", entry.url);
        return None;
    };

    Some(VideoCandidate {
        video_id,
        title: entry.title,
        permalink: entry.permalink,
    })
}

/// Video candidates in feed order, deduplicated by video id (first post wins).
/// Entries that are not video links are dropped; this never fails.
pub fn extract(listing: &Listing) -> Vec<VideoCandidate> {
    let mut seen = HashSet::new();

    listing
        .entries()
        .into_iter()
        .filter_map(candidate_from_entry)
        .filter(|candidate| seen.insert(candidate.video_id.clone()))
        .collect()
}
