use serde::{Deserialize, Serialize};

use crate::youtube_rs::error::RemoteRequestError;

/// Decoupled representation of a playlist owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub title: String,
}

/// Decoupled representation of a video from the videos listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub channel_title: Option<String>,
    pub published_at: Option<String>,
}

/// One page of a paginated list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Unlisted => "unlisted",
            PrivacyStatus::Private => "private",
        }
    }
}

/// Port trait wrapping the page-level YouTube API calls used by business logic.
///
/// Pagination is driven by `services::youtube::PlaylistService`.
/// Implementations live in `services::youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait YoutubeClient: Send + Sync {
    async fn playlists_page(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<Playlist>, RemoteRequestError>;

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>, RemoteRequestError>;

    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        note: &str,
    ) -> Result<(), RemoteRequestError>;

    /// Returns the id of the new playlist
    async fn insert_playlist(
        &self,
        title: &str,
        privacy: PrivacyStatus,
    ) -> Result<String, RemoteRequestError>;

    async fn videos_page(
        &self,
        video_ids: &[String],
        page_token: Option<String>,
    ) -> Result<Page<VideoMetadata>, RemoteRequestError>;
}
