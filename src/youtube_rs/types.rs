use serde::{Deserialize, Serialize};

/* ---------- List envelope ---------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/* ---------- Playlists ---------- */

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResource {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPlaylist<'a> {
    pub snippet: NewPlaylistSnippet<'a>,
    pub status: NewPlaylistStatus<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPlaylistSnippet<'a> {
    pub title: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistStatus<'a> {
    pub privacy_status: &'a str,
}

/* ---------- Playlist items ---------- */

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemResource {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: Option<String>,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistItem<'a> {
    pub snippet: NewPlaylistItemSnippet<'a>,
    pub content_details: NewPlaylistItemContentDetails<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistItemSnippet<'a> {
    pub playlist_id: &'a str,
    pub resource_id: NewResourceId<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResourceId<'a> {
    pub kind: &'static str,
    pub video_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPlaylistItemContentDetails<'a> {
    pub note: &'a str,
}

/* ---------- Videos ---------- */

#[derive(Debug, Clone, Deserialize)]
pub struct VideoResource {
    pub id: String,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}
