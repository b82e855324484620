use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::youtube_rs::error::RemoteRequestError;
use crate::youtube_rs::types::{
    ListResponse, NewPlaylist, NewPlaylistItem, NewPlaylistItemContentDetails,
    NewPlaylistItemSnippet, NewPlaylistSnippet, NewPlaylistStatus, NewResourceId,
    PlaylistItemResource, PlaylistResource, VideoResource,
};

pub const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest `maxResults` the list endpoints accept.
pub const MAX_RESULTS: u32 = 50;

/// Appends a resource name to the API base, keeping any base path (`/youtube/v3`).
fn endpoint(base_url: &Url, resource: &str) -> Result<Url, RemoteRequestError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| RemoteRequestError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push(resource);
    Ok(url)
}

async fn send(request: RequestBuilder) -> Result<Response, RemoteRequestError> {
    let response = request
        .send()
        .await
        .map_err(RemoteRequestError::FailedToSendRequest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(RemoteRequestError::Rejected {
            status: status.as_u16(),
            body: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    Ok(response)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteRequestError> {
    send(request)
        .await?
        .json::<T>()
        .await
        .map_err(RemoteRequestError::FailedToParseResponse)
}

/* ---------- Playlists ---------- */

pub async fn list_playlists_page(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    page_token: Option<&str>,
) -> Result<ListResponse<PlaylistResource>, RemoteRequestError> {
    let mut url = endpoint(base_url, "playlists")?;
    url.query_pairs_mut()
        .append_pair("part", "snippet")
        .append_pair("mine", "true")
        .append_pair("maxResults", &MAX_RESULTS.to_string());
    if let Some(page_token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", page_token);
    }

    send_json(client.get(url).bearer_auth(access_token)).await
}

pub async fn insert_playlist(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    title: &str,
    privacy_status: &str,
) -> Result<PlaylistResource, RemoteRequestError> {
    let mut url = endpoint(base_url, "playlists")?;
    url.query_pairs_mut().append_pair("part", "snippet,status");

    let body = NewPlaylist {
        snippet: NewPlaylistSnippet { title },
        status: NewPlaylistStatus { privacy_status },
    };

    send_json(client.post(url).bearer_auth(access_token).json(&body)).await
}

/* ---------- Playlist items ---------- */

pub async fn list_playlist_items_page(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    playlist_id: &str,
    page_token: Option<&str>,
) -> Result<ListResponse<PlaylistItemResource>, RemoteRequestError> {
    let mut url = endpoint(base_url, "playlistItems")?;
    url.query_pairs_mut()
        .append_pair("part", "snippet")
        .append_pair("playlistId", playlist_id)
        .append_pair("maxResults", &MAX_RESULTS.to_string());
    if let Some(page_token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", page_token);
    }

    send_json(client.get(url).bearer_auth(access_token)).await
}

pub async fn insert_playlist_item(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    playlist_id: &str,
    video_id: &str,
    note: &str,
) -> Result<(), RemoteRequestError> {
    let mut url = endpoint(base_url, "playlistItems")?;
    url.query_pairs_mut()
        .append_pair("part", "snippet,contentDetails");

    let body = NewPlaylistItem {
        snippet: NewPlaylistItemSnippet {
            playlist_id,
            resource_id: NewResourceId {
                kind: "youtube#video",
                video_id,
            },
        },
        content_details: NewPlaylistItemContentDetails { note },
    };

    send(client.post(url).bearer_auth(access_token).json(&body)).await?;
    Ok(())
}

/* ---------- Videos ---------- */

pub async fn list_videos_page(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    video_ids: &[String],
    page_token: Option<&str>,
) -> Result<ListResponse<VideoResource>, RemoteRequestError> {
    let mut url = endpoint(base_url, "videos")?;
    url.query_pairs_mut()
        .append_pair("part", "snippet")
        .append_pair("id", &video_ids.join(","))
        .append_pair("maxResults", &MAX_RESULTS.to_string());
    if let Some(page_token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", page_token);
    }

    send_json(client.get(url).bearer_auth(access_token)).await
}
