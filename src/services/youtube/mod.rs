pub mod client;
pub mod credentials;

use std::future::Future;

use crate::ports::youtube::{Page, Playlist, PrivacyStatus, VideoMetadata, YoutubeClient};
use crate::youtube_rs::error::RemoteRequestError;
use crate::youtube_rs::playlist::MAX_RESULTS;

/// Follows continuation tokens from an empty first token until a page comes
/// back without one, keeping items in response order.
pub async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, RemoteRequestError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, RemoteRequestError>>,
{
    let mut items = Vec::new();
    let mut page_token = None;

    loop {
        let page = fetch_page(page_token.take()).await?;
        items.extend(page.items);

        match page.next_page_token.filter(|token| !token.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(items)
}

pub struct PlaylistService<C: YoutubeClient> {
    client: C,
}

impl<C: YoutubeClient> PlaylistService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn list_playlists(&self) -> Result<Vec<Playlist>, RemoteRequestError> {
        collect_pages(|page_token| self.client.playlists_page(page_token)).await
    }

    /// Video ids currently in the playlist
    pub async fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<String>, RemoteRequestError> {
        collect_pages(|page_token| self.client.playlist_items_page(playlist_id, page_token)).await
    }

    pub async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        note: &str,
    ) -> Result<(), RemoteRequestError> {
        self.client
            .insert_playlist_item(playlist_id, video_id, note)
            .await
    }

    pub async fn create_playlist(
        &self,
        title: &str,
        privacy: PrivacyStatus,
    ) -> Result<String, RemoteRequestError> {
        self.client.insert_playlist(title, privacy).await
    }

    /// The videos endpoint takes at most 50 ids per request.
    pub async fn list_videos(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoMetadata>, RemoteRequestError> {
        let mut videos = Vec::with_capacity(video_ids.len());
        for chunk in video_ids.chunks(MAX_RESULTS as usize) {
            let page = collect_pages(|page_token| self.client.videos_page(chunk, page_token)).await?;
            videos.extend(page);
        }
        Ok(videos)
    }
}
