use reqwest::Client;
use url::Url;

use crate::ports::auth::AuthProvider;
use crate::ports::youtube::{Page, Playlist, PrivacyStatus, VideoMetadata, YoutubeClient};
use crate::youtube_rs::error::RemoteRequestError;
use crate::youtube_rs::playlist::{
    insert_playlist, insert_playlist_item, list_playlist_items_page, list_playlists_page,
    list_videos_page,
};

pub struct YoutubeHttpAdapter<A: AuthProvider> {
    client: Client,
    base_url: Url,
    auth: A,
}

impl<A: AuthProvider> YoutubeHttpAdapter<A> {
    pub fn new(client: Client, base_url: Url, auth: A) -> Self {
        Self {
            client,
            base_url,
            auth,
        }
    }

    async fn access_token(&self) -> Result<String, RemoteRequestError> {
        Ok(self.auth.credential().await?.access_token)
    }
}

#[async_trait::async_trait]
impl<A: AuthProvider> YoutubeClient for YoutubeHttpAdapter<A> {
    async fn playlists_page(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<Playlist>, RemoteRequestError> {
        let token = self.access_token().await?;
        let response =
            list_playlists_page(&self.client, &self.base_url, &token, page_token.as_deref())
                .await?;

        Ok(Page {
            items: response
                .items
                .into_iter()
                .map(|playlist| Playlist {
                    id: playlist.id,
                    title: playlist.snippet.title,
                })
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>, RemoteRequestError> {
        let token = self.access_token().await?;
        let response = list_playlist_items_page(
            &self.client,
            &self.base_url,
            &token,
            playlist_id,
            page_token.as_deref(),
        )
        .await?;

        Ok(Page {
            // Items that are not videos carry no videoId
            items: response
                .items
                .into_iter()
                .filter_map(|item| item.snippet.resource_id.video_id)
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        note: &str,
    ) -> Result<(), RemoteRequestError> {
        let token = self.access_token().await?;
        insert_playlist_item(
            &self.client,
            &self.base_url,
            &token,
            playlist_id,
            video_id,
            note,
        )
        .await
    }

    async fn insert_playlist(
        &self,
        title: &str,
        privacy: PrivacyStatus,
    ) -> Result<String, RemoteRequestError> {
        let token = self.access_token().await?;
        let playlist =
            insert_playlist(&self.client, &self.base_url, &token, title, privacy.as_str()).await?;
        Ok(playlist.id)
    }

    async fn videos_page(
        &self,
        video_ids: &[String],
        page_token: Option<String>,
    ) -> Result<Page<VideoMetadata>, RemoteRequestError> {
        let token = self.access_token().await?;
        let response = list_videos_page(
            &self.client,
            &self.base_url,
            &token,
            video_ids,
            page_token.as_deref(),
        )
        .await?;

        Ok(Page {
            items: response
                .items
                .into_iter()
                .map(|video| VideoMetadata {
                    id: video.id,
                    title: video.snippet.title,
                    channel_title: video.snippet.channel_title,
                    published_at: video.snippet.published_at,
                })
                .collect(),
            next_page_token: response.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::auth::{Credential, MockAuthProvider};
    use crate::youtube_rs::auth::AuthenticationError;
    use mockito::Matcher;
    use std::path::PathBuf;

    fn authorized() -> MockAuthProvider {
        let mut auth = MockAuthProvider::new();
        auth.expect_credential().returning(|| {
            Ok(Credential {
                access_token: "token-1".into(),
            })
        });
        auth
    }

    fn adapter(server: &mockito::Server, auth: MockAuthProvider) -> YoutubeHttpAdapter<MockAuthProvider> {
        YoutubeHttpAdapter::new(
            Client::new(),
            Url::parse(&format!("{}/youtube/v3", server.url())).unwrap(),
            auth,
        )
    }

    #[tokio::test]
    async fn test_playlists_page_maps_resources() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/youtube/v3/playlists")
            .match_header("authorization", "Bearer token-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("part".into(), "snippet".into()),
                Matcher::UrlEncoded("mine".into(), "true".into()),
                Matcher::UrlEncoded("maxResults".into(), "50".into()),
                Matcher::UrlEncoded("pageToken".into(), "t1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"nextPageToken": "t2", "items": [
                    {"id": "PL1", "snippet": {"title": "/r/videos@2026-10-16", "description": ""}}
                ]}"#,
            )
            .create_async()
            .await;

        let page = adapter(&server, authorized())
            .playlists_page(Some("t1".into()))
            .await
            .unwrap();

        assert_eq!(
            page.items,
            vec![Playlist {
                id: "PL1".into(),
                title: "/r/videos@2026-10-16".into()
            }]
        );
        assert_eq!(page.next_page_token.as_deref(), Some("t2"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_playlist_items_page_reads_video_ids() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/youtube/v3/playlistItems")
            .match_query(Matcher::UrlEncoded("playlistId".into(), "PL1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {"snippet": {"title": "A", "resourceId": {"kind": "youtube#video", "videoId": "a1"}}},
                    {"snippet": {"title": "Gone", "resourceId": {"kind": "youtube#channel"}}},
                    {"snippet": {"title": "B", "resourceId": {"kind": "youtube#video", "videoId": "b2"}}}
                ]}"#,
            )
            .create_async()
            .await;

        let page = adapter(&server, authorized())
            .playlist_items_page("PL1", None)
            .await
            .unwrap();

        assert_eq!(page.items, vec!["a1".to_string(), "b2".to_string()]);
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_insert_playlist_item_sends_note() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/youtube/v3/playlistItems")
            .match_query(Matcher::UrlEncoded(
                "part".into(),
                "snippet,contentDetails".into(),
            ))
            .match_body(Matcher::Json(serde_json::json!({
                "snippet": {
                    "playlistId": "PL1",
                    "resourceId": {"kind": "youtube#video", "videoId": "abc123"}
                },
                "contentDetails": {"note": "Clip\nhttps://reddit.com/r/videos/1"}
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        adapter(&server, authorized())
            .insert_playlist_item("PL1", "abc123", "Clip\nhttps://reddit.com/r/videos/1")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_insert_playlist_item_rejection_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/youtube/v3/playlistItems")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "quotaExceeded"}}"#)
            .create_async()
            .await;

        let result = adapter(&server, authorized())
            .insert_playlist_item("PL1", "abc123", "note")
            .await;

        match result {
            Err(RemoteRequestError::Rejected { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.contains("quotaExceeded"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_insert_playlist_uses_privacy_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/youtube/v3/playlists")
            .match_query(Matcher::UrlEncoded("part".into(), "snippet,status".into()))
            .match_body(Matcher::Json(serde_json::json!({
                "snippet": {"title": "/r/videos@2026-10-16"},
                "status": {"privacyStatus": "unlisted"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "PLnew", "snippet": {"title": "/r/videos@2026-10-16"}}"#)
            .create_async()
            .await;

        let id = adapter(&server, authorized())
            .insert_playlist("/r/videos@2026-10-16", PrivacyStatus::Unlisted)
            .await
            .unwrap();

        assert_eq!(id, "PLnew");
    }

    #[tokio::test]
    async fn test_videos_page_joins_ids() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/youtube/v3/videos")
            .match_query(Matcher::UrlEncoded("id".into(), "a1,b2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {"id": "a1", "snippet": {"title": "A", "channelTitle": "Chan", "publishedAt": "2026-10-15T10:00:00Z"}},
                    {"id": "b2", "snippet": {"title": "B"}}
                ]}"#,
            )
            .create_async()
            .await;

        let page = adapter(&server, authorized())
            .videos_page(&["a1".to_string(), "b2".to_string()], None)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].channel_title.as_deref(), Some("Chan"));
        assert_eq!(page.items[1].published_at, None);
    }

    #[tokio::test]
    async fn test_authentication_failure_skips_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut auth = MockAuthProvider::new();
        auth.expect_credential().returning(|| {
            Err(AuthenticationError::MissingCredentials {
                path: PathBuf::from("/nowhere/credentials.json"),
            })
        });

        let result = adapter(&server, auth).playlists_page(None).await;

        assert!(matches!(result, Err(RemoteRequestError::Authentication(_))));
        mock.assert_async().await;
    }
}
