use std::collections::HashSet;

use crate::ports::clock::Clock;
use crate::ports::feed::FeedClient;
use crate::ports::youtube::{Playlist, PrivacyStatus, YoutubeClient};
use crate::reddit_rs::feed::FeedError;
use crate::services::extract::{VideoCandidate, extract};
use crate::services::youtube::PlaylistService;
use crate::youtube_rs::error::RemoteRequestError;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Feed sources polled for links
    pub sources: Vec<String>,
    /// Prefix of the dated playlist title, e.g. `/r/videos`
    pub source_label: String,
    pub privacy: PrivacyStatus,
    /// Log what would change without creating or inserting anything
    pub dry_run: bool,
    /// Prepended to each post permalink in the item note
    pub permalink_base: String,
}

/// Failures that abort the run. Single item inserts never end up here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to fetch feed: {0}")]
    Feed(#[from] FeedError),
    #[error("Failed to acquire playlist '{title}': {source}")]
    AcquirePlaylist {
        title: String,
        source: RemoteRequestError,
    },
    #[error("Failed to list items of playlist {playlist_id}: {source}")]
    ListPlaylistItems {
        playlist_id: String,
        source: RemoteRequestError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// `None` only for a dry run on a day whose playlist does not exist yet
    pub playlist_id: Option<String>,
    pub candidates: usize,
    pub already_present: usize,
    pub inserted: usize,
    pub failed: usize,
}

pub struct SyncOrchestrator<F: FeedClient, C: YoutubeClient, K: Clock> {
    feed: F,
    playlists: PlaylistService<C>,
    clock: K,
    options: SyncOptions,
}

impl<F: FeedClient, C: YoutubeClient, K: Clock> SyncOrchestrator<F, C, K> {
    pub fn new(feed: F, playlists: PlaylistService<C>, clock: K, options: SyncOptions) -> Self {
        Self {
            feed,
            playlists,
            clock,
            options,
        }
    }

    /// `<source-label>@<YYYY-MM-DD>` for the current local date
    pub fn playlist_title(&self) -> String {
        format!(
            "{}@{}",
            self.options.source_label,
            self.clock.today().format("%Y-%m-%d")
        )
    }

    fn note_for(&self, candidate: &VideoCandidate) -> String {
        format!(
            "{}\n{}{}",
            candidate.title,
            self.options.permalink_base.trim_end_matches('/'),
            candidate.permalink
        )
    }

    /// Finds today's playlist by exact title, creating it when missing.
    /// A dry run never creates and returns `None` instead.
    #[tracing::instrument(skip(self))]
    pub async fn acquire_playlist(&self) -> Result<Option<Playlist>, SyncError> {
        let title = self.playlist_title();
        let acquire_error = |source: RemoteRequestError| SyncError::AcquirePlaylist {
            title: title.clone(),
            source,
        };

        let existing = self
            .playlists
            .list_playlists()
            .await
            .map_err(acquire_error)?;

        if let Some(playlist) = existing.into_iter().find(|p| p.title == title) {
            tracing::info!("Using existing playlist '{}' ({})", playlist.title, playlist.id);
            return Ok(Some(playlist));
        }

        if self.options.dry_run {
            tracing::info!("Dry run: would create playlist '{}'", title);
            return Ok(None);
        }

        let id = self
            .playlists
            .create_playlist(&title, self.options.privacy)
            .await
            .map_err(acquire_error)?;
        tracing::info!("Created playlist '{}' ({})", title, id);

        Ok(Some(Playlist { id, title }))
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_candidates(&self) -> Result<Vec<VideoCandidate>, SyncError> {
        let listing = self.feed.fetch(&self.options.sources).await?;
        let candidates = extract(&listing);
        tracing::info!(
            "Found {} video candidates in {} feed entries",
            candidates.len(),
            listing.data.children.len()
        );
        Ok(candidates)
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_existing(&self, playlist_id: &str) -> Result<HashSet<String>, SyncError> {
        let items = self
            .playlists
            .list_playlist_items(playlist_id)
            .await
            .map_err(|source| SyncError::ListPlaylistItems {
                playlist_id: playlist_id.to_string(),
                source,
            })?;
        tracing::info!("Playlist already holds {} videos", items.len());
        Ok(items.into_iter().collect())
    }

    /// Inserts every candidate missing from `existing`, in candidate order.
    /// A failed insert is logged and the loop moves on.
    #[tracing::instrument(skip(self, candidates, existing), fields(candidates = candidates.len()))]
    pub async fn insert_missing(
        &self,
        playlist_id: Option<&str>,
        candidates: &[VideoCandidate],
        mut existing: HashSet<String>,
    ) -> SyncReport {
        let mut report = SyncReport {
            playlist_id: playlist_id.map(str::to_string),
            candidates: candidates.len(),
            ..SyncReport::default()
        };

        for candidate in candidates {
            if existing.contains(&candidate.video_id) {
                report.already_present += 1;
                continue;
            }

            let Some(playlist_id) = playlist_id.filter(|_| !self.options.dry_run) else {
                tracing::info!("Dry run: would add {} ({})", candidate.video_id, candidate.title);
                report.inserted += 1;
                continue;
            };

            tracing::info!("Adding: {}", candidate.video_id);
            let note = self.note_for(candidate);
            match self
                .playlists
                .insert_playlist_item(playlist_id, &candidate.video_id, &note)
                .await
            {
                Ok(()) => {
                    existing.insert(candidate.video_id.clone());
                    report.inserted += 1;
                }
                Err(error) => {
                    tracing::error!("Failed to add {}: {}", candidate.video_id, error);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// One full pass. `Err` only for failures that leave nothing to sync into
    /// or nothing to sync.
    #[tracing::instrument(skip(self), fields(sources = ?self.options.sources, dry_run = self.options.dry_run))]
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        // Checked before any remote call so no playlist is created for an empty feed
        if self.options.sources.iter().all(|source| source.trim().is_empty()) {
            return Err(SyncError::Feed(FeedError::NoSources));
        }

        let playlist = self.acquire_playlist().await?;
        let candidates = self.fetch_candidates().await?;

        let existing = match &playlist {
            Some(playlist) => self.fetch_existing(&playlist.id).await?,
            None => HashSet::new(),
        };

        let report = self
            .insert_missing(
                playlist.as_ref().map(|p| p.id.as_str()),
                &candidates,
                existing,
            )
            .await;

        tracing::info!(
            candidates = report.candidates,
            already_present = report.already_present,
            inserted = report.inserted,
            failed = report.failed,
            "Sync finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::ports::clock::MockClock;
    use crate::ports::feed::MockFeedClient;
    use crate::ports::youtube::{MockYoutubeClient, Page};
    use crate::reddit_rs::types::Listing;

    const TODAY_TITLE: &str = "/r/videos@2026-10-16";

    fn options(dry_run: bool) -> SyncOptions {
        SyncOptions {
            sources: vec!["videos".to_string()],
            source_label: "/r/videos".to_string(),
            privacy: PrivacyStatus::Public,
            dry_run,
            permalink_base: "https://reddit.com".to_string(),
        }
    }

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_today()
            .returning(|| NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        clock
    }

    fn feed_with(ids: &[&str]) -> MockFeedClient {
        let children: Vec<_> = ids
            .iter()
            .map(|id| {
                json!({"kind": "t3", "data": {
                    "domain": "youtu.be",
                    "url": format!("https://youtu.be/{}", id),
                    "title": format!("Title {}", id),
                    "permalink": format!("/r/videos/comments/{}/", id)
                }})
            })
            .collect();
        let listing: Listing =
            serde_json::from_value(json!({"data": {"children": children}})).unwrap();

        let mut feed = MockFeedClient::new();
        feed.expect_fetch().returning(move |_| Ok(listing.clone()));
        feed
    }

    /// In-memory stand-in for the remote account: playlists and their items.
    #[derive(Default)]
    struct Remote {
        playlists: Vec<Playlist>,
        items: Vec<String>,
        inserted: Vec<(String, String)>,
        creates: usize,
    }

    fn youtube_backed_by(remote: Arc<Mutex<Remote>>) -> MockYoutubeClient {
        let mut client = MockYoutubeClient::new();

        let state = remote.clone();
        client.expect_playlists_page().returning(move |_| {
            Ok(Page {
                items: state.lock().unwrap().playlists.clone(),
                next_page_token: None,
            })
        });

        let state = remote.clone();
        client.expect_insert_playlist().returning(move |title, _| {
            let mut remote = state.lock().unwrap();
            remote.creates += 1;
            let id = format!("PL{}", remote.creates);
            remote.playlists.push(Playlist {
                id: id.clone(),
                title: title.to_string(),
            });
            Ok(id)
        });

        let state = remote.clone();
        client.expect_playlist_items_page().returning(move |_, _| {
            Ok(Page {
                items: state.lock().unwrap().items.clone(),
                next_page_token: None,
            })
        });

        let state = remote;
        client
            .expect_insert_playlist_item()
            .returning(move |_, video_id, note| {
                let mut remote = state.lock().unwrap();
                remote.items.push(video_id.to_string());
                remote.inserted.push((video_id.to_string(), note.to_string()));
                Ok(())
            });

        client
    }

    fn orchestrator(
        feed: MockFeedClient,
        client: MockYoutubeClient,
        dry_run: bool,
    ) -> SyncOrchestrator<MockFeedClient, MockYoutubeClient, MockClock> {
        SyncOrchestrator::new(feed, PlaylistService::new(client), clock(), options(dry_run))
    }

    #[test]
    fn test_playlist_title_uses_label_and_date() {
        let sync = orchestrator(MockFeedClient::new(), MockYoutubeClient::new(), false);
        assert_eq!(sync.playlist_title(), TODAY_TITLE);
    }

    #[tokio::test]
    async fn test_run_inserts_missing_with_note() {
        let remote = Arc::new(Mutex::new(Remote {
            items: vec!["b".to_string()],
            playlists: vec![Playlist {
                id: "PLtoday".into(),
                title: TODAY_TITLE.into(),
            }],
            ..Remote::default()
        }));
        let sync = orchestrator(feed_with(&["a", "b", "c"]), youtube_backed_by(remote.clone()), false);

        let report = sync.run().await.unwrap();

        assert_eq!(report.playlist_id.as_deref(), Some("PLtoday"));
        assert_eq!(report.candidates, 3);
        assert_eq!(report.already_present, 1);
        assert_eq!(report.inserted, 2);

        let remote = remote.lock().unwrap();
        assert_eq!(remote.creates, 0);
        assert_eq!(
            remote.inserted,
            vec![
                (
                    "a".to_string(),
                    "Title a\nhttps://reddit.com/r/videos/comments/a/".to_string()
                ),
                (
                    "c".to_string(),
                    "Title c\nhttps://reddit.com/r/videos/comments/c/".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_second_run_inserts_nothing() {
        let remote = Arc::new(Mutex::new(Remote::default()));
        let sync = orchestrator(feed_with(&["a", "b"]), youtube_backed_by(remote.clone()), false);

        let first = sync.run().await.unwrap();
        let second = sync.run().await.unwrap();

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_present, 2);
        assert_eq!(remote.lock().unwrap().inserted.len(), 2);
    }

    #[tokio::test]
    async fn test_acquire_playlist_reuses_same_day_playlist() {
        let remote = Arc::new(Mutex::new(Remote {
            playlists: vec![Playlist {
                id: "PLold".into(),
                title: "/r/videos@2026-10-15".into(),
            }],
            ..Remote::default()
        }));
        let sync = orchestrator(MockFeedClient::new(), youtube_backed_by(remote.clone()), false);

        let first = sync.acquire_playlist().await.unwrap().unwrap();
        let second = sync.acquire_playlist().await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.title, TODAY_TITLE);
        assert_eq!(remote.lock().unwrap().creates, 1);
    }

    #[tokio::test]
    async fn test_failed_insert_does_not_stop_the_batch() {
        let attempts = Arc::new(Mutex::new(Vec::new()));

        let mut client = MockYoutubeClient::new();
        client.expect_playlists_page().returning(|_| {
            Ok(Page {
                items: vec![Playlist {
                    id: "PLtoday".into(),
                    title: TODAY_TITLE.into(),
                }],
                next_page_token: None,
            })
        });
        client.expect_playlist_items_page().returning(|_, _| {
            Ok(Page {
                items: vec![],
                next_page_token: None,
            })
        });
        let seen = attempts.clone();
        client
            .expect_insert_playlist_item()
            .times(3)
            .returning(move |_, video_id, _| {
                seen.lock().unwrap().push(video_id.to_string());
                if video_id == "two" {
                    Err(RemoteRequestError::Rejected {
                        status: 400,
                        body: "videoNotFound".into(),
                    })
                } else {
                    Ok(())
                }
            });

        let sync = orchestrator(feed_with(&["one", "two", "three"]), client, false);
        let report = sync.run().await.unwrap();

        assert_eq!(*attempts.lock().unwrap(), vec!["one", "two", "three"]);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_feed_failure_aborts() {
        let mut feed = MockFeedClient::new();
        feed.expect_fetch().returning(|_| {
            Err(FeedError::Unavailable {
                status: 503,
                body: "down".into(),
            })
        });

        let remote = Arc::new(Mutex::new(Remote::default()));
        let sync = orchestrator(feed, youtube_backed_by(remote.clone()), false);

        let result = sync.run().await;

        assert!(matches!(result, Err(SyncError::Feed(_))));
        assert!(remote.lock().unwrap().inserted.is_empty());
    }

    #[tokio::test]
    async fn test_empty_sources_abort_before_any_remote_call() {
        let remote = Arc::new(Mutex::new(Remote::default()));
        let mut feed = MockFeedClient::new();
        feed.expect_fetch().times(0);

        let mut sync = orchestrator(feed, youtube_backed_by(remote.clone()), false);
        sync.options.sources = vec![];
        sync.options.source_label = "/r/".to_string();

        let result = sync.run().await;

        assert!(matches!(result, Err(SyncError::Feed(FeedError::NoSources))));
        let remote = remote.lock().unwrap();
        assert_eq!(remote.creates, 0);
        assert!(remote.playlists.is_empty());
    }

    #[tokio::test]
    async fn test_playlist_creation_failure_aborts() {
        let mut client = MockYoutubeClient::new();
        client.expect_playlists_page().returning(|_| {
            Ok(Page {
                items: vec![],
                next_page_token: None,
            })
        });
        client.expect_insert_playlist().returning(|_, _| {
            Err(RemoteRequestError::Rejected {
                status: 403,
                body: "insufficientPermissions".into(),
            })
        });

        let sync = orchestrator(MockFeedClient::new(), client, false);
        let result = sync.run().await;

        match result {
            Err(SyncError::AcquirePlaylist { title, .. }) => assert_eq!(title, TODAY_TITLE),
            other => panic!("expected playlist acquisition failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let remote = Arc::new(Mutex::new(Remote::default()));
        let sync = orchestrator(feed_with(&["a", "b"]), youtube_backed_by(remote.clone()), true);

        let report = sync.run().await.unwrap();

        assert_eq!(report.playlist_id, None);
        assert_eq!(report.inserted, 2);
        let remote = remote.lock().unwrap();
        assert_eq!(remote.creates, 0);
        assert!(remote.inserted.is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_with_existing_playlist_skips_present_items() {
        let remote = Arc::new(Mutex::new(Remote {
            playlists: vec![Playlist {
                id: "PLtoday".into(),
                title: TODAY_TITLE.into(),
            }],
            items: vec!["a".to_string()],
            ..Remote::default()
        }));
        let sync = orchestrator(feed_with(&["a", "b"]), youtube_backed_by(remote.clone()), true);

        let report = sync.run().await.unwrap();

        assert_eq!(report.playlist_id.as_deref(), Some("PLtoday"));
        assert_eq!(report.already_present, 1);
        assert_eq!(report.inserted, 1);
        assert!(remote.lock().unwrap().inserted.is_empty());
    }
}
