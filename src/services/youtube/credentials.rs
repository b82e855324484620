use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::ports::auth::{AuthProvider, Credential};
use crate::youtube_rs::auth::{AuthenticationError, StoredCredential, refresh_access_token};

/// Credential file backed [`AuthProvider`]. Refreshed tokens are written back
/// so the next run can reuse them.
pub struct FileCredentialStore {
    path: PathBuf,
    client: Client,
    cached: Mutex<Option<StoredCredential>>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf, client: Client) -> Self {
        Self {
            path,
            client,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl AuthProvider for FileCredentialStore {
    async fn credential(&self) -> Result<Credential, AuthenticationError> {
        let mut cached = self.cached.lock().await;

        let mut stored = match cached.take() {
            Some(stored) => stored,
            None => StoredCredential::load(&self.path).await?,
        };

        if let Some(access_token) = stored.valid_access_token(Utc::now()) {
            let credential = Credential {
                access_token: access_token.to_string(),
            };
            *cached = Some(stored);
            return Ok(credential);
        }

        tracing::debug!("Access token expired, refreshing");
        let token = refresh_access_token(
            &self.client,
            &stored.token_uri,
            &stored.client_id,
            &stored.client_secret,
            &stored.refresh_token,
        )
        .await?;

        stored.apply_refresh(token, Utc::now());
        let credential = Credential {
            access_token: stored.access_token.clone().unwrap_or_default(),
        };

        // The refreshed token stays usable for this run even if it cannot be persisted
        match stored.save(&self.path).await {
            Ok(()) => tracing::info!("Refreshed access token saved to {}", self.path.display()),
            Err(error) => tracing::warn!("Failed to persist refreshed access token: {}", error),
        }
        *cached = Some(stored);

        Ok(credential)
    }
}
