use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ports::youtube::PrivacyStatus;
use crate::services::reddit::REDDIT_BASE_URL;
use crate::youtube_rs::playlist::YOUTUBE_API_BASE_URL;

const APP_DIR: &str = "reddit-playlist-sync";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subreddits whose posts are scanned for video links
    pub sources: Vec<String>,
    /// Playlist title prefix, `/r/<sources>` when unset
    pub source_label: Option<String>,
    pub feed_base_url: String,
    pub permalink_base: String,
    pub youtube_api_base_url: String,
    pub privacy_status: PrivacyStatus,
    pub credentials_path: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec!["videos".to_string()],
            source_label: None,
            feed_base_url: REDDIT_BASE_URL.to_string(),
            permalink_base: "https://reddit.com".to_string(),
            youtube_api_base_url: YOUTUBE_API_BASE_URL.to_string(),
            privacy_status: PrivacyStatus::default(),
            credentials_path: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("{}/{}", APP_DIR, env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join(APP_DIR).join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when it
    /// does not exist
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the defaults to the config path unless a file is already there
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or(eyre!("No config directory available"))?;
        if path.exists() {
            tracing::info!("Config already exists at {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    pub fn credentials_path(&self) -> PathBuf {
        match &self.credentials_path {
            Some(path) => self.expand_path(path),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR).join("credentials.json"))
                .unwrap_or_else(|| PathBuf::from(format!("{}-oauth2.json", APP_DIR))),
        }
    }

    pub fn source_label(&self, sources: &[String]) -> String {
        self.source_label
            .clone()
            .unwrap_or_else(|| format!("/r/{}", sources.join("+")))
    }

    pub fn feed_base_url(&self) -> Result<Url> {
        Url::parse(&self.feed_base_url)
            .wrap_err(format!("Invalid feed base url: {}", self.feed_base_url))
    }

    pub fn youtube_api_base_url(&self) -> Result<Url> {
        Url::parse(&self.youtube_api_base_url).wrap_err(format!(
            "Invalid YouTube API base url: {}",
            self.youtube_api_base_url
        ))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
