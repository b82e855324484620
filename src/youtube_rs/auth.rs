use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("No credentials found at {}, run `authorize` first", path.display())]
    MissingCredentials { path: PathBuf },
    #[error("Failed to read credential file {}: {source}", path.display())]
    FailedToRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid credential file {}: {source}", path.display())]
    InvalidCredentialFile {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to persist credentials to {}: {source}", path.display())]
    FailedToPersist {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Token request rejected: {reason}")]
    Rejected { reason: String },
    #[error("Token response did not include a refresh token")]
    MissingRefreshToken,
    #[error("Authorization response did not include a code")]
    MissingAuthorizationCode,
    #[error("Authorization state mismatch")]
    StateMismatch,
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Google OAuth token endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

/// Credential file contents, kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Unix timestamp (seconds) at which `access_token` stops being valid
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl StoredCredential {
    pub fn from_token_response(
        token: TokenResponse,
        client_id: String,
        client_secret: String,
        token_uri: String,
        now: DateTime<Utc>,
    ) -> Result<Self, AuthenticationError> {
        let refresh_token = token
            .refresh_token
            .ok_or(AuthenticationError::MissingRefreshToken)?;

        Ok(Self {
            client_id,
            client_secret,
            refresh_token,
            access_token: Some(token.access_token),
            expires_at: now.timestamp() + token.expires_in,
            token_uri,
        })
    }

    pub fn valid_access_token(&self, now: DateTime<Utc>) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|_| now.timestamp() + EXPIRY_SKEW_SECS < self.expires_at)
    }

    /// Google may rotate the refresh token; keep the old one when it does not.
    pub fn apply_refresh(&mut self, token: TokenResponse, now: DateTime<Utc>) {
        self.access_token = Some(token.access_token);
        self.expires_at = now.timestamp() + token.expires_in;
        if let Some(refresh_token) = token.refresh_token {
            self.refresh_token = refresh_token;
        }
    }

    pub async fn load(path: &Path) -> Result<Self, AuthenticationError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthenticationError::MissingCredentials {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(AuthenticationError::FailedToRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| {
            AuthenticationError::InvalidCredentialFile {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub async fn save(&self, path: &Path) -> Result<(), AuthenticationError> {
        let persist_error = |source: std::io::Error| AuthenticationError::FailedToPersist {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(persist_error)?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|error| persist_error(std::io::Error::other(error)))?;
        tokio::fs::write(path, contents)
            .await
            .map_err(persist_error)
    }
}

/* ---------- Installed-app authorization (PKCE) ---------- */

#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub auth_url: String,
    pub state: String,
}

#[derive(Debug, Clone)]
pub struct OAuthSession {
    pub code_verifier: String,
    pub state: String,
}

/// Generate a cryptographically secure random string for PKCE
fn generate_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            const CHARSET: &[u8] =
                b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
            CHARSET[rng.random_range(0..CHARSET.len())] as char
        })
        .collect()
}

/// Generate PKCE code verifier (43-128 characters)
fn generate_code_verifier() -> String {
    generate_random_string(128)
}

/// Generate PKCE code challenge from verifier using S256 method
fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let hash = hasher.finalize();
    URL_SAFE_NO_PAD.encode(hash)
}

fn generate_state() -> String {
    generate_random_string(16)
}

/// Builds the consent URL for the YouTube scope and the session needed to
/// finish the exchange.
pub fn initiate_oauth(client_id: &str, redirect_uri: &str) -> (AuthorizationRequest, OAuthSession) {
    let code_verifier = generate_code_verifier();
    let state = generate_state();

    let auth_url = format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&state={}&scope={}&access_type=offline&prompt=consent&code_challenge={}&code_challenge_method=S256",
        GOOGLE_AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&state),
        urlencoding::encode(YOUTUBE_SCOPE),
        generate_code_challenge(&code_verifier),
    );

    (
        AuthorizationRequest {
            auth_url,
            state: state.clone(),
        },
        OAuthSession {
            code_verifier,
            state,
        },
    )
}

/// Accepts either the bare code or the full URL the browser was redirected to.
pub fn parse_authorization_code(
    input: &str,
    expected_state: &str,
) -> Result<String, AuthenticationError> {
    let input = input.trim();

    if let Ok(url) = Url::parse(input) {
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        if let Some(state) = params.get("state")
            && state != expected_state
        {
            return Err(AuthenticationError::StateMismatch);
        }
        return params
            .get("code")
            .filter(|code| !code.is_empty())
            .cloned()
            .ok_or(AuthenticationError::MissingAuthorizationCode);
    }

    if input.is_empty() {
        return Err(AuthenticationError::MissingAuthorizationCode);
    }
    Ok(input.to_string())
}

async fn request_token(
    client: &Client,
    token_url: &str,
    params: &HashMap<&str, &str>,
) -> Result<TokenResponse, AuthenticationError> {
    let response = client
        .post(token_url)
        .form(params)
        .send()
        .await
        .map_err(AuthenticationError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(AuthenticationError::Rejected {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json()
        .await
        .map_err(AuthenticationError::FailedToParseResponse)
}

/// Exchange authorization code for access and refresh tokens
pub async fn exchange_code_for_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    code_verifier: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, AuthenticationError> {
    let mut params = HashMap::new();
    params.insert("grant_type", "authorization_code");
    params.insert("code", code);
    params.insert("code_verifier", code_verifier);
    params.insert("redirect_uri", redirect_uri);
    params.insert("client_id", client_id);
    params.insert("client_secret", client_secret);

    request_token(client, token_url, &params).await
}

/// Refresh an access token using a refresh token
pub async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, AuthenticationError> {
    let mut params = HashMap::new();
    params.insert("grant_type", "refresh_token");
    params.insert("refresh_token", refresh_token);
    params.insert("client_id", client_id);
    params.insert("client_secret", client_secret);

    request_token(client, token_url, &params).await
}
