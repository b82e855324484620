use crate::youtube_rs::auth::AuthenticationError;

/// A YouTube Data API call that did not produce the expected resource.
#[derive(Debug, thiserror::Error)]
pub enum RemoteRequestError {
    #[error("Invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to authorize request: {0}")]
    Authentication(#[from] AuthenticationError),
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Request rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}
