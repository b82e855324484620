use crate::youtube_rs::auth::AuthenticationError;

/// Bearer credential for one or more YouTube API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
}

/// Port trait for the credential lifecycle, kept apart from the API calls.
///
/// Implementations live in `services::youtube::credentials` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn credential(&self) -> Result<Credential, AuthenticationError>;
}
