use reqwest::Client;
use url::Url;

use crate::reddit_rs::types::Listing;

/// Number of posts requested per listing. The listing is read as a single page.
pub const LISTING_LIMIT: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("No feed sources configured")]
    NoSources,
    #[error("Invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Feed unavailable (status {status}): {body}")]
    Unavailable { status: u16, body: String },
    #[error("Failed to parse feed response: {0}")]
    FailedToParseResponse(serde_json::Error),
}

/// Builds `<base>/r/<source1>+<source2>.json?limit=100`
pub fn listing_url(base_url: &Url, sources: &[String]) -> Result<Url, FeedError> {
    if sources.is_empty() {
        return Err(FeedError::NoSources);
    }

    let mut url = base_url.join(&format!("r/{}.json", sources.join("+")))?;
    url.query_pairs_mut()
        .append_pair("limit", &LISTING_LIMIT.to_string());
    Ok(url)
}

pub async fn fetch_listing(
    client: &Client,
    base_url: &Url,
    sources: &[String],
) -> Result<Listing, FeedError> {
    let url = listing_url(base_url, sources)?;
    tracing::debug!("Fetching feed listing from {}", url);

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(FeedError::FailedToSendRequest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Unavailable {
            status: status.as_u16(),
            body: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    let body = response
        .text()
        .await
        .map_err(FeedError::FailedToSendRequest)?;

    serde_json::from_str(&body).map_err(FeedError::FailedToParseResponse)
}
