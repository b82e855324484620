use crate::reddit_rs::feed::FeedError;
use crate::reddit_rs::types::Listing;

/// Port trait for the feed the sync reads candidate links from.
///
/// Implementations live in `services::reddit` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, sources: &[String]) -> Result<Listing, FeedError>;
}
