use reqwest::Client;
use url::Url;

use crate::ports::feed::FeedClient;
use crate::reddit_rs::feed::{FeedError, fetch_listing};
use crate::reddit_rs::types::Listing;

pub const REDDIT_BASE_URL: &str = "https://www.reddit.com";

pub struct RedditHttpAdapter {
    client: Client,
    base_url: Url,
}

impl RedditHttpAdapter {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait::async_trait]
impl FeedClient for RedditHttpAdapter {
    async fn fetch(&self, sources: &[String]) -> Result<Listing, FeedError> {
        fetch_listing(&self.client, &self.base_url, sources).await
    }
}
