use serde::Deserialize;

/// Root of a reddit listing response (`/r/<sources>.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
    #[serde(default)]
    pub after: Option<String>,
}

/// A listing child. The payload stays loose until [`Listing::entries`] types it.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    #[serde(default)]
    pub kind: Option<String>,
    pub data: serde_json::Value,
}

/// The fields of a post the sync cares about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedEntry {
    pub domain: String,
    pub url: String,
    pub title: String,
    pub permalink: String,
}

impl Listing {
    /// Typed entries in document order. Children missing one of the
    /// [`FeedEntry`] fields are skipped.
    pub fn entries(&self) -> Vec<FeedEntry> {
        self.data
            .children
            .iter()
            .filter_map(
                |child| match serde_json::from_value::<FeedEntry>(child.data.clone()) {
                    Ok(entry) => Some(entry),
                    Err(error) => {
                        tracing::debug!(
                            kind = ?child.kind,
                            "Skipping feed child that is not a link post: {}",
                            error
                        );
                        None
                    }
                },
            )
            .collect()
    }
}
