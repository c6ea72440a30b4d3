use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single subreddit submission as delivered by the listing endpoint.
///
/// Rules only ever see a shared reference to a post, so the record is
/// effectively immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
    /// Seconds since the epoch, as a float (Reddit's wire format)
    #[serde(default)]
    pub created_utc: f64,
}

impl Post {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            author: String::new(),
            url: String::new(),
            stickied: false,
            permalink: String::new(),
            subreddit: String::new(),
            created_utc: 0.0,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn stickied(mut self) -> Self {
        self.stickied = true;
        self
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc as i64, 0)
    }
}

// ===== LISTING WIRE FORMAT =====
// `GET /r/<name>/new.json` answers with a Listing whose children are `t3` things.

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    pub children: Vec<Thing>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: serde_json::Value,
}

/// Kind prefix Reddit uses for link submissions
pub const LINK_KIND: &str = "t3";

impl Listing {
    /// Decode the link submissions in this listing, skipping any other thing kinds.
    pub fn into_posts(self) -> serde_json::Result<Vec<Post>> {
        self.data
            .children
            .into_iter()
            .filter(|thing| thing.kind == LINK_KIND)
            .map(|thing| serde_json::from_value(thing.data))
            .collect()
    }
}
