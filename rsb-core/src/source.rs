//! Post sources
//!
//! A `PostSource` hands the bot whatever posts are new since the previous
//! fetch. `RedditListing` polls a subreddit's `/new` listing over HTTP.

use crate::types::{Listing, Post};
use anyhow::{Context, Result};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info};

/// Produces batches of posts not delivered before.
pub trait PostSource {
    fn fetch(&mut self) -> Result<Vec<Post>>;

    /// Name for logging
    fn describe(&self) -> String;
}

const LISTING_BASE_URL: &str = "https://www.reddit.com";
const LISTING_LIMIT: u32 = 25;
// A few listings' worth of ids is enough to recognise repeats.
const SEEN_CAPACITY: usize = 1000;

/// Remembers the most recent post ids, forgetting the oldest past capacity.
#[derive(Debug, Clone)]
struct SeenIds {
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl SeenIds {
    fn new() -> Self {
        Self {
            order: VecDeque::new(),
            ids: HashSet::new(),
        }
    }

    fn insert(&mut self, id: &str) -> bool {
        if !self.ids.insert(id.to_string()) {
            return false;
        }
        self.order.push_back(id.to_string());
        if self.order.len() > SEEN_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        true
    }
}

/// Polls `https://www.reddit.com/r/<subreddit>/new.json`.
pub struct RedditListing {
    subreddit: String,
    base_url: String,
    agent: ureq::Agent,
    seen: SeenIds,
    skip_backlog: bool,
    primed: bool,
}

impl RedditListing {
    pub fn new(subreddit: &str, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build();

        Self {
            subreddit: subreddit.trim_start_matches("r/").to_string(),
            base_url: LISTING_BASE_URL.to_string(),
            agent,
            seen: SeenIds::new(),
            skip_backlog: true,
            primed: false,
        }
    }

    /// Point at a different host (mirrors, local test servers)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Whether posts already listed on the first fetch are delivered.
    /// By default only posts made after start-up are.
    pub fn include_backlog(mut self, include: bool) -> Self {
        self.skip_backlog = !include;
        self
    }

    pub fn listing_url(&self) -> String {
        format!("{}/r/{}/new.json", self.base_url, self.subreddit)
    }

    /// Turn a decoded listing into the posts not seen before, oldest first.
    pub fn accept(&mut self, listing: Listing) -> Result<Vec<Post>> {
        let mut posts = listing
            .into_posts()
            .context("listing contained a malformed post")?;
        // The listing is newest first.
        posts.reverse();

        let fresh: Vec<Post> = posts
            .into_iter()
            .filter(|post| self.seen.insert(&post.id))
            .collect();

        if !self.primed {
            self.primed = true;
            if self.skip_backlog {
                debug!(skipped = fresh.len(), "primed with existing posts");
                return Ok(Vec::new());
            }
        }
        Ok(fresh)
    }
}

impl PostSource for RedditListing {
    fn fetch(&mut self) -> Result<Vec<Post>> {
        let url = self.listing_url();
        let listing: Listing = self
            .agent
            .get(&url)
            .query("limit", &LISTING_LIMIT.to_string())
            .query("raw_json", "1")
            .call()
            .with_context(|| format!("failed to fetch {url}"))?
            .into_json()
            .with_context(|| format!("failed to decode listing from {url}"))?;

        let posts = self.accept(listing)?;
        info!(subreddit = %self.subreddit, new_posts = posts.len(), "polled listing");
        Ok(posts)
    }

    fn describe(&self) -> String {
        format!("r/{}", self.subreddit)
    }
}

/// Serves pre-loaded batches, one per fetch. Useful for replaying saved
/// listings and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    batches: VecDeque<Vec<Post>>,
}

impl StaticSource {
    pub fn new(batches: Vec<Vec<Post>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

impl PostSource for StaticSource {
    fn fetch(&mut self) -> Result<Vec<Post>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
