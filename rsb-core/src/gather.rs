use crate::types::Post;
use std::collections::HashSet;
use tracing::debug;

/// Accumulates polled posts until there are enough to report on.
///
/// Stickied posts stay at the top of a subreddit and come back on every
/// poll, so each one is queued only the first time it shows up.
#[derive(Debug, Clone)]
pub struct PostGatherer {
    threshold: usize,
    queue: Vec<Post>,
    seen_stickies: HashSet<String>,
}

impl PostGatherer {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            queue: Vec::new(),
            seen_stickies: HashSet::new(),
        }
    }

    /// Queue `post` unless it is a stickied post already queued once.
    /// Returns whether it was queued.
    pub fn offer(&mut self, post: Post) -> bool {
        if post.stickied && !self.seen_stickies.insert(post.id.clone()) {
            debug!(post = %post.id, "skipping repeated sticky post");
            return false;
        }
        self.queue.push(post);
        true
    }

    pub fn extend<I: IntoIterator<Item = Post>>(&mut self, posts: I) -> usize {
        let mut queued = 0;
        for post in posts {
            if self.offer(post) {
                queued += 1;
            }
        }
        queued
    }

    pub fn at_threshold(&self) -> bool {
        self.queue.len() >= self.threshold
    }

    pub fn queued(&self) -> &[Post] {
        &self.queue
    }

    /// Take the queued posts, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Post> {
        std::mem::take(&mut self.queue)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}
