use crate::config::BotConfig;
use crate::gather::PostGatherer;
use crate::mail::Mailer;
use crate::report::Report;
use crate::rules::{MatchResult, Matcher, RuleHandle};
use crate::source::PostSource;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Posts were queued but the threshold is not met yet
    Gathering { queued: usize },
    /// The threshold was met and a report went out
    Reported { posts: usize, matches: MatchResult },
}

/// Polls a source, gathers posts, applies the bound rules to each full batch
/// and mails a report.
pub struct SearchBot<S, M> {
    subreddit: String,
    from: String,
    to: String,
    poll_interval: Duration,
    source: S,
    mailer: M,
    gatherer: PostGatherer,
    rules: Vec<RuleHandle>,
    matcher: Matcher,
}

impl<S: PostSource, M: Mailer> SearchBot<S, M> {
    pub fn new(config: &BotConfig, subreddit: &str, rules: Vec<RuleHandle>, source: S, mailer: M) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            from: config.sendmail_from.clone(),
            to: config.sendmail_to.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            source,
            mailer,
            gatherer: PostGatherer::new(config.post_threshold),
            rules,
            matcher: Matcher::new(config.match_mode),
        }
    }

    /// Send the start-up message.
    pub fn announce(&mut self) -> Result<()> {
        self.mailer
            .send(&Report::initializing(&self.from, &self.to))
            .context("failed to send the initialization message")
    }

    pub fn poll(&mut self) -> Result<PollOutcome> {
        let posts = self
            .source
            .fetch()
            .with_context(|| format!("polling {} failed", self.source.describe()))?;
        let queued = self.gatherer.extend(posts);
        debug!(queued, total = self.gatherer.queued().len(), "gathered posts");

        if !self.gatherer.at_threshold() {
            return Ok(PollOutcome::Gathering {
                queued: self.gatherer.queued().len(),
            });
        }

        // The batch stays queued until the report is out, so a failed send
        // is retried with the same posts on the next poll.
        let batch = self.gatherer.queued();
        let matches = self.matcher.apply(&self.rules, batch);
        let report = Report::compose(&self.from, &self.to, &self.subreddit, batch, &matches);
        self.mailer.send(&report).context("failed to mail the report")?;

        let posts = self.gatherer.drain().len();
        info!(posts, matches = matches.len(), "reported batch");
        Ok(PollOutcome::Reported { posts, matches })
    }

    /// Poll until a report goes out.
    pub fn run_once(&mut self) -> Result<PollOutcome> {
        loop {
            let outcome = self.poll()?;
            if matches!(outcome, PollOutcome::Reported { .. }) {
                return Ok(outcome);
            }
            std::thread::sleep(self.poll_interval);
        }
    }

    /// Poll forever; only returns on error.
    pub fn run(&mut self) -> Result<()> {
        info!(
            subreddit = %self.subreddit,
            rules = self.rules.len(),
            threshold = self.gatherer.threshold(),
            "watching for posts"
        );
        loop {
            self.poll()?;
            std::thread::sleep(self.poll_interval);
        }
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }
}
