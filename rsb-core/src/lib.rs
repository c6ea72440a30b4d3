// rsb core library
//
// Rule registry and matching engine for subreddit posts, plus the pieces the
// bot needs around it: a listing source, a gatherer, reports and mail delivery.

pub mod bot;
pub mod config;
pub mod error;
pub mod gather;
pub mod mail;
pub mod report;
pub mod rules;
pub mod source;
pub mod types;

// Re-export main types for easy use
pub use bot::{PollOutcome, SearchBot};
pub use config::{BotConfig, RuleConfig};
pub use error::{BindError, ConfigError, NotFoundError};
pub use gather::PostGatherer;
pub use mail::{ConsoleMailer, Mailer, SendmailMailer};
pub use report::Report;
pub use rules::{bind, MatchMode, MatchResult, Matcher, Rule, RuleHandle, RuleRegistry};
pub use source::{PostSource, RedditListing, StaticSource};
pub use types::Post;
