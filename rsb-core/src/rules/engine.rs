use super::rule::{read_rule, RuleHandle};
use crate::types::Post;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// How rule decisions are aggregated into a result.
///
/// The two modes answer different questions and are not interchangeable:
/// `PerRule` is a broad digest (which rule fired, on what), `AllRules` is a
/// strict alert (which posts pass every rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Each rule reports the last post it matched
    #[default]
    PerRule,
    /// A post is reported only when every rule matches it
    AllRules,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::PerRule => write!(f, "per-rule"),
            MatchMode::AllRules => write!(f, "all-rules"),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-rule" | "per_rule" => Ok(MatchMode::PerRule),
            "all-rules" | "all_rules" => Ok(MatchMode::AllRules),
            other => Err(format!(
                "unknown match mode '{other}', expected 'per-rule' or 'all-rules'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// Rule name -> last post that rule matched. Rules that matched nothing are absent.
    PerRule(BTreeMap<String, Post>),
    /// Posts satisfying every rule, in batch order
    AllRules(Vec<Post>),
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match self {
            MatchResult::PerRule(matches) => matches.len(),
            MatchResult::AllRules(posts) => posts.len(),
        }
    }

    /// Matches as `(rule name, post)` pairs; `AllRules` entries carry no rule name.
    pub fn entries(&self) -> Vec<(Option<&str>, &Post)> {
        match self {
            MatchResult::PerRule(matches) => matches
                .iter()
                .map(|(name, post)| (Some(name.as_str()), post))
                .collect(),
            MatchResult::AllRules(posts) => posts.iter().map(|post| (None, post)).collect(),
        }
    }
}

/// Applies a bound rule set to a batch of posts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    mode: MatchMode,
}

impl Matcher {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn apply(&self, rules: &[RuleHandle], posts: &[Post]) -> MatchResult {
        let result = match self.mode {
            MatchMode::PerRule => MatchResult::PerRule(Self::last_match_per_rule(rules, posts)),
            MatchMode::AllRules => MatchResult::AllRules(Self::passing_all_rules(rules, posts)),
        };

        info!(
            mode = %self.mode,
            rules = rules.len(),
            posts = posts.len(),
            matches = result.len(),
            "applied rules"
        );
        result
    }

    fn last_match_per_rule(rules: &[RuleHandle], posts: &[Post]) -> BTreeMap<String, Post> {
        let mut matches = BTreeMap::new();
        for post in posts {
            for handle in rules {
                let rule = read_rule(handle);
                if rule.matches(post) {
                    debug!(rule = rule.name(), post = %post.id, "matched");
                    matches.insert(rule.name().to_string(), post.clone());
                }
            }
        }
        matches
    }

    fn passing_all_rules(rules: &[RuleHandle], posts: &[Post]) -> Vec<Post> {
        posts
            .iter()
            .filter(|post| rules.iter().all(|handle| read_rule(handle).matches(post)))
            .cloned()
            .collect()
    }
}
