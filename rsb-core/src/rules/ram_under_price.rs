use super::registry::RuleRegistry;
use super::rule::Rule;
use crate::error::ConfigError;
use crate::types::Post;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;
use tracing::debug;

static RAM_IN_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bRAM\b").expect("RAM pattern is valid"));
// Anchored: a title segment is a cost only if the whole segment is one.
// ASCII digits only; `\d` would also accept digits `u64::from_str` rejects.
static COST_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$([0-9]+)(?:\.[0-9]+)?$").expect("cost pattern is valid"));

pub const RAM_UNDER_PRICE: &str = "ramunderprice";
pub const RAM_UNDER_100: &str = "ramunder100";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RamUnderPriceConfig {
    /// Highest dollar amount (inclusive) that still matches
    pub price: u64,
}

/// Matches RAM listings whose single advertised price is at or under a ceiling.
///
/// Titles carrying several prices (MSRP next to a sale price, bundle pricing)
/// are ambiguous and never match.
#[derive(Debug, Clone)]
pub struct RamUnderPriceRule {
    name: &'static str,
    config: RamUnderPriceConfig,
}

impl RamUnderPriceRule {
    /// Ceiling 0 until configured.
    pub fn new() -> Self {
        Self::with_ceiling(RAM_UNDER_PRICE, 0)
    }

    pub fn with_ceiling(name: &'static str, price: u64) -> Self {
        Self {
            name,
            config: RamUnderPriceConfig { price },
        }
    }

    pub fn ceiling(&self) -> u64 {
        self.config.price
    }

    /// Dollar portion of the one cost segment in `title`, if there is exactly one.
    fn single_cost(title: &str) -> Option<&str> {
        let mut costs = title
            .split_whitespace()
            .filter_map(|segment| COST_SEGMENT.captures(segment))
            .filter_map(|caps| caps.get(1));

        let first = costs.next()?;
        if costs.next().is_some() {
            return None;
        }
        Some(first.as_str())
    }
}

impl Default for RamUnderPriceRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for RamUnderPriceRule {
    fn name(&self) -> &str {
        self.name
    }

    fn register_configs(&mut self, configs: &[u8]) -> Result<(), ConfigError> {
        self.config =
            serde_json::from_slice(configs).map_err(|e| ConfigError::new(self.name, e))?;
        debug!(rule = self.name, price = self.config.price, "configured");
        Ok(())
    }

    fn matches(&self, post: &Post) -> bool {
        if !RAM_IN_TITLE.is_match(&post.title) {
            return false;
        }

        let Some(dollars) = Self::single_cost(&post.title) else {
            return false;
        };

        match dollars.parse::<u64>() {
            Ok(cost) => cost <= self.config.price,
            // Still digits, just more of them than any ceiling can hold.
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => false,
            Err(e) => panic!(
                "cost pattern captured {dollars:?} from {:?} but it is not an integer: {e}",
                post.title
            ),
        }
    }
}

pub fn register(registry: &mut RuleRegistry) {
    registry.register(RamUnderPriceRule::new());
    registry.register(RamUnderPriceRule::with_ceiling(RAM_UNDER_100, 100));
}
