use super::ram_under_price;
use super::rule::{rule_name, share, Rule, RuleHandle};
use crate::error::NotFoundError;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Rules keyed by their name.
///
/// Built once at start-up and passed by reference to whatever needs it, so
/// tests get a fresh registry each time. Registering a name twice replaces
/// the earlier rule.
#[derive(Default)]
pub struct RuleRegistry {
    rules: HashMap<String, RuleHandle>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every rule that ships with the crate.
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        ram_under_price::register(&mut registry);
        debug!(rules = ?registry.names(), "registered builtin rules");
        registry
    }

    /// Register a rule for inclusion in the registry, returning its handle.
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> RuleHandle {
        self.register_handle(share(rule))
    }

    pub fn register_handle(&mut self, handle: RuleHandle) -> RuleHandle {
        let name = rule_name(&handle);
        if self.rules.insert(name.clone(), handle.clone()).is_some() {
            warn!(rule = %name, "rule registered twice, keeping the latest");
        }
        handle
    }

    pub fn lookup(&self, name: &str) -> Result<RuleHandle, NotFoundError> {
        self.rules
            .get(name)
            .cloned()
            .ok_or_else(|| NotFoundError::new(name))
    }

    /// Resolve `names` in order, stopping at the first unknown one.
    pub fn lookup_many<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<RuleHandle>, NotFoundError> {
        names.iter().map(|name| self.lookup(name.as_ref())).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
