use crate::error::ConfigError;
use crate::types::Post;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A named predicate over a post, optionally parameterized by a JSON payload.
///
/// Implementations own their configuration shape: the registry and binder
/// hand them raw bytes and never look inside.
pub trait Rule: Send + Sync {
    /// Registry key, stable for the lifetime of the rule
    fn name(&self) -> &str;

    /// Replace the rule's configuration with the decoded `configs` payload.
    ///
    /// Calling this again overwrites the previous configuration.
    fn register_configs(&mut self, configs: &[u8]) -> Result<(), ConfigError>;

    /// Whether `post` satisfies the rule under its current configuration.
    ///
    /// Ambiguous input is a non-match, not an error.
    fn matches(&self, post: &Post) -> bool;
}

/// Shared handle to a registered rule. Configuration goes through the write
/// lock so every holder of the handle observes it.
pub type RuleHandle = Arc<RwLock<dyn Rule>>;

/// Wrap a concrete rule into a shareable handle.
pub fn share<R: Rule + 'static>(rule: R) -> RuleHandle {
    Arc::new(RwLock::new(rule))
}

// A panic inside `matches` poisons the lock; the rule state itself is still
// consistent because matching never writes to it.
pub fn read_rule(handle: &RuleHandle) -> RwLockReadGuard<'_, dyn Rule + 'static> {
    handle.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_rule(handle: &RuleHandle) -> RwLockWriteGuard<'_, dyn Rule + 'static> {
    handle.write().unwrap_or_else(PoisonError::into_inner)
}

pub fn rule_name(handle: &RuleHandle) -> String {
    read_rule(handle).name().to_string()
}
