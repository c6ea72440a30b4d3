use super::registry::RuleRegistry;
use super::rule::{write_rule, RuleHandle};
use crate::config::RuleConfig;
use crate::error::{BindError, ConfigError};
use tracing::{debug, info};

/// Retrieve the rules named in `entries`, registering each entry's custom
/// configuration with its rule when one is given.
///
/// Entries are processed in order and the first failure stops binding. Rules
/// configured before the failure keep their new configuration: handles are
/// shared with the registry, not copies.
pub fn bind(registry: &RuleRegistry, entries: &[RuleConfig]) -> Result<Vec<RuleHandle>, BindError> {
    let mut rules = Vec::with_capacity(entries.len());

    for entry in entries {
        let handle = registry.lookup(&entry.id)?;

        if !entry.configs.is_empty() {
            let payload = serde_json::to_vec(&entry.configs)
                .map_err(|e| ConfigError::new(&entry.id, e))?;
            write_rule(&handle).register_configs(&payload)?;
            debug!(rule = %entry.id, keys = entry.configs.len(), "applied rule configs");
        }

        rules.push(handle);
    }

    info!(count = rules.len(), "bound rules");
    Ok(rules)
}
