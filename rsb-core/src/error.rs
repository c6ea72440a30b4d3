use thiserror::Error;

/// A rule could not decode or accept its configuration payload.
#[derive(Debug, Error)]
#[error("invalid configuration for rule '{rule}': {source}")]
pub struct ConfigError {
    pub rule: String,
    #[source]
    pub source: serde_json::Error,
}

impl ConfigError {
    pub fn new(rule: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            rule: rule.into(),
            source,
        }
    }
}

/// A rule name has no registered implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the following rule is not known: {name}")]
pub struct NotFoundError {
    pub name: String,
}

impl NotFoundError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Failure while resolving and configuring the rules named in a config document.
#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BindError {
    /// Name of the rule entry that stopped binding.
    pub fn rule_name(&self) -> &str {
        match self {
            BindError::NotFound(err) => &err.name,
            BindError::Config(err) => &err.rule,
        }
    }
}
