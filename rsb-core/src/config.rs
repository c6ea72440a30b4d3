use crate::rules::MatchMode;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const PROG_NAME: &str = "rsb";
pub const DEFAULT_POST_THRESHOLD: usize = 5;
pub const DEFAULT_SENDMAIL_PATH: &str = "/usr/sbin/sendmail";

/// Keys of the older SMTP-based config layout. Reports go through
/// `sendmail_path` now, so these are refused rather than silently ignored.
const SMTP_KEYS: &[&str] = &["smtp_addr", "smtp_port", "password"];

// Default value functions for serde
fn default_post_threshold() -> usize {
    DEFAULT_POST_THRESHOLD
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_sendmail_path() -> String {
    DEFAULT_SENDMAIL_PATH.to_string()
}

fn default_user_agent() -> String {
    format!("{PROG_NAME}/{}", env!("CARGO_PKG_VERSION"))
}

/// The program's configuration file.
///
/// Example:
/// ```json
/// {
///     "sendmail_from": "foo@bar.com",
///     "sendmail_to": "baz@bar.com",
///     "rules": [
///         { "id": "ramunderprice", "configs": { "price": 100 } }
///     ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    #[serde(default)]
    pub sendmail_from: String,
    #[serde(default)]
    pub sendmail_to: String,
    /// Binary that accepts a full message on stdin (`-t -i`)
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,
    /// User agent sent to the listing endpoint
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Number of gathered posts that triggers a report
    #[serde(default = "default_post_threshold")]
    pub post_threshold: usize,
    /// Seconds between listing polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Rules to run, with optional per-rule configuration
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Selects a registered rule and, optionally, overrides its configuration.
///
/// `configs` is opaque here; only the target rule knows its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub id: String,
    #[serde(default)]
    pub configs: serde_json::Map<String, serde_json::Value>,
}

impl RuleConfig {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            configs: serde_json::Map::new(),
        }
    }

    pub fn with_config(mut self, key: &str, value: serde_json::Value) -> Self {
        self.configs.insert(key.to_string(), value);
        self
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            sendmail_from: String::new(),
            sendmail_to: String::new(),
            sendmail_path: default_sendmail_path(),
            user_agent: default_user_agent(),
            post_threshold: DEFAULT_POST_THRESHOLD,
            poll_interval_secs: default_poll_interval_secs(),
            match_mode: MatchMode::default(),
            rules: Vec::new(),
        }
    }
}

impl BotConfig {
    /// Template written when no config file exists yet
    pub fn template() -> Self {
        Self {
            rules: vec![RuleConfig::new("")],
            ..Self::default()
        }
    }

    /// Load config from a JSON or YAML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse a JSON document, or YAML when it is not an object literal
    pub fn parse_str(content: &str) -> Result<Self> {
        let document: serde_json::Value = if content.trim_start().starts_with('{') {
            serde_json::from_str(content)?
        } else {
            serde_yaml::from_str(content)?
        };

        if let Some(fields) = document.as_object() {
            let smtp: Vec<&str> = SMTP_KEYS
                .iter()
                .copied()
                .filter(|key| fields.contains_key(*key))
                .collect();
            if !smtp.is_empty() {
                bail!(
                    "SMTP delivery is not supported (found {}); remove these keys and \
                     set sendmail_path to a sendmail-compatible program",
                    smtp.join(", ")
                );
            }
        }

        Ok(serde_json::from_value(document)?)
    }

    pub fn to_json(&self) -> Result<String> {
        // four spaces rather than serde_json's two
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(out)?)
    }

    /// Write the config as JSON, creating parent directories as needed
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.post_threshold == 0 {
            bail!("post_threshold must be at least 1");
        }
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be at least 1");
        }
        if let Some(pos) = self.rules.iter().position(|rule| rule.id.trim().is_empty()) {
            bail!("rules[{pos}] has an empty id");
        }
        Ok(())
    }

    /// Mail settings are only needed when reports are actually sent
    pub fn validate_mail(&self) -> Result<()> {
        if self.sendmail_from.trim().is_empty() || self.sendmail_to.trim().is_empty() {
            bail!("sendmail_from and sendmail_to must both be set to mail reports");
        }
        Ok(())
    }
}
