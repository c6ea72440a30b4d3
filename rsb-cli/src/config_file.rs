//! Config file location - find, create and read the program's config file
//!
//! The default file lives in the user's config directory
//! (e.g. ~/.config/rsb/rsb.json) and is created from a template on first use.

use anyhow::{anyhow, Context, Result};
use rsb_core::config::{BotConfig, PROG_NAME};
use std::fs;
use std::path::{Path, PathBuf};

/// Manages the program's config file
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// Config file at the default location
    pub fn default_location() -> Result<Self> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    /// Config file at a caller-chosen path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/rsb/rsb.json`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join(PROG_NAME).join(format!("{PROG_NAME}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the template config if no file exists yet.
    /// Returns true when a file was created.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        BotConfig::template()
            .save_to_file(&self.path)
            .with_context(|| format!("Failed to create default config at {}", self.path.display()))?;
        Ok(true)
    }

    /// Raw file contents, for `--export-config`
    pub fn contents(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
    }

    pub fn load(&self) -> Result<BotConfig> {
        let config = BotConfig::load_from_file(&self.path)?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", self.path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_program_file() {
        if let Ok(path) = ConfigFile::default_path() {
            assert!(path.ends_with("rsb/rsb.json"));
        }
    }

    #[test]
    fn ensure_exists_writes_template_once() {
        let dir = std::env::temp_dir().join(format!("rsb_config_file_test_{}", std::process::id()));
        let file = ConfigFile::at(dir.join("rsb.json"));

        assert!(file.ensure_exists().unwrap());
        assert!(!file.ensure_exists().unwrap());
        assert!(file.contents().unwrap().contains("\"rules\""));

        // the template's empty rule id has to be filled in first
        assert!(file.load().is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
