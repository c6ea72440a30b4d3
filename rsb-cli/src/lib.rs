//! The `rsb` binary's library half: locating the per-user config file.
//! Rules, matching and mail delivery come from `rsb_core`.

pub mod config_file;

pub use config_file::ConfigFile;
pub use rsb_core::*;
