//! Configuration module for cmsync
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (CMSYNC_*)
//! 3. `cmsync.toml` in the working directory
//! 4. User config (`<config_dir>/cmsync/config.toml`)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{config_candidates, find_config, ConfigWarning, CONFIG_FILE};
pub use types::{
    AccountConfig, Config, ProjectConfigSection, WatchConfig, DEFAULT_API_BASE, DEFAULT_APP_BASE,
};
