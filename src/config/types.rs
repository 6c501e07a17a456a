//! Configuration type definitions

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::{BUILD_DEBOUNCE_MS, DEFAULT_CONCURRENCY, PREVIEW_DEBOUNCE_MS};
use crate::domain::ports::PollPolicy;
use crate::domain::value_objects::{AllowedExtensions, DEFAULT_ALLOWED_EXTENSIONS};
use crate::error::SyncResult;
use crate::infrastructure::DEFAULT_IGNORE_FILE;

use super::loader::{self, ConfigWarning};

pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com";
pub const DEFAULT_APP_BASE: &str = "https://app.hubspot.com";

/// Remote account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account (portal) id; required before anything can be synced
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_app_base")]
    pub app_base: String,

    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            id: None,
            api_base: default_api_base(),
            app_base: default_app_base(),
            access_token: None,
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_app_base() -> String {
    DEFAULT_APP_BASE.to_string()
}

/// `watch` command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_preview_debounce_ms")]
    pub preview_debounce_ms: u64,

    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Ignore file looked up at the watch root
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            preview_debounce_ms: default_preview_debounce_ms(),
            allowed_extensions: default_allowed_extensions(),
            ignore_file: default_ignore_file(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_preview_debounce_ms() -> u64 {
    PREVIEW_DEBOUNCE_MS
}

fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn default_ignore_file() -> String {
    DEFAULT_IGNORE_FILE.to_string()
}

/// `project watch` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfigSection {
    /// Quiet period before a staged build is committed
    #[serde(default = "default_build_debounce_ms")]
    pub build_debounce_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

impl Default for ProjectConfigSection {
    fn default() -> Self {
        Self {
            build_debounce_ms: default_build_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
        }
    }
}

fn default_build_debounce_ms() -> u64 {
    BUILD_DEBOUNCE_MS
}

fn default_poll_interval_ms() -> u64 {
    PollPolicy::default().interval.as_millis() as u64
}

fn default_max_polls() -> u32 {
    PollPolicy::default().max_polls
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub project: ProjectConfigSection,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> SyncResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> SyncResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (CMSYNC_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    pub fn allowed_extensions(&self) -> AllowedExtensions {
        AllowedExtensions::new(&self.watch.allowed_extensions)
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.watch.preview_debounce_ms)
    }

    pub fn build_debounce(&self) -> Duration {
        Duration::from_millis(self.project.build_debounce_ms)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.project.poll_interval_ms),
            max_polls: self.project.max_polls,
        }
    }
}
