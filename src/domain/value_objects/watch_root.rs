//! Watch root value object - binds a local tree to a remote destination
//!
//! Created once per watch invocation and never mutated afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How uploaded files are published remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Changes go live immediately
    #[default]
    Publish,
    /// Changes are buffered as drafts
    Draft,
}

impl UploadMode {
    /// Whether the remote API should buffer the change instead of publishing it
    pub fn is_buffered(&self) -> bool {
        matches!(self, UploadMode::Draft)
    }
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadMode::Publish => write!(f, "publish"),
            UploadMode::Draft => write!(f, "draft"),
        }
    }
}

impl std::str::FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "publish" => Ok(UploadMode::Publish),
            "draft" => Ok(UploadMode::Draft),
            other => Err(format!(
                "invalid mode '{}', expected 'publish' or 'draft'",
                other
            )),
        }
    }
}

/// A local directory tree bound to a remote destination path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRoot {
    local_src: PathBuf,
    remote_dest: String,
    mode: UploadMode,
    remove_enabled: bool,
}

impl WatchRoot {
    /// Create a watch root. Removal of remote files is disabled by default.
    pub fn new(local_src: impl Into<PathBuf>, remote_dest: impl Into<String>) -> Self {
        Self {
            local_src: local_src.into(),
            remote_dest: remote_dest.into(),
            mode: UploadMode::default(),
            remove_enabled: false,
        }
    }

    /// Set the upload mode
    pub fn with_mode(mut self, mode: UploadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable mirroring of local deletions to the remote
    pub fn with_remove(mut self, remove_enabled: bool) -> Self {
        self.remove_enabled = remove_enabled;
        self
    }

    pub fn local_src(&self) -> &Path {
        &self.local_src
    }

    pub fn remote_dest(&self) -> &str {
        &self.remote_dest
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    pub fn remove_enabled(&self) -> bool {
        self.remove_enabled
    }
}
