//! Project watch event types and options

use std::path::PathBuf;
use std::time::Duration;

use crate::application::debounce::BUILD_DEBOUNCE_MS;
use crate::application::queue::DEFAULT_CONCURRENCY;
use crate::domain::entities::{BuildId, FsEvent};
use crate::domain::ports::PollPolicy;
use crate::domain::value_objects::AllowedExtensions;

/// Project watch options
#[derive(Debug, Clone)]
pub struct ProjectWatchOptions {
    /// Remote account owning the project
    pub account_id: u64,
    /// Project name as known to the backend
    pub project_name: String,
    /// Directory whose files make up a build
    pub src_dir: PathBuf,
    /// Maximum concurrent uploads into a build
    pub concurrency: usize,
    /// Quiet period before a build is committed
    pub build_debounce: Duration,
    /// How build status is polled after commit
    pub poll: PollPolicy,
    /// Extensions eligible for upload
    pub allowed_extensions: AllowedExtensions,
}

impl ProjectWatchOptions {
    pub fn new(account_id: u64, project_name: impl Into<String>, src_dir: impl Into<PathBuf>) -> Self {
        Self {
            account_id,
            project_name: project_name.into(),
            src_dir: src_dir.into(),
            concurrency: DEFAULT_CONCURRENCY,
            build_debounce: Duration::from_millis(BUILD_DEBOUNCE_MS),
            poll: PollPolicy::default(),
            allowed_extensions: AllowedExtensions::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_build_debounce(mut self, build_debounce: Duration) -> Self {
        self.build_debounce = build_debounce;
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_allowed_extensions(mut self, allowed_extensions: AllowedExtensions) -> Self {
        self.allowed_extensions = allowed_extensions;
        self
    }
}

/// Result of uploading one file into a staged build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildUpload {
    pub build_id: BuildId,
    pub local_path: PathBuf,
    pub remote_path: String,
    pub error: Option<String>,
}

/// Messages consumed by the project session's control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectMessage {
    /// The watcher reported a change
    Fs(FsEvent),
    /// An upload into the build finished
    Uploaded(BuildUpload),
}

/// Project watch events for NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProjectEvent {
    /// Project watch started
    WatchStarted { project: String, src_dir: String },
    /// The filesystem watcher is registered
    WatcherReady { src_dir: String },
    /// A new staged build was created
    BuildProvisioned { build_id: BuildId },
    /// File uploaded into the staged build
    FileUploaded {
        build_id: BuildId,
        local: String,
        remote: String,
    },
    /// File could not be uploaded into the staged build
    FileUploadFailed {
        build_id: BuildId,
        local: String,
        remote: String,
        error: String,
    },
    /// The staged build was committed and is building
    BuildQueued { build_id: BuildId },
    /// The build finished successfully and uploads resumed
    BuildSucceeded { build_id: BuildId },
    /// The build finished with a non-success status
    BuildFailed { build_id: BuildId, status: String },
    /// Error occurred
    Error { message: String },
    /// Watch stopped
    Shutdown,
}

impl ProjectEvent {
    /// Convert to JSON string with "command": "project_watch" field included
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("project_watch"));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }
}
