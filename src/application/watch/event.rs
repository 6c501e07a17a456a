//! Watch event types and options

use std::path::PathBuf;
use std::time::Duration;

use crate::application::debounce::PREVIEW_DEBOUNCE_MS;
use crate::application::queue::DEFAULT_CONCURRENCY;
use crate::domain::entities::{FsEvent, FsEventKind, TaskOutcome};
use crate::domain::value_objects::{AllowedExtensions, UploadMode, WatchRoot};

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Local tree and remote destination
    pub root: WatchRoot,
    /// Remote account the files belong to
    pub account_id: u64,
    /// Upload everything once before watching
    pub initial_upload: bool,
    /// Compile `fields.js` sources before upload
    pub process_fields: bool,
    /// File that receives one line per finished change
    pub notify_file: Option<PathBuf>,
    /// Maximum concurrent remote operations
    pub concurrency: usize,
    /// Quiet period before a preview URL is shown
    pub preview_debounce: Duration,
    /// Extensions eligible for upload
    pub allowed_extensions: AllowedExtensions,
}

impl WatchOptions {
    /// Create new watch options with minimal required fields
    pub fn new(root: WatchRoot, account_id: u64) -> Self {
        Self {
            root,
            account_id,
            initial_upload: true,
            process_fields: false,
            notify_file: None,
            concurrency: DEFAULT_CONCURRENCY,
            preview_debounce: Duration::from_millis(PREVIEW_DEBOUNCE_MS),
            allowed_extensions: AllowedExtensions::default(),
        }
    }

    pub fn with_initial_upload(mut self, initial_upload: bool) -> Self {
        self.initial_upload = initial_upload;
        self
    }

    pub fn with_process_fields(mut self, process_fields: bool) -> Self {
        self.process_fields = process_fields;
        self
    }

    pub fn with_notify_file(mut self, notify_file: Option<PathBuf>) -> Self {
        self.notify_file = notify_file;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_preview_debounce(mut self, preview_debounce: Duration) -> Self {
        self.preview_debounce = preview_debounce;
        self
    }

    pub fn with_allowed_extensions(mut self, allowed_extensions: AllowedExtensions) -> Self {
        self.allowed_extensions = allowed_extensions;
        self
    }
}

/// What caused a task to be enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCause {
    /// The one-shot upload of the whole tree
    InitialUpload,
    /// A filesystem event
    Fs(FsEventKind),
}

/// A task that finished on a worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedTask {
    pub outcome: TaskOutcome,
    pub cause: TaskCause,
}

/// Messages consumed by the session's control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    /// The watcher reported a change
    Fs(FsEvent),
    /// A queued task finished
    Finished(FinishedTask),
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Watch started
    WatchStarted {
        source: String,
        dest: String,
        mode: UploadMode,
        remove: bool,
    },
    /// Initial upload of the tree started
    InitialUploadStarted { files: usize },
    /// Initial upload of the tree finished
    InitialUploadComplete {
        source: String,
        dest: String,
        uploaded: usize,
        failed: usize,
    },
    /// The filesystem watcher is registered
    WatcherReady { source: String },
    /// File uploaded
    Uploaded {
        local: String,
        remote: String,
        attempts: u8,
    },
    /// File upload failed after its retry
    UploadFailed {
        local: String,
        remote: String,
        account_id: u64,
        attempts: u8,
        error: String,
        status: Option<u16>,
    },
    /// Remote file or folder deleted
    Deleted { local: String, remote: String },
    /// Remote delete failed
    DeleteFailed {
        local: String,
        remote: String,
        account_id: u64,
        error: String,
        status: Option<u16>,
    },
    /// A compilable asset could not be compiled
    CompileFailed {
        local: String,
        remote: String,
        error: String,
    },
    /// Theme preview URL for the latest change
    Preview { url: String },
    /// Error occurred
    Error { message: String },
    /// Watch stopped
    Shutdown,
}

impl WatchEvent {
    /// Convert to JSON string with "command": "watch" field included
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("watch"));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }
}
