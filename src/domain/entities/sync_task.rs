//! SyncTask entity
//!
//! A task is created per filesystem event that passes the filters and is owned
//! by the work queue slot executing it. Its outcome travels back to the
//! control thread as a `TaskOutcome`.

use std::path::PathBuf;

use serde::Serialize;

/// Kind of remote mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Upload,
    Delete,
}

/// One discrete remote mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    pub kind: TaskKind,
    /// Local file the event was about
    pub local_path: PathBuf,
    /// Remote destination (forward slashes)
    pub remote_path: String,
    /// 0 for the first try, 1 for the single retry
    pub attempt: u8,
}

impl SyncTask {
    pub fn upload(local_path: impl Into<PathBuf>, remote_path: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Upload,
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            attempt: 0,
        }
    }

    pub fn delete(local_path: impl Into<PathBuf>, remote_path: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Delete,
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            attempt: 0,
        }
    }

    /// The same task, marked as its retry
    pub fn retry(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

/// Terminal state of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Succeeded after `attempts` transport calls
    Succeeded { attempts: u8 },
    /// Failed after `attempts` transport calls
    Failed {
        attempts: u8,
        error: String,
        status: Option<u16>,
    },
    /// The artifact could not be produced; nothing was sent
    CompileFailed { error: String },
}

/// Result of running a task, reported back to the control thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub kind: TaskKind,
    pub local_path: PathBuf,
    pub remote_path: String,
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TaskStatus::Succeeded { .. })
    }
}
