//! Filesystem change events
//!
//! The watcher normalizes platform notifications into these four kinds.
//! Directory creation is not reported; files inside a new directory are.

use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FsEventKind {
    /// A file appeared
    Add,
    /// A file's content changed
    Change,
    /// A file was removed
    Unlink,
    /// A directory was removed
    UnlinkDir,
}

impl FsEventKind {
    /// Verb used in change notifications
    pub fn action(&self) -> &'static str {
        match self {
            FsEventKind::Add => "Added",
            FsEventKind::Change => "Changed",
            FsEventKind::Unlink | FsEventKind::UnlinkDir => "Removed",
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, FsEventKind::Unlink | FsEventKind::UnlinkDir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub path: PathBuf,
}

impl FsEvent {
    pub fn new(kind: FsEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn add(path: impl Into<PathBuf>) -> Self {
        Self::new(FsEventKind::Add, path)
    }

    pub fn change(path: impl Into<PathBuf>) -> Self {
        Self::new(FsEventKind::Change, path)
    }

    pub fn unlink(path: impl Into<PathBuf>) -> Self {
        Self::new(FsEventKind::Unlink, path)
    }

    pub fn unlink_dir(path: impl Into<PathBuf>) -> Self {
        Self::new(FsEventKind::UnlinkDir, path)
    }
}
