//! Domain Entities
//!
//! - `FsEvent` - A filesystem change reported by the watcher
//! - `SyncTask` - One remote mutation derived from a filesystem event
//! - `BuildId` / `BuildStatus` - Identity and state of a remote project build

mod build;
mod fs_event;
mod sync_task;

pub use build::{BuildId, BuildStatus};
pub use fs_event::{FsEvent, FsEventKind};
pub use sync_task::{SyncTask, TaskKind, TaskOutcome, TaskStatus};
