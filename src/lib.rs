//! cmsync - keep a local directory in sync with a remote CMS
//!
//! Two watch modes share one engine core:
//! - `watch` mirrors a local tree onto a remote destination, uploading on
//!   add/change and (optionally) deleting on unlink, through a bounded work
//!   queue with one retry per upload.
//! - `project watch` uploads changes into a staged remote build and commits the
//!   build once changes go quiet, pausing uploads until it finishes.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    ProjectEvent, ProjectWatchOptions, ProjectWatchSession, WatchEvent, WatchOptions,
    WatchSession, WorkQueue,
};
pub use config::Config;
pub use domain::entities::{BuildId, BuildStatus, FsEvent, FsEventKind};
pub use domain::ports::{IgnoreFilter, Transport};
pub use domain::value_objects::{UploadMode, WatchRoot};
pub use error::{BuildError, CompileError, SyncError, SyncResult, TransportError};
