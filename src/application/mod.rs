//! Application Layer
//!
//! Use cases that orchestrate the sync flow.
//! This layer:
//! - Depends on Domain layer (entities, value objects, ports)
//! - Owns concurrency: the work queue, debounce timers, control loops
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `WatchSession` - Mirrors a local tree onto a remote destination
//! - `ProjectWatchSession` - Batches project changes into remote builds
//!
//! ## Building blocks
//!
//! - `WorkQueue` - Bounded-concurrency FIFO executor with pause/resume
//! - `DebounceTimer` - Trailing-edge quiet-period timer

pub mod debounce;
pub mod project_watch;
pub mod queue;
pub mod watch;

pub use debounce::{DebounceTimer, BUILD_DEBOUNCE_MS, PREVIEW_DEBOUNCE_MS};
pub use project_watch::{
    BuildPhase, BuildSession, ProjectEvent, ProjectWatchOptions, ProjectWatchSession,
};
pub use queue::{TaskHandle, WorkQueue, DEFAULT_CONCURRENCY};
pub use watch::{InitialUploadSummary, WatchEvent, WatchOptions, WatchSession};
