//! Project Watch Use Case
//!
//! Batches bursts of project file changes into single remote builds.
//!
//! ## Architecture
//!
//! - `ProjectWatchSession` - Control loop, uploads into the staged build, commit
//! - `BuildSession` - Idle / accumulating / building state and the quiet-period timer
//! - `ProjectEvent` - Events emitted during the watch

mod event;
mod session;
mod use_case;


pub use event::{BuildUpload, ProjectEvent, ProjectMessage, ProjectWatchOptions};
pub use session::{BuildPhase, BuildSession};
pub use use_case::ProjectWatchSession;
