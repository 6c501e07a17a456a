//! Watch Use Case
//!
//! Keeps a local directory tree synchronized with a remote destination.
//! It orchestrates:
//! - File system monitoring (via `notify` crate)
//! - Extension and ignore filtering
//! - Bounded-concurrency upload/delete with one retry per upload
//! - Debounced preview notification
//!
//! ## Architecture
//!
//! - `WatchSession` - Control loop and task admission
//! - `PreviewNotifier` - Trailing-edge debounced preview side channel
//! - `WatchEvent` - Events emitted during watch operation
//!
//! ## Usage
//!
//! ```ignore
//! let options = WatchOptions::new(root, account_id);
//! let session = WatchSession::new(options, transport)?;
//! session.run(running, |event| { ... })?;
//! ```

mod event;
mod notifier;
mod use_case;


pub use event::{FinishedTask, SessionMessage, TaskCause, WatchEvent, WatchOptions};
pub use notifier::PreviewNotifier;
pub use use_case::{InitialUploadSummary, WatchSession};
