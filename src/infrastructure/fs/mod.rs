//! File System Implementations
//!
//! - `FsWatcher` - Recursive change notifications normalized to `FsEvent`s
//! - `walk_files` - One-shot recursive listing

mod walk;
mod watcher;

pub use walk::walk_files;
pub use watcher::{translate, FsWatcher};
