//! Domain Value Objects
//!
//! Immutable value types that describe what is synchronized and where.

mod extensions;
mod remote_path;
mod watch_root;

pub use extensions::{AllowedExtensions, DEFAULT_ALLOWED_EXTENSIONS};
pub use remote_path::{to_build_path, to_remote_path, PathMapError};
pub use watch_root::{UploadMode, WatchRoot};
