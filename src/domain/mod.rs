//! Domain Layer
//!
//! Pure types and interfaces for synchronizing a local tree with a remote CMS.
//!
//! ## Structure
//!
//! - `entities/` - Units of work with a lifecycle (SyncTask, build identity/status)
//! - `value_objects/` - Immutable value types (WatchRoot, UploadMode, remote paths)
//! - `ports/` - Interfaces for the remote backend, ignore rules, compiler, preview URLs
//!
//! Nothing in this layer touches the network, and only the ports' implementations
//! touch the file system.

pub mod entities;
pub mod ports;
pub mod value_objects;
