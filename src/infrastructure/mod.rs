//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Filesystem watching and walking
//! - `transport/` - Remote API clients (HTTP, in-memory)
//! - `ignore_rules` - Gitignore-style ignore rules
//! - `compiler` - `fields.js` compilation
//! - `preview` - Theme preview URLs
//! - `project` - Project configuration discovery
//! - `notify_file` - Change log for external tools

pub mod compiler;
pub mod fs;
pub mod ignore_rules;
pub mod notify_file;
pub mod preview;
pub mod project;
pub mod transport;

// Re-export for convenience
pub use compiler::{is_processable_fields_js, FieldsJsCompiler};
pub use fs::{walk_files, FsWatcher};
pub use ignore_rules::{IgnoreRules, DEFAULT_IGNORE_FILE};
pub use notify_file::ChangeLog;
pub use preview::ThemePreviewResolver;
pub use project::{Project, ProjectConfig, PROJECT_CONFIG_FILE};
pub use transport::{HttpTransport, MockTransport, TransportCall};
