//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the sync core.
//! Infrastructure layer provides concrete implementations; tests provide fakes.

pub mod compiler;
pub mod ignore_filter;
pub mod preview;
pub mod transport;

pub use compiler::{AssetCompiler, CompiledArtifact, NoCompiler};
pub use ignore_filter::{IgnoreFilter, NoIgnore};
pub use preview::{NoPreview, PreviewUrlResolver};
pub use transport::{PollPolicy, Transport, UploadOptions};
