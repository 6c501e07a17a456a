//! Error types for cmsync
//!
//! Uses `thiserror` for library errors. Per-file failures (transport, compile)
//! are reported and survived; build errors are fatal to a project watch.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cmsync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// API sub-category reported when another build holds the project lock
pub const PROJECT_LOCKED: &str = "PipelineErrors.PROJECT_LOCKED";

/// API sub-category reported when the project does not exist remotely
pub const MISSING_PROJECT: &str = "PipelineErrors.MISSING_PROJECT";

/// Failure talking to the remote backend.
///
/// Transport errors are retryable; the sync engine retries uploads once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with an error status
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        category: Option<String>,
        sub_category: Option<String>,
        message: String,
    },

    /// The local file could not be read for upload
    #[error("cannot read {path}: {message}")]
    LocalFile { path: PathBuf, message: String },

    /// The response body did not have the expected shape
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// HTTP status, when the API produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// API error sub-category (e.g. `PipelineErrors.PROJECT_LOCKED`)
    pub fn sub_category(&self) -> Option<&str> {
        match self {
            Self::Api { sub_category, .. } => sub_category.as_deref(),
            _ => None,
        }
    }
}

/// Failure provisioning, committing, or polling a project build.
///
/// All variants are fatal for a project watch session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("project {project} is locked, cannot create new build")]
    ProjectLocked { project: String },

    #[error("project {project} does not exist")]
    MissingProject { project: String },

    #[error("failed to provision build for {project}: {source}")]
    Provision {
        project: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to queue build #{build_id} for {project}: {source}")]
    Queue {
        project: String,
        build_id: u64,
        #[source]
        source: TransportError,
    },

    #[error("failed to poll build #{build_id}: {source}")]
    Poll {
        build_id: u64,
        #[source]
        source: TransportError,
    },

    #[error("build #{build_id} finished with status {status}")]
    BuildFailed { build_id: u64, status: String },

    #[error("build #{build_id} did not finish after {polls} status checks")]
    PollTimeout { build_id: u64, polls: u32 },

    /// Shutdown was requested while waiting on the build
    #[error("stopped waiting for build #{build_id}")]
    Interrupted { build_id: u64 },
}

impl BuildError {
    /// Classify a provisioning failure by its API sub-category.
    pub fn from_provision(project: &str, source: TransportError) -> Self {
        match source.sub_category() {
            Some(PROJECT_LOCKED) => Self::ProjectLocked {
                project: project.to_string(),
            },
            Some(MISSING_PROJECT) => Self::MissingProject {
                project: project.to_string(),
            },
            _ => Self::Provision {
                project: project.to_string(),
                source,
            },
        }
    }

    /// Classify a queue failure. A locked project is reported as such even here.
    pub fn from_queue(project: &str, build_id: u64, source: TransportError) -> Self {
        match source.sub_category() {
            Some(PROJECT_LOCKED) => Self::ProjectLocked {
                project: project.to_string(),
            },
            Some(MISSING_PROJECT) => Self::MissingProject {
                project: project.to_string(),
            },
            _ => Self::Queue {
                project: project.to_string(),
                build_id,
                source,
            },
        }
    }
}

/// Failure compiling a source asset into its deployable artifact.
///
/// Aborts only the affected file's task.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("could not start compiler for {file}: {source}")]
    Spawn {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compiling {file} failed: {stderr}")]
    Failed { file: PathBuf, stderr: String },

    #[error("{file} did not produce an artifact")]
    MissingArtifact { file: PathBuf },

    #[error("scratch space error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for session setup and fatal session failures
#[derive(Error, Debug)]
pub enum SyncError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem watcher could not be created or registered
    #[error("watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Invalid project configuration
    #[error("invalid project config in {file}: {message}")]
    InvalidProject { file: PathBuf, message: String },

    /// No project configuration found
    #[error("no {file_name} found in {dir} or any parent directory")]
    ProjectNotFound { file_name: String, dir: PathBuf },

    /// Ignore file could not be parsed
    #[error("invalid ignore pattern in {file}:{line}: {message}")]
    InvalidIgnorePattern {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Fatal build failure
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Transport could not be constructed
    #[error(transparent)]
    Transport(#[from] TransportError),
}
