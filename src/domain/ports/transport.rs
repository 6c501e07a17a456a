//! Remote Transport Port
//!
//! Abstracts the remote CMS backend: file upload/delete for watched trees and
//! the staged-build lifecycle for projects. Calls block; callers decide which
//! thread pays for the latency.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::domain::entities::{BuildId, BuildStatus};
use crate::domain::value_objects::UploadMode;
use crate::error::{BuildError, TransportError};

/// Per-upload options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadOptions {
    pub mode: UploadMode,
}

/// Bounds for polling a build until it reaches a terminal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_polls: 900,
        }
    }
}

/// Longest single sleep between checks of the running flag while polling
const POLL_SLICE: Duration = Duration::from_millis(50);

/// Sleep for `total`, waking early once `running` clears. Returns whether the
/// caller should keep going.
fn sleep_while_running(total: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(POLL_SLICE.min(deadline - now));
    }
}

/// Remote backend operations used by the sync engine and build orchestrator
pub trait Transport: Send + Sync {
    /// Upload a local file to a remote path
    fn upload(
        &self,
        account_id: u64,
        local_path: &Path,
        remote_path: &str,
        options: &UploadOptions,
    ) -> Result<(), TransportError>;

    /// Delete a remote file or folder
    fn delete(&self, account_id: u64, remote_path: &str) -> Result<(), TransportError>;

    /// Create a new staged build for a project
    fn provision_build(&self, account_id: u64, project: &str) -> Result<BuildId, BuildError>;

    /// Upload a file into a staged build
    fn upload_to_build(
        &self,
        account_id: u64,
        project: &str,
        build_id: BuildId,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<(), TransportError>;

    /// Commit a staged build so the backend starts building it
    fn queue_build(&self, account_id: u64, project: &str, build_id: BuildId)
        -> Result<(), BuildError>;

    /// Fetch the current status of a build once
    fn build_status(
        &self,
        account_id: u64,
        project: &str,
        build_id: BuildId,
    ) -> Result<BuildStatus, BuildError>;

    /// Poll until the build reaches a terminal status, at most `policy.max_polls` times.
    ///
    /// Gives up with [`BuildError::Interrupted`] as soon as `running` clears.
    fn poll_build_status(
        &self,
        account_id: u64,
        project: &str,
        build_id: BuildId,
        policy: &PollPolicy,
        running: &AtomicBool,
    ) -> Result<BuildStatus, BuildError> {
        for poll in 0..policy.max_polls {
            if !running.load(Ordering::SeqCst) {
                return Err(BuildError::Interrupted {
                    build_id: build_id.0,
                });
            }
            let status = self.build_status(account_id, project, build_id)?;
            tracing::trace!(build = %build_id, %status, poll, "build status");
            if status.is_terminal() {
                return Ok(status);
            }
            if !sleep_while_running(policy.interval, running) {
                return Err(BuildError::Interrupted {
                    build_id: build_id.0,
                });
            }
        }
        Err(BuildError::PollTimeout {
            build_id: build_id.0,
            polls: policy.max_polls,
        })
    }
}
