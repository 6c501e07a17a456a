//! In-memory transport for tests
//!
//! Records every call, can be scripted to fail specific remote paths or build
//! steps, and tracks how many calls were executing at once.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::entities::{BuildId, BuildStatus};
use crate::domain::ports::{Transport, UploadOptions};
use crate::domain::value_objects::UploadMode;
use crate::error::{BuildError, TransportError};

/// A call made against the mock transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Upload {
        local: PathBuf,
        remote: String,
        mode: UploadMode,
        /// File contents at upload time, if readable
        contents: Option<String>,
    },
    Delete {
        remote: String,
    },
    Provision {
        project: String,
    },
    UploadToBuild {
        build_id: BuildId,
        local: PathBuf,
        remote: String,
    },
    Queue {
        build_id: BuildId,
    },
    Status {
        build_id: BuildId,
    },
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<TransportCall>,
    upload_failures: HashMap<String, VecDeque<TransportError>>,
    delete_failures: HashMap<String, TransportError>,
    provision_error: Option<TransportError>,
    queue_error: Option<TransportError>,
    statuses: VecDeque<BuildStatus>,
    next_build: u64,
}

/// Transport double that never touches the network
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
    delay: Duration,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every file operation take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the next `times` uploads to `remote` with a network error
    pub fn fail_upload(&self, remote: &str, times: usize) {
        let mut state = self.lock();
        let failures = state.upload_failures.entry(remote.to_string()).or_default();
        for _ in 0..times {
            failures.push_back(TransportError::Network("connection reset".to_string()));
        }
    }

    /// Fail the next upload to `remote` with `error`
    pub fn fail_upload_with(&self, remote: &str, error: TransportError) {
        self.lock()
            .upload_failures
            .entry(remote.to_string())
            .or_default()
            .push_back(error);
    }

    /// Fail every delete of `remote`
    pub fn fail_delete(&self, remote: &str, error: TransportError) {
        self.lock()
            .delete_failures
            .insert(remote.to_string(), error);
    }

    /// Fail provisioning with an API error carrying `sub_category`
    pub fn fail_provision(&self, sub_category: &str) {
        self.lock().provision_error = Some(api_error(409, sub_category));
    }

    /// Fail queueing with an API error carrying `sub_category`
    pub fn fail_queue(&self, sub_category: &str) {
        self.lock().queue_error = Some(api_error(409, sub_category));
    }

    /// Statuses returned by successive status checks. Once exhausted, builds
    /// report `Success`.
    pub fn script_statuses(&self, statuses: impl IntoIterator<Item = BuildStatus>) {
        self.lock().statuses.extend(statuses);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.lock().calls.clone()
    }

    /// Remote paths of all plain uploads, in call order
    pub fn uploads(&self) -> Vec<String> {
        self.filter_calls(|call| match call {
            TransportCall::Upload { remote, .. } => Some(remote.clone()),
            _ => None,
        })
    }

    /// Remote paths of all deletes, in call order
    pub fn deletes(&self) -> Vec<String> {
        self.filter_calls(|call| match call {
            TransportCall::Delete { remote } => Some(remote.clone()),
            _ => None,
        })
    }

    /// Project-relative paths uploaded into builds, in call order
    pub fn build_uploads(&self) -> Vec<(BuildId, String)> {
        self.filter_calls(|call| match call {
            TransportCall::UploadToBuild {
                build_id, remote, ..
            } => Some((*build_id, remote.clone())),
            _ => None,
        })
    }

    pub fn provision_count(&self) -> usize {
        self.count(|call| matches!(call, TransportCall::Provision { .. }))
    }

    pub fn queue_count(&self) -> usize {
        self.count(|call| matches!(call, TransportCall::Queue { .. }))
    }

    pub fn status_count(&self) -> usize {
        self.count(|call| matches!(call, TransportCall::Status { .. }))
    }

    /// Highest number of file operations observed executing at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn count(&self, pred: impl Fn(&TransportCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn filter_calls<T>(&self, f: impl Fn(&TransportCall) -> Option<T>) -> Vec<T> {
        self.lock().calls.iter().filter_map(f).collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: TransportCall) {
        self.lock().calls.push(call);
    }

    /// Simulate a file operation's latency while tracking concurrency
    fn in_flight<T>(&self, op: impl FnOnce() -> T) -> T {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let result = op();
        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Transport for MockTransport {
    fn upload(
        &self,
        _account_id: u64,
        local_path: &Path,
        remote_path: &str,
        options: &UploadOptions,
    ) -> Result<(), TransportError> {
        self.in_flight(|| {
            self.record(TransportCall::Upload {
                local: local_path.to_path_buf(),
                remote: remote_path.to_string(),
                mode: options.mode,
                contents: std::fs::read_to_string(local_path).ok(),
            });
            let mut state = self.lock();
            match state
                .upload_failures
                .get_mut(remote_path)
                .and_then(VecDeque::pop_front)
            {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }

    fn delete(&self, _account_id: u64, remote_path: &str) -> Result<(), TransportError> {
        self.in_flight(|| {
            self.record(TransportCall::Delete {
                remote: remote_path.to_string(),
            });
            match self.lock().delete_failures.get(remote_path) {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        })
    }

    fn provision_build(&self, _account_id: u64, project: &str) -> Result<BuildId, BuildError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::Provision {
            project: project.to_string(),
        });
        if let Some(error) = state.provision_error.clone() {
            return Err(BuildError::from_provision(project, error));
        }
        state.next_build += 1;
        Ok(BuildId(state.next_build))
    }

    fn upload_to_build(
        &self,
        _account_id: u64,
        _project: &str,
        build_id: BuildId,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<(), TransportError> {
        self.in_flight(|| {
            self.record(TransportCall::UploadToBuild {
                build_id,
                local: local_path.to_path_buf(),
                remote: remote_path.to_string(),
            });
            Ok(())
        })
    }

    fn queue_build(
        &self,
        _account_id: u64,
        project: &str,
        build_id: BuildId,
    ) -> Result<(), BuildError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::Queue { build_id });
        match state.queue_error.clone() {
            Some(error) => Err(BuildError::from_queue(project, build_id.0, error)),
            None => Ok(()),
        }
    }

    fn build_status(
        &self,
        _account_id: u64,
        _project: &str,
        build_id: BuildId,
    ) -> Result<BuildStatus, BuildError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::Status { build_id });
        Ok(state.statuses.pop_front().unwrap_or(BuildStatus::Success))
    }
}

fn api_error(status: u16, sub_category: &str) -> TransportError {
    TransportError::Api {
        status,
        category: Some("BAD_REQUEST".to_string()),
        sub_category: Some(sub_category.to_string()),
        message: sub_category.to_string(),
    }
}
