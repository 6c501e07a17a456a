//! Watch session: the sync engine
//!
//! Filesystem events are filtered, mapped to remote paths, and turned into
//! upload/delete tasks on a bounded work queue. Workers send each finished
//! task back over the session channel, so logging, preview notification, and
//! change-log writes all happen on the control thread.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::queue::WorkQueue;
use crate::domain::entities::{FsEvent, FsEventKind, SyncTask, TaskKind, TaskOutcome, TaskStatus};
use crate::domain::ports::{
    AssetCompiler, IgnoreFilter, NoCompiler, NoIgnore, NoPreview, PreviewUrlResolver, Transport,
    UploadOptions,
};
use crate::domain::value_objects::{to_remote_path, WatchRoot};
use crate::error::SyncResult;
use crate::infrastructure::fs::{walk_files, FsWatcher};
use crate::infrastructure::notify_file::ChangeLog;

use super::event::{FinishedTask, SessionMessage, TaskCause, WatchEvent, WatchOptions};
use super::notifier::PreviewNotifier;

/// How often the control loop wakes up to check the running flag
const LOOP_TICK: Duration = Duration::from_millis(50);

/// Counts reported when the initial upload finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitialUploadSummary {
    pub uploaded: usize,
    pub failed: usize,
}

/// One watched root synchronized with the remote file system
pub struct WatchSession {
    options: WatchOptions,
    root: WatchRoot,
    transport: Arc<dyn Transport>,
    ignore: Arc<dyn IgnoreFilter>,
    compiler: Arc<dyn AssetCompiler>,
    preview: Arc<dyn PreviewUrlResolver>,
    queue: WorkQueue,
    notifier: PreviewNotifier,
    change_log: Option<ChangeLog>,
    tx: Sender<SessionMessage>,
    rx: Receiver<SessionMessage>,
    in_flight: usize,
    running: Arc<AtomicBool>,
}

impl WatchSession {
    /// Create a session. The watch root is made absolute so it matches the
    /// paths reported by the platform watcher.
    pub fn new(options: WatchOptions, transport: Arc<dyn Transport>) -> SyncResult<Self> {
        let local_src = options.root.local_src();
        let absolute = local_src
            .canonicalize()
            .or_else(|_| std::path::absolute(local_src))
            .unwrap_or_else(|_| local_src.to_path_buf());
        let root = WatchRoot::new(absolute, options.root.remote_dest())
            .with_mode(options.root.mode())
            .with_remove(options.root.remove_enabled());

        let (tx, rx) = channel();
        let change_log = options.notify_file.as_deref().map(ChangeLog::new);

        Ok(Self {
            queue: WorkQueue::new(options.concurrency)?,
            notifier: PreviewNotifier::new(options.preview_debounce),
            root,
            transport,
            ignore: Arc::new(NoIgnore),
            compiler: Arc::new(NoCompiler),
            preview: Arc::new(NoPreview),
            change_log,
            tx,
            rx,
            in_flight: 0,
            running: Arc::new(AtomicBool::new(true)),
            options,
        })
    }

    pub fn with_ignore(mut self, ignore: Arc<dyn IgnoreFilter>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn AssetCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_preview(mut self, preview: Arc<dyn PreviewUrlResolver>) -> Self {
        self.preview = preview;
        self
    }

    /// Flag whose clearing stops the session, including a running initial upload
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// The watch root with its absolute local path
    pub fn root(&self) -> &WatchRoot {
        &self.root
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Tasks enqueued whose outcome has not been processed yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Channel the filesystem watcher feeds
    pub fn sender(&self) -> Sender<SessionMessage> {
        self.tx.clone()
    }

    /// Run the session until `running` is cleared (blocking).
    ///
    /// The watcher is registered before the initial upload, so changes made
    /// while it runs are queued behind it instead of being lost.
    pub fn run<F>(mut self, running: Arc<AtomicBool>, on_event: F) -> SyncResult<()>
    where
        F: Fn(WatchEvent),
    {
        self.running = running;
        on_event(WatchEvent::WatchStarted {
            source: self.root.local_src().display().to_string(),
            dest: self.root.remote_dest().to_string(),
            mode: self.root.mode(),
            remove: self.root.remove_enabled(),
        });

        let tx = self.sender();
        let _watcher = FsWatcher::start(
            self.root.local_src(),
            Arc::clone(&self.ignore),
            move |e| {
                let _ = tx.send(SessionMessage::Fs(e));
            },
        )?;

        if self.options.initial_upload {
            self.initial_upload(&on_event)?;
        }

        on_event(WatchEvent::WatcherReady {
            source: self.root.local_src().display().to_string(),
        });

        while self.is_running() {
            let now = Instant::now();
            let timeout = self
                .notifier
                .time_until_due(now)
                .map_or(LOOP_TICK, |due| due.min(LOOP_TICK));

            match self.rx.recv_timeout(timeout) {
                Ok(message) => {
                    self.dispatch(message, &on_event);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.tick(Instant::now(), &on_event);
        }

        on_event(WatchEvent::Shutdown);
        Ok(())
    }

    /// Upload every eligible file under the root once and wait for the results.
    ///
    /// Individual failures are reported and counted; they never abort the watch.
    /// Returns early with partial counts when the running flag is cleared.
    pub fn initial_upload(
        &mut self,
        on_event: &impl Fn(WatchEvent),
    ) -> SyncResult<InitialUploadSummary> {
        let files = walk_files(self.root.local_src())?;
        let mut expected = 0;
        let mut summary = InitialUploadSummary::default();

        on_event(WatchEvent::InitialUploadStarted { files: files.len() });
        for file in files {
            if self.enqueue_upload(&file, TaskCause::InitialUpload).is_some() {
                expected += 1;
            }
        }

        let mut finished = 0;
        while finished < expected {
            if !self.is_running() {
                tracing::debug!(
                    "Initial upload interrupted with {} of {} files finished",
                    finished,
                    expected
                );
                break;
            }
            let message = match self.rx.recv_timeout(LOOP_TICK) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            if let Some(task) = self.dispatch(message, on_event) {
                if task.cause == TaskCause::InitialUpload {
                    finished += 1;
                    if task.outcome.is_success() {
                        summary.uploaded += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
            }
        }

        on_event(WatchEvent::InitialUploadComplete {
            source: self.root.local_src().display().to_string(),
            dest: self.root.remote_dest().to_string(),
            uploaded: summary.uploaded,
            failed: summary.failed,
        });
        Ok(summary)
    }

    /// Turn a filesystem event into a task. Returns the task if one was enqueued.
    pub fn handle_fs_event(&mut self, event: &FsEvent) -> Option<SyncTask> {
        match event.kind {
            FsEventKind::Add | FsEventKind::Change => {
                self.enqueue_upload(&event.path, TaskCause::Fs(event.kind))
            }
            FsEventKind::Unlink | FsEventKind::UnlinkDir => {
                if self.root.remove_enabled() {
                    self.enqueue_delete(&event.path, event.kind)
                } else {
                    None
                }
            }
        }
    }

    /// Process every message already waiting, without blocking
    pub fn drain_completed(&mut self, on_event: &impl Fn(WatchEvent)) {
        while let Ok(message) = self.rx.try_recv() {
            self.dispatch(message, on_event);
        }
    }

    /// Block until every enqueued task has finished and been processed
    pub fn wait_for_tasks(&mut self, on_event: &impl Fn(WatchEvent)) {
        while self.in_flight > 0 {
            let Ok(message) = self.rx.recv() else {
                break;
            };
            self.dispatch(message, on_event);
        }
    }

    /// Fire the preview notification if its quiet window has elapsed
    pub fn tick(&mut self, now: Instant, on_event: &impl Fn(WatchEvent)) {
        if let Some(path) = self.notifier.poll(now, self.queue.size()) {
            if let Some(url) = self.preview.resolve(&path, self.options.account_id) {
                on_event(WatchEvent::Preview { url });
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn dispatch(
        &mut self,
        message: SessionMessage,
        on_event: &impl Fn(WatchEvent),
    ) -> Option<FinishedTask> {
        match message {
            SessionMessage::Fs(event) => {
                self.handle_fs_event(&event);
                None
            }
            SessionMessage::Finished(task) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.on_finished(&task, on_event);
                Some(task)
            }
        }
    }

    fn on_finished(&mut self, task: &FinishedTask, on_event: &impl Fn(WatchEvent)) {
        let outcome = &task.outcome;
        let from_fs = matches!(task.cause, TaskCause::Fs(_));
        let local = outcome.local_path.display().to_string();
        let remote = outcome.remote_path.clone();

        match (&outcome.kind, &outcome.status) {
            (TaskKind::Upload, TaskStatus::Succeeded { attempts }) => {
                on_event(WatchEvent::Uploaded {
                    local,
                    remote,
                    attempts: *attempts,
                });
                if from_fs {
                    self.notifier.trigger(&outcome.local_path, Instant::now());
                }
            }
            (TaskKind::Upload, TaskStatus::Failed { attempts, error, status }) => {
                on_event(WatchEvent::UploadFailed {
                    local,
                    remote,
                    account_id: self.options.account_id,
                    attempts: *attempts,
                    error: error.clone(),
                    status: *status,
                });
            }
            (TaskKind::Delete, TaskStatus::Succeeded { .. }) => {
                on_event(WatchEvent::Deleted { local, remote });
                if from_fs {
                    self.notifier.trigger(&outcome.local_path, Instant::now());
                }
            }
            (TaskKind::Delete, TaskStatus::Failed { error, status, .. }) => {
                on_event(WatchEvent::DeleteFailed {
                    local,
                    remote,
                    account_id: self.options.account_id,
                    error: error.clone(),
                    status: *status,
                });
            }
            (_, TaskStatus::CompileFailed { error }) => {
                on_event(WatchEvent::CompileFailed {
                    local,
                    remote,
                    error: error.clone(),
                });
            }
        }

        if let (Some(log), TaskCause::Fs(kind)) = (&self.change_log, task.cause) {
            log.record(kind.action(), &outcome.local_path);
        }
    }

    fn enqueue_upload(&mut self, path: &Path, cause: TaskCause) -> Option<SyncTask> {
        if !self.options.allowed_extensions.allows(path) {
            tracing::debug!("Skipping {} due to unsupported extension", path.display());
            return None;
        }
        if self.ignore.should_ignore(path) {
            tracing::debug!("Skipping {} due to an ignore rule", path.display());
            return None;
        }

        let compile = self.options.process_fields && self.compiler.is_compilable(path);
        let mut remote = self.map_path(path)?;
        if compile {
            remote = replace_file_name(&remote, &self.compiler.artifact_name(path));
        }

        let task = SyncTask::upload(path, remote);
        tracing::debug!(
            "Attempting to upload file \"{}\" to \"{}\"",
            path.display(),
            task.remote_path
        );

        let transport = Arc::clone(&self.transport);
        let compiler = compile.then(|| Arc::clone(&self.compiler));
        let tx = self.tx.clone();
        let account_id = self.options.account_id;
        let options = UploadOptions {
            mode: self.root.mode(),
        };
        let job_task = task.clone();

        self.in_flight += 1;
        self.queue.enqueue(move || {
            let outcome = run_upload(
                transport.as_ref(),
                compiler.as_deref(),
                account_id,
                job_task,
                &options,
            );
            let _ = tx.send(SessionMessage::Finished(FinishedTask { outcome, cause }));
        });
        Some(task)
    }

    fn enqueue_delete(&mut self, path: &Path, kind: FsEventKind) -> Option<SyncTask> {
        if kind == FsEventKind::Unlink
            && self.options.process_fields
            && self.compiler.is_compilable(path)
        {
            tracing::debug!(
                "Skipping delete of {}; its compiled artifact is managed separately",
                path.display()
            );
            return None;
        }
        if self.ignore.should_ignore(path) {
            tracing::debug!("Skipping {} due to an ignore rule", path.display());
            return None;
        }

        let remote = self.map_path(path)?;
        let task = SyncTask::delete(path, remote);
        tracing::debug!(
            "Attempting to delete {} \"{}\"",
            if kind == FsEventKind::UnlinkDir { "folder" } else { "file" },
            task.remote_path
        );

        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        let account_id = self.options.account_id;
        let job_task = task.clone();

        self.in_flight += 1;
        self.queue.enqueue(move || {
            let outcome = run_delete(transport.as_ref(), account_id, job_task);
            let _ = tx.send(SessionMessage::Finished(FinishedTask {
                outcome,
                cause: TaskCause::Fs(kind),
            }));
        });
        Some(task)
    }

    fn map_path(&self, path: &Path) -> Option<String> {
        match to_remote_path(path, &self.root) {
            Ok(remote) => Some(remote),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Upload with exactly one immediate retry. The compiled artifact (and its
/// scratch directory) is dropped when this returns, on every path.
fn run_upload(
    transport: &dyn Transport,
    compiler: Option<&dyn AssetCompiler>,
    account_id: u64,
    task: SyncTask,
    options: &UploadOptions,
) -> TaskOutcome {
    let artifact = match compiler.map(|c| c.compile(&task.local_path)).transpose() {
        Ok(artifact) => artifact,
        Err(e) => {
            return outcome(&task, TaskStatus::CompileFailed {
                error: e.to_string(),
            });
        }
    };
    let file: PathBuf = artifact
        .as_ref()
        .map(|a| a.path().to_path_buf())
        .unwrap_or_else(|| task.local_path.clone());

    if transport
        .upload(account_id, &file, &task.remote_path, options)
        .is_ok()
    {
        return outcome(&task, TaskStatus::Succeeded { attempts: 1 });
    }

    tracing::debug!(
        "Uploading file {} to {} failed; retrying",
        task.local_path.display(),
        task.remote_path
    );
    let retry = task.retry();
    let status = match transport.upload(account_id, &file, &retry.remote_path, options) {
        Ok(()) => TaskStatus::Succeeded { attempts: 2 },
        Err(e) => TaskStatus::Failed {
            attempts: 2,
            status: e.status(),
            error: e.to_string(),
        },
    };
    outcome(&retry, status)
}

/// Delete without retry
fn run_delete(transport: &dyn Transport, account_id: u64, task: SyncTask) -> TaskOutcome {
    let status = match transport.delete(account_id, &task.remote_path) {
        Ok(()) => TaskStatus::Succeeded { attempts: 1 },
        Err(e) => TaskStatus::Failed {
            attempts: 1,
            status: e.status(),
            error: e.to_string(),
        },
    };
    outcome(&task, status)
}

fn outcome(task: &SyncTask, status: TaskStatus) -> TaskOutcome {
    TaskOutcome {
        kind: task.kind,
        local_path: task.local_path.clone(),
        remote_path: task.remote_path.clone(),
        status,
    }
}

fn replace_file_name(remote: &str, file_name: &str) -> String {
    match remote.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, file_name),
        None => file_name.to_string(),
    }
}
