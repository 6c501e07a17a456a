//! Project watch session: the build orchestrator
//!
//! Every qualifying change is uploaded into the current staged build
//! (provisioning one first if needed) and restarts the quiet period. When the
//! quiet period elapses the build is committed: uploads drain, the queue
//! pauses, the build is queued and polled, and on success the queue resumes
//! with no build selected. Build errors are fatal and returned to the caller.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::queue::WorkQueue;
use crate::domain::entities::{BuildId, FsEvent, FsEventKind};
use crate::domain::ports::{IgnoreFilter, NoIgnore, Transport};
use crate::domain::value_objects::to_build_path;
use crate::error::{BuildError, SyncResult};
use crate::infrastructure::fs::FsWatcher;

use super::event::{BuildUpload, ProjectEvent, ProjectMessage, ProjectWatchOptions};
use super::session::{BuildPhase, BuildSession};

/// How often the control loop wakes up to check the running flag
const LOOP_TICK: Duration = Duration::from_millis(50);

pub struct ProjectWatchSession {
    options: ProjectWatchOptions,
    src_dir: PathBuf,
    transport: Arc<dyn Transport>,
    ignore: Arc<dyn IgnoreFilter>,
    queue: WorkQueue,
    session: BuildSession,
    tx: Sender<ProjectMessage>,
    rx: Receiver<ProjectMessage>,
    /// Changes that arrived while a commit was draining uploads
    deferred: VecDeque<FsEvent>,
    in_flight: usize,
    running: Arc<AtomicBool>,
}

impl ProjectWatchSession {
    pub fn new(options: ProjectWatchOptions, transport: Arc<dyn Transport>) -> SyncResult<Self> {
        let src_dir = options
            .src_dir
            .canonicalize()
            .or_else(|_| std::path::absolute(&options.src_dir))
            .unwrap_or_else(|_| options.src_dir.clone());
        let (tx, rx) = channel();

        Ok(Self {
            queue: WorkQueue::new(options.concurrency)?,
            session: BuildSession::new(options.build_debounce),
            src_dir,
            transport,
            ignore: Arc::new(NoIgnore),
            tx,
            rx,
            deferred: VecDeque::new(),
            in_flight: 0,
            running: Arc::new(AtomicBool::new(true)),
            options,
        })
    }

    pub fn with_ignore(mut self, ignore: Arc<dyn IgnoreFilter>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Shutdown flag checked while draining uploads and polling a build
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn phase(&self) -> BuildPhase {
        self.session.phase()
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Absolute source directory being watched
    pub fn src_dir(&self) -> &std::path::Path {
        &self.src_dir
    }

    /// Channel the filesystem watcher feeds
    pub fn sender(&self) -> Sender<ProjectMessage> {
        self.tx.clone()
    }

    /// Run until `running` is cleared or a build error occurs (blocking).
    /// Clearing `running` mid-commit abandons the build and shuts down cleanly.
    pub fn run<F>(mut self, running: Arc<AtomicBool>, on_event: F) -> SyncResult<()>
    where
        F: Fn(ProjectEvent),
    {
        self.running = running;
        on_event(ProjectEvent::WatchStarted {
            project: self.options.project_name.clone(),
            src_dir: self.src_dir.display().to_string(),
        });

        let tx = self.sender();
        let _watcher = FsWatcher::start(&self.src_dir, Arc::clone(&self.ignore), move |e| {
            let _ = tx.send(ProjectMessage::Fs(e));
        })?;

        on_event(ProjectEvent::WatcherReady {
            src_dir: self.src_dir.display().to_string(),
        });

        while self.is_running() {
            let now = Instant::now();
            let timeout = self
                .session
                .time_until_due(now)
                .map_or(LOOP_TICK, |due| due.min(LOOP_TICK));

            let step = match self.rx.recv_timeout(timeout) {
                Ok(message) => self.dispatch(message, Instant::now(), &on_event),
                Err(RecvTimeoutError::Timeout) => Ok(()),
                Err(RecvTimeoutError::Disconnected) => break,
            }
            .and_then(|()| self.tick(Instant::now(), &on_event).map(|_| ()));

            match step {
                Ok(()) => {}
                Err(BuildError::Interrupted { build_id }) => {
                    tracing::debug!("Abandoning build #{} on shutdown", build_id);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        on_event(ProjectEvent::Shutdown);
        Ok(())
    }

    /// Handle one change. Provisioning failures are fatal.
    pub fn handle_fs_event(
        &mut self,
        event: &FsEvent,
        now: Instant,
        on_event: &impl Fn(ProjectEvent),
    ) -> Result<(), BuildError> {
        if !matches!(event.kind, FsEventKind::Add | FsEventKind::Change) {
            return Ok(());
        }
        let path = &event.path;
        if !self.options.allowed_extensions.allows(path) {
            tracing::debug!("Skipping {} due to unsupported extension", path.display());
            return Ok(());
        }
        if self.ignore.should_ignore(path) {
            tracing::debug!("Skipping {} due to an ignore rule", path.display());
            return Ok(());
        }

        let build_id = match self.session.current_build_id() {
            Some(id) => id,
            None => self.provision(on_event)?,
        };
        self.session.touch(now);

        let remote_path = match to_build_path(path, &self.src_dir) {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                return Ok(());
            }
        };
        tracing::debug!(
            "Attempting to upload file \"{}\" to \"{}\"",
            path.display(),
            remote_path
        );

        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        let account_id = self.options.account_id;
        let project = self.options.project_name.clone();
        let local_path = path.clone();

        self.in_flight += 1;
        self.queue.enqueue(move || {
            let error = transport
                .upload_to_build(account_id, &project, build_id, &local_path, &remote_path)
                .err()
                .map(|e| e.to_string());
            let _ = tx.send(ProjectMessage::Uploaded(BuildUpload {
                build_id,
                local_path,
                remote_path,
                error,
            }));
        });
        Ok(())
    }

    /// Commit the build if its quiet period has elapsed
    pub fn tick(
        &mut self,
        now: Instant,
        on_event: &impl Fn(ProjectEvent),
    ) -> Result<Option<BuildId>, BuildError> {
        if self.session.take_due(now) {
            self.commit(on_event)
        } else {
            Ok(None)
        }
    }

    /// Process every upload result already waiting, without blocking
    pub fn drain_completed(
        &mut self,
        on_event: &impl Fn(ProjectEvent),
    ) -> Result<(), BuildError> {
        while let Ok(message) = self.rx.try_recv() {
            self.dispatch(message, Instant::now(), on_event)?;
        }
        Ok(())
    }

    /// Drain uploads, pause, queue the build and poll it to a terminal status.
    ///
    /// Returns the committed build, or `None` when no build was provisioned.
    /// Fails with [`BuildError::Interrupted`] once the running flag clears.
    /// Changes that arrive while uploads drain are handled after the queue
    /// resumes, so they land in the next build.
    pub fn commit(
        &mut self,
        on_event: &impl Fn(ProjectEvent),
    ) -> Result<Option<BuildId>, BuildError> {
        let Some(build_id) = self.session.current_build_id() else {
            return Ok(None);
        };

        self.wait_for_uploads(build_id, on_event)?;
        tracing::debug!("Pausing watcher, attempting to queue build");
        self.queue.pause();

        let account_id = self.options.account_id;
        let project = self.options.project_name.clone();
        self.transport.queue_build(account_id, &project, build_id)?;
        self.session.begin_build();
        on_event(ProjectEvent::BuildQueued { build_id });

        let status = self.transport.poll_build_status(
            account_id,
            &project,
            build_id,
            &self.options.poll,
            &self.running,
        )?;
        if !status.is_success() {
            on_event(ProjectEvent::BuildFailed {
                build_id,
                status: status.to_string(),
            });
            return Err(BuildError::BuildFailed {
                build_id: build_id.0,
                status: status.to_string(),
            });
        }

        tracing::debug!("Build succeeded, resuming watcher");
        self.session.finish();
        self.queue.resume();
        on_event(ProjectEvent::BuildSucceeded { build_id });

        let now = Instant::now();
        while let Some(event) = self.deferred.pop_front() {
            self.handle_fs_event(&event, now, on_event)?;
        }
        Ok(Some(build_id))
    }

    fn provision(&mut self, on_event: &impl Fn(ProjectEvent)) -> Result<BuildId, BuildError> {
        tracing::debug!("Attempting to create a new build");
        let build_id = self
            .transport
            .provision_build(self.options.account_id, &self.options.project_name)?;
        self.session.start(build_id);
        on_event(ProjectEvent::BuildProvisioned { build_id });
        Ok(build_id)
    }

    fn dispatch(
        &mut self,
        message: ProjectMessage,
        now: Instant,
        on_event: &impl Fn(ProjectEvent),
    ) -> Result<(), BuildError> {
        match message {
            ProjectMessage::Fs(event) => self.handle_fs_event(&event, now, on_event),
            ProjectMessage::Uploaded(upload) => {
                self.on_uploaded(upload, on_event);
                Ok(())
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Block until every upload into the current build has been processed.
    /// Changes received meanwhile are deferred.
    fn wait_for_uploads(
        &mut self,
        build_id: BuildId,
        on_event: &impl Fn(ProjectEvent),
    ) -> Result<(), BuildError> {
        while self.in_flight > 0 {
            if !self.is_running() {
                return Err(BuildError::Interrupted {
                    build_id: build_id.0,
                });
            }
            match self.rx.recv_timeout(LOOP_TICK) {
                Ok(ProjectMessage::Uploaded(upload)) => self.on_uploaded(upload, on_event),
                Ok(ProjectMessage::Fs(event)) => self.deferred.push_back(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(())
    }

    fn on_uploaded(&mut self, upload: BuildUpload, on_event: &impl Fn(ProjectEvent)) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let local = upload.local_path.display().to_string();
        match upload.error {
            None => on_event(ProjectEvent::FileUploaded {
                build_id: upload.build_id,
                local,
                remote: upload.remote_path,
            }),
            Some(error) => on_event(ProjectEvent::FileUploadFailed {
                build_id: upload.build_id,
                local,
                remote: upload.remote_path,
                error,
            }),
        }
    }
}
