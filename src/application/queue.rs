//! Bounded-concurrency work queue
//!
//! A fixed pool of worker threads pulls jobs in FIFO admission order. At most
//! `limit` jobs run at once.
//!
//! `pause()` stops new jobs from starting (running jobs finish), `resume()`
//! lets them start again, and `wait_idle()` blocks until nothing is pending or
//! running.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;

/// Default number of concurrent remote operations
pub const DEFAULT_CONCURRENCY: usize = 10;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Job>,
    running: usize,
    paused: bool,
    shutdown: bool,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.running == 0 && self.pending.is_empty()
    }
}

struct Shared {
    state: Mutex<QueueState>,
    /// Signalled when a job may be started (new job, resume, shutdown)
    work: Condvar,
    /// Signalled when the queue becomes idle
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Jobs run outside the lock; the counters stay consistent after a poison.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle to the result of an enqueued job
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block until the job has run. `None` if the job was discarded or panicked.
    pub fn wait(self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Result if the job already finished
    pub fn try_result(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

/// Bounded-concurrency FIFO executor
pub struct WorkQueue {
    shared: Arc<Shared>,
    limit: usize,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("WorkQueue")
            .field("limit", &self.limit)
            .field("pending", &state.pending.len())
            .field("running", &state.running)
            .field("paused", &state.paused)
            .finish()
    }
}

impl WorkQueue {
    /// Create a queue running at most `limit` jobs at once (minimum 1).
    ///
    /// Fails if a worker thread cannot be spawned; workers already started
    /// are shut down first.
    pub fn new(limit: usize) -> std::io::Result<Self> {
        Self::with_spawner(limit, |i, shared| {
            std::thread::Builder::new()
                .name(format!("cmsync-worker-{}", i))
                .spawn(move || worker_loop(&shared))
        })
    }

    fn with_spawner<S>(limit: usize, mut spawn: S) -> std::io::Result<Self>
    where
        S: FnMut(usize, Arc<Shared>) -> std::io::Result<JoinHandle<()>>,
    {
        let limit = limit.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            work: Condvar::new(),
            idle: Condvar::new(),
        });

        let mut queue = Self {
            shared,
            limit,
            workers: Vec::with_capacity(limit),
        };
        for i in 0..limit {
            // On error `queue` drops here, which stops and joins the started workers.
            let handle = spawn(i, Arc::clone(&queue.shared))?;
            queue.workers.push(handle);
        }
        Ok(queue)
    }

    /// Concurrency limit fixed at construction
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Admit a job. It starts when a slot is free and the queue is not paused.
    pub fn enqueue<F, T>(&self, job: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            let _ = tx.send(job());
        });

        let mut state = self.shared.lock();
        state.pending.push_back(job);
        drop(state);
        self.shared.work.notify_one();

        TaskHandle { rx }
    }

    /// Stop starting new jobs. Running jobs complete.
    pub fn pause(&self) {
        self.shared.lock().paused = true;
    }

    /// Allow jobs to start again
    pub fn resume(&self) {
        self.shared.lock().paused = false;
        self.shared.work.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    /// Number of admitted jobs that have not started
    pub fn size(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Number of jobs currently executing
    pub fn running(&self) -> usize {
        self.shared.lock().running
    }

    pub fn is_idle(&self) -> bool {
        self.shared.lock().is_idle()
    }

    /// Block until no job is pending or running.
    ///
    /// Waiting on a paused queue that still has pending jobs blocks until
    /// someone else calls `resume()`.
    pub fn wait_idle(&self) {
        let mut state = self.shared.lock();
        while !state.is_idle() {
            state = self
                .shared
                .idle
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.pending.clear();
        }
        self.shared.work.notify_all();
        self.shared.idle.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if state.shutdown {
                    return;
                }
                if !state.paused {
                    if let Some(job) = state.pending.pop_front() {
                        state.running += 1;
                        break job;
                    }
                }
                state = shared.work.wait(state).unwrap_or_else(|e| e.into_inner());
            }
        };

        // A panicking job must not leak its running slot.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job));

        let mut state = shared.lock();
        state.running -= 1;
        if state.is_idle() {
            shared.idle.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn runs_jobs_and_returns_results() {
        let queue = WorkQueue::new(2).unwrap();
        let handles: Vec<_> = (0..5).map(|i| queue.enqueue(move || i * 2)).collect();
        let results: Vec<_> = handles.into_iter().filter_map(|h| h.wait()).collect();
        assert_eq!(results, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn never_exceeds_limit() {
        let queue = WorkQueue::new(3).unwrap();
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            queue.enqueue(move || {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                current.fetch_sub(1, Ordering::SeqCst);
            });
        }
        queue.wait_idle();

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(current.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn starts_in_fifo_order_with_single_slot() {
        let queue = WorkQueue::new(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10 {
            let order = Arc::clone(&order);
            queue.enqueue(move || order.lock().unwrap().push(i));
        }
        queue.wait_idle();
        assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn paused_queue_holds_pending_jobs() {
        let queue = WorkQueue::new(2).unwrap();
        queue.pause();
        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            let ran = Arc::clone(&ran);
            queue.enqueue(move || ran.fetch_add(1, Ordering::SeqCst));
        }

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(queue.size(), 4);

        queue.resume();
        queue.wait_idle();
        assert_eq!(ran.load(Ordering::SeqCst), 4);
        assert_eq!(queue.size(), 0);
    }

    #[test]
    fn pause_lets_running_job_finish() {
        let queue = WorkQueue::new(1).unwrap();
        let (started_tx, started_rx) = mpsc::channel();
        let running = queue.enqueue(move || {
            started_tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(30));
            "done"
        });
        started_rx.recv().unwrap();

        queue.pause();
        let pending = queue.enqueue(|| "later");

        assert_eq!(running.wait(), Some("done"));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(pending.try_result(), None);

        queue.resume();
        assert_eq!(pending.wait(), Some("later"));
    }

    #[test]
    fn panicking_job_releases_its_slot() {
        let queue = WorkQueue::new(1).unwrap();
        let failed = queue.enqueue(|| -> u8 { panic!("boom") });
        let ok = queue.enqueue(|| 7u8);
        assert_eq!(failed.wait(), None);
        assert_eq!(ok.wait(), Some(7));
        queue.wait_idle();
        assert_eq!(queue.running(), 0);
    }

    #[test]
    fn wait_idle_on_empty_queue_returns() {
        let queue = WorkQueue::new(DEFAULT_CONCURRENCY).unwrap();
        queue.wait_idle();
        assert!(queue.is_idle());
        assert_eq!(queue.limit(), 10);
    }

    #[test]
    fn failed_worker_spawn_fails_construction() {
        let started = Arc::new(AtomicUsize::new(0));
        let exited = Arc::new(AtomicUsize::new(0));
        let (s, e) = (Arc::clone(&started), Arc::clone(&exited));

        let result = WorkQueue::with_spawner(3, move |i, shared| {
            if i == 2 {
                return Err(std::io::Error::other("thread limit reached"));
            }
            s.fetch_add(1, Ordering::SeqCst);
            let e = Arc::clone(&e);
            std::thread::Builder::new().spawn(move || {
                worker_loop(&shared);
                e.fetch_add(1, Ordering::SeqCst);
            })
        });

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "thread limit reached");
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(exited.load(Ordering::SeqCst), 2);
    }
}
