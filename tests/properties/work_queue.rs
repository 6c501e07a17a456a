//! Property tests for the bounded work queue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use proptest::prelude::*;

use cmsync::WorkQueue;

/// Tracks how many jobs run at once
#[derive(Default)]
struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `running <= limit` at every instant, for any job mix.
    #[test]
    fn property_running_never_exceeds_limit(
        limit in 1usize..6,
        durations in proptest::collection::vec(0u64..4, 1..40),
    ) {
        let queue = WorkQueue::new(limit).unwrap();
        let gauge = Arc::new(Gauge::default());

        let handles: Vec<_> = durations
            .iter()
            .enumerate()
            .map(|(i, &ms)| {
                let gauge = Arc::clone(&gauge);
                queue.enqueue(move || {
                    gauge.enter();
                    thread::sleep(Duration::from_millis(ms));
                    gauge.exit();
                    i
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.wait()).collect();
        queue.wait_idle();

        prop_assert!(gauge.peak.load(Ordering::SeqCst) <= limit);
        prop_assert_eq!(gauge.started.load(Ordering::SeqCst), durations.len());
        // Every job's own result comes back through its handle
        for (i, result) in results.into_iter().enumerate() {
            prop_assert_eq!(result, Some(i));
        }
    }

    /// PROPERTY: After `pause()`, no pending job starts until `resume()`.
    #[test]
    fn property_pause_holds_pending_jobs(
        limit in 1usize..5,
        jobs in 1usize..20,
    ) {
        let queue = WorkQueue::new(limit).unwrap();
        let gauge = Arc::new(Gauge::default());

        queue.pause();
        for _ in 0..jobs {
            let gauge = Arc::clone(&gauge);
            queue.enqueue(move || {
                gauge.enter();
                gauge.exit();
            });
        }
        thread::sleep(Duration::from_millis(5));

        prop_assert_eq!(gauge.started.load(Ordering::SeqCst), 0);
        prop_assert_eq!(queue.size(), jobs);
        prop_assert!(queue.is_paused());

        queue.resume();
        queue.wait_idle();

        prop_assert_eq!(gauge.started.load(Ordering::SeqCst), jobs);
        prop_assert_eq!(queue.size(), 0);
        prop_assert_eq!(queue.running(), 0);
    }
}

/// Jobs already running when the queue pauses still complete.
#[test]
fn running_jobs_finish_after_pause() {
    let queue = WorkQueue::new(2).unwrap();
    let gauge = Arc::new(Gauge::default());

    let running: Vec<_> = (0..2)
        .map(|_| {
            let gauge = Arc::clone(&gauge);
            queue.enqueue(move || {
                gauge.enter();
                thread::sleep(Duration::from_millis(30));
                gauge.exit();
            })
        })
        .collect();
    while gauge.started.load(Ordering::SeqCst) < 2 {
        thread::yield_now();
    }

    queue.pause();
    let gauge_late = Arc::clone(&gauge);
    let late = queue.enqueue(move || gauge_late.enter());

    for handle in running {
        assert_eq!(handle.wait(), Some(()));
    }
    assert_eq!(gauge.started.load(Ordering::SeqCst), 2);
    assert_eq!(queue.size(), 1);

    queue.resume();
    assert_eq!(late.wait(), Some(()));
    assert_eq!(gauge.started.load(Ordering::SeqCst), 3);
}
