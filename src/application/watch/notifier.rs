//! Debounced preview notification
//!
//! Every completed upload/delete triggers the notifier with the affected path.
//! It fires once the trigger has been quiet for the debounce window, reports
//! the most recent path, and stays silent if the work queue still has pending
//! tasks at that moment.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::application::debounce::DebounceTimer;

#[derive(Debug, Clone)]
pub struct PreviewNotifier {
    timer: DebounceTimer,
    latest: Option<PathBuf>,
    last_fired: Option<Instant>,
}

impl PreviewNotifier {
    pub fn new(window: Duration) -> Self {
        Self {
            timer: DebounceTimer::new(window),
            latest: None,
            last_fired: None,
        }
    }

    /// Record a completed change, restarting the quiet window
    pub fn trigger(&mut self, path: &Path, now: Instant) {
        self.latest = Some(path.to_path_buf());
        self.timer.reset(now);
    }

    /// Fire if due. Returns the path to preview when the queue is empty.
    pub fn poll(&mut self, now: Instant, pending_tasks: usize) -> Option<PathBuf> {
        if !self.timer.fire(now) {
            return None;
        }
        let latest = self.latest.take();
        if pending_tasks > 0 {
            return None;
        }
        self.last_fired = Some(now);
        latest
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until_due(now)
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.last_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1000);

    #[test]
    fn reports_latest_path_after_quiet_window() {
        let mut notifier = PreviewNotifier::new(WINDOW);
        let start = Instant::now();
        notifier.trigger(Path::new("a.css"), start);
        notifier.trigger(Path::new("b.css"), start + Duration::from_millis(300));

        assert_eq!(notifier.poll(start + Duration::from_millis(1000), 0), None);
        assert_eq!(
            notifier.poll(start + Duration::from_millis(1300), 0),
            Some(PathBuf::from("b.css"))
        );
        assert_eq!(notifier.poll(start + Duration::from_millis(5000), 0), None);
    }

    #[test]
    fn busy_queue_suppresses_notification() {
        let mut notifier = PreviewNotifier::new(WINDOW);
        let start = Instant::now();
        notifier.trigger(Path::new("a.css"), start);

        assert_eq!(notifier.poll(start + WINDOW, 3), None);
        assert_eq!(notifier.last_fired(), None);
        // The suppressed notification is not replayed later.
        assert_eq!(notifier.poll(start + WINDOW * 3, 0), None);
    }

    #[test]
    fn fires_at_most_once_per_window() {
        let mut notifier = PreviewNotifier::new(WINDOW);
        let start = Instant::now();
        let mut fired = Vec::new();
        for step in 0..40u64 {
            let now = start + Duration::from_millis(step * 100);
            if step % 12 == 0 {
                notifier.trigger(Path::new("x.css"), now);
            }
            if notifier.poll(now, 0).is_some() {
                fired.push(now);
            }
        }
        assert_eq!(fired.len(), 3);
        for pair in fired.windows(2) {
            assert!(pair[1] - pair[0] >= WINDOW);
        }
    }
}
