//! Build session state
//!
//! `current_build_id` and `build_in_progress` partition time into three
//! phases. Only the control thread mutates this struct.

use std::time::{Duration, Instant};

use crate::application::debounce::DebounceTimer;
use crate::domain::entities::BuildId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// No build provisioned
    Idle,
    /// A build is provisioned and collecting uploads
    Accumulating(BuildId),
    /// The build was committed and is being polled
    Building(BuildId),
}

#[derive(Debug, Clone)]
pub struct BuildSession {
    current_build_id: Option<BuildId>,
    build_in_progress: bool,
    timer: DebounceTimer,
}

impl BuildSession {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            current_build_id: None,
            build_in_progress: false,
            timer: DebounceTimer::new(quiet_period),
        }
    }

    pub fn phase(&self) -> BuildPhase {
        match (self.current_build_id, self.build_in_progress) {
            (None, _) => BuildPhase::Idle,
            (Some(id), false) => BuildPhase::Accumulating(id),
            (Some(id), true) => BuildPhase::Building(id),
        }
    }

    pub fn current_build_id(&self) -> Option<BuildId> {
        self.current_build_id
    }

    pub fn is_building(&self) -> bool {
        self.build_in_progress
    }

    /// Record a freshly provisioned build
    pub fn start(&mut self, build_id: BuildId) {
        self.current_build_id = Some(build_id);
        self.build_in_progress = false;
    }

    /// Restart the quiet period. Has no effect while a build is in progress.
    pub fn touch(&mut self, now: Instant) {
        if !self.build_in_progress {
            self.timer.reset(now);
        }
    }

    /// Whether the quiet period elapsed; disarms the timer when it did
    pub fn take_due(&mut self, now: Instant) -> bool {
        self.current_build_id.is_some() && self.timer.fire(now)
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until_due(now)
    }

    /// The build was committed
    pub fn begin_build(&mut self) {
        self.timer.cancel();
        self.build_in_progress = true;
    }

    /// The build succeeded; the next change provisions a new one
    pub fn finish(&mut self) {
        self.current_build_id = None;
        self.build_in_progress = false;
        self.timer.cancel();
    }
}
