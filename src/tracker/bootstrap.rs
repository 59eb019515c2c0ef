use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::tracker::tracker::Tracker;

/// One-shot guard: the first caller of `try_begin` wins.
#[derive(Debug, Default)]
pub struct InitGuard {
    started: AtomicBool,
}

impl InitGuard {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
        }
    }

    pub fn try_begin(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

/// Signals that may announce the page is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadySignal {
    ReadyState,
    BodyPresent,
    BodyPoll,
    PollTimeout,
    DomContentLoaded,
}

/// Initializes the tracker exactly once, whichever signal arrives first.
#[derive(Default)]
pub struct Bootstrap {
    guard: InitGuard,
    tracker: OnceLock<Tracker>,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this signal ran initialization.
    pub fn signal_ready(&self, source: ReadySignal, init: impl FnOnce() -> Tracker) -> bool {
        if !self.guard.try_begin() {
            debug!(?source, "ready signal after initialization; ignored");
            return false;
        }
        info!(?source, "running tracker initialization");
        // The guard admits a single caller, so the cell is always empty here.
        let _ = self.tracker.set(init());
        true
    }

    pub fn tracker(&self) -> Option<&Tracker> {
        self.tracker.get()
    }
}
