//! Debounced redraw scheduling.
//!
//! DESIGN
//! ======
//! Every view mutation requests a redraw, but a drag can produce dozens of
//! mutations per frame. The scheduler keeps at most one pending redraw: a new
//! request while one is pending restarts the delay and merges the level,
//! so a burst collapses into one repaint that fires `lag` after the last
//! request (debounce, not throttle).
//!
//! The scheduler owns no timer. Hosts either poll it on their event-loop
//! tick or arm a one-shot timer at [`RedrawScheduler::next_deadline`]. All
//! methods have an `_at` variant taking the current instant so tests can
//! drive time explicitly.

#[cfg(test)]
#[path = "redraw_test.rs"]
mod redraw_test;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::consts::DEFAULT_REDRAW_LAG_MS;

/// How much of the pipeline a repaint must redo. Ordered from most to least
/// work, so merging two requests keeps the smaller value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedrawLevel {
    /// Reload and re-transform everything.
    Full,
    /// Recompute cut levels, then recolor and overlay.
    Recut,
    /// Reapply the color map, then overlay.
    Recolor,
    /// Redraw canvas objects only.
    Overlay,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    level: RedrawLevel,
    deadline: Instant,
    requests: u32,
}

#[derive(Debug, Clone)]
pub struct RedrawScheduler {
    lag: Duration,
    pending: Option<Pending>,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_REDRAW_LAG_MS))
    }
}

impl RedrawScheduler {
    #[must_use]
    pub fn new(lag: Duration) -> Self {
        Self { lag, pending: None }
    }

    #[must_use]
    pub fn lag(&self) -> Duration {
        self.lag
    }

    /// Change the delay. A pending redraw keeps its current deadline.
    pub fn set_lag(&mut self, lag: Duration) {
        self.lag = lag;
    }

    pub fn request(&mut self, level: RedrawLevel) {
        self.request_at(level, Instant::now());
    }

    /// Request a redraw at `level`, (re)starting the delay from `now`.
    pub fn request_at(&mut self, level: RedrawLevel, now: Instant) {
        let deadline = now + self.lag;
        match &mut self.pending {
            Some(pending) => {
                pending.level = pending.level.min(level);
                pending.deadline = deadline;
                pending.requests = pending.requests.saturating_add(1);
                trace!(level = ?pending.level, coalesced = pending.requests, "redraw: request coalesced");
            }
            None => {
                self.pending = Some(Pending { level, deadline, requests: 1 });
                trace!(?level, "redraw: scheduled");
            }
        }
    }

    pub fn poll(&mut self) -> Option<RedrawLevel> {
        self.poll_at(Instant::now())
    }

    /// Take the pending redraw if its delay has elapsed by `now`.
    pub fn poll_at(&mut self, now: Instant) -> Option<RedrawLevel> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;
        trace!(level = ?pending.level, requests = pending.requests, "redraw: fired");
        Some(pending.level)
    }

    /// When the pending redraw becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    #[must_use]
    pub fn pending_level(&self) -> Option<RedrawLevel> {
        self.pending.map(|p| p.level)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending redraw, returning its level.
    pub fn cancel(&mut self) -> Option<RedrawLevel> {
        self.pending.take().map(|p| p.level)
    }
}
