//! Elapsed-time accounting for the current item

use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock bookkeeping for one activation
///
/// `elapsed = now - started_at - accumulated_pause`, frozen while paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    started_at: Instant,
    accumulated_pause: Duration,
    paused_at: Option<Instant>,
}

impl PlaybackClock {
    /// Start a fresh clock
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            accumulated_pause: Duration::ZERO,
            paused_at: None,
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Total time spent paused, including a pause still in progress
    pub fn accumulated_pause(&self, now: Instant) -> Duration {
        self.accumulated_pause
            + self
                .paused_at
                .map_or(Duration::ZERO, |at| now.saturating_duration_since(at))
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Time the item has actually been on screen and playing
    pub fn elapsed(&self, now: Instant) -> Duration {
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(self.started_at)
            .saturating_sub(self.accumulated_pause)
    }

    /// Freeze elapsed time. Returns false if already paused.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// Unfreeze, folding the paused interval into the pause total.
    /// Returns false if not paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        match self.paused_at.take() {
            Some(at) => {
                self.accumulated_pause += now.saturating_duration_since(at);
                true
            }
            None => false,
        }
    }
}
