//! Ready/re-query handshake state.
//!
//! The device signals it can take another line by printing the ready prompt.
//! After each completed record the session may re-query the device; while
//! that query is in flight the device's pass-through output is hidden from
//! the operator until the next prompt arrives.
//!
//! `Pacing` holds only the flag and the handle of the armed re-query timer.
//! The owning [`Session`](crate::Session) schedules and cancels the timer
//! itself.

use std::time::Duration;

use crate::{config::MAX_DELAY, env::Timepoint, timer::TimerHandle};

/// Ready-for-next flag plus re-query arming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    ready_for_next: bool,
    interval: Duration,
    requery: Option<TimerHandle>,
}

impl Pacing {
    /// Start ready, with the given re-query interval (clamped to
    /// [`MAX_DELAY`]).
    pub fn new(interval: Duration) -> Self {
        Self { ready_for_next: true, interval: interval.min(MAX_DELAY), requery: None }
    }

    /// Whether the device has signalled readiness since the last re-query.
    pub fn ready_for_next(&self) -> bool {
        self.ready_for_next
    }

    /// Current re-query interval. Zero disables re-query.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Handle of the armed re-query timer.
    pub fn armed(&self) -> Option<TimerHandle> {
        self.requery
    }

    /// Whether a pass-through byte should reach the display.
    pub fn echo_gate(&self) -> bool {
        self.ready_for_next
    }

    /// Deadline for the re-query following a record completed at `now`, or
    /// `None` when re-query is disabled.
    pub fn requery_deadline<I: Timepoint>(&self, now: I) -> Option<I> {
        (!self.interval.is_zero()).then(|| now + self.interval)
    }

    /// Record a newly scheduled re-query timer. Returns the handle it
    /// replaces, which the caller must cancel.
    pub fn arm(&mut self, handle: TimerHandle) -> Option<TimerHandle> {
        self.requery.replace(handle)
    }

    /// The re-query timer `handle` fired. Returns `false` for a stale handle,
    /// otherwise the query is now in flight.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.requery != Some(handle) {
            return false;
        }
        self.requery = None;
        self.ready_for_next = false;
        true
    }

    /// The ready prompt was observed.
    pub fn mark_ready(&mut self) {
        self.ready_for_next = true;
    }

    /// Replace the interval (clamped to [`MAX_DELAY`]). Returns the armed
    /// handle, if any, which the caller must cancel and may re-arm against
    /// the new interval.
    pub fn set_interval(&mut self, interval: Duration) -> Option<TimerHandle> {
        self.interval = interval.min(MAX_DELAY);
        self.requery.take()
    }

    /// Back to the initial ready state, forgetting any armed timer.
    pub fn reset(&mut self) -> Option<TimerHandle> {
        self.ready_for_next = true;
        self.requery.take()
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
