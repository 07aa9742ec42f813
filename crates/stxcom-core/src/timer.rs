//! Cancellable one-shot timers.
//!
//! A [`TimerSet`] holds scheduled payloads keyed by deadline. Nothing fires on
//! its own: the owner calls [`TimerSet::expire`] with the current time and
//! acts on whatever came due. Drivers use [`TimerSet::next_deadline`] to know
//! how long they may sleep.

use std::collections::BTreeMap;

use crate::env::Timepoint;

/// Handle identifying one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// Set of pending one-shot timers carrying payloads of type `T`.
///
/// # Invariants
///
/// - Expired timers are returned in deadline order; timers sharing a deadline
///   come back in scheduling order.
/// - A cancelled or expired handle never fires again.
#[derive(Debug, Clone)]
pub struct TimerSet<I, T> {
    entries: BTreeMap<(I, TimerHandle), T>,
    next_id: u64,
}

impl<I: Timepoint, T> Default for TimerSet<I, T> {
    fn default() -> Self {
        Self { entries: BTreeMap::new(), next_id: 0 }
    }
}

impl<I: Timepoint, T> TimerSet<I, T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to come due at `deadline`.
    pub fn schedule(&mut self, deadline: I, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline, handle), payload);
        handle
    }

    /// Cancel one timer. Returns its payload if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        let key = self.entries.keys().find(|(_, h)| *h == handle).copied()?;
        self.entries.remove(&key)
    }

    /// Cancel every timer whose payload matches `predicate`. Returns how many
    /// were cancelled.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, payload| !predicate(payload));
        before - self.entries.len()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove and return every timer due at or before `now`.
    pub fn expire(&mut self, now: I) -> Vec<(TimerHandle, T)> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let ((_, handle), payload) = entry.remove_entry();
            due.push((handle, payload));
        }
        due
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<I> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Whether `handle` is still pending.
    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.entries.keys().any(|(_, h)| *h == handle)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending timers in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries.iter().map(|((deadline, _), payload)| (*deadline, payload))
    }
}
