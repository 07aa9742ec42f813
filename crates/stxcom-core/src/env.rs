//! Environment abstraction for deterministic testing.
//!
//! Decouples session logic from the system clock. Production drivers use the
//! tokio clock and the local wall clock; simulation uses a paused tokio clock
//! and a settable time of day.

use std::{
    fmt::Debug,
    future::Future,
    ops::{Add, Sub},
    time::Duration,
};

use stxcom_proto::ClockTime;

/// Monotonic instant usable as a timer deadline.
///
/// Implemented for any type with the required arithmetic, which covers
/// `std::time::Instant` and `tokio::time::Instant`.
pub trait Timepoint:
    Copy + Ord + Send + Sync + Debug + Add<Duration, Output = Self> + Sub<Output = Duration>
{
}

impl<T> Timepoint for T where
    T: Copy + Ord + Send + Sync + Debug + Add<Duration, Output = T> + Sub<Output = Duration>
{
}

/// Abstract environment providing time and async sleeping.
///
/// # Invariants
///
/// - `now()` never goes backwards.
/// - `wall_clock()` reports local time of day, used only for record stamps.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Monotonic instant type.
    type Instant: Timepoint;

    /// Current monotonic time.
    fn now(&self) -> Self::Instant;

    /// Current local time of day.
    fn wall_clock(&self) -> ClockTime;

    /// Sleep until `deadline`.
    ///
    /// Only driver code awaits this; state machines take time as input.
    fn sleep_until(&self, deadline: Self::Instant) -> impl Future<Output = ()> + Send;
}
