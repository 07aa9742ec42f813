//! Production environment.
//!
//! Monotonic time comes from the tokio clock; record stamps read the local
//! time of day through `chrono`.

use std::future::Future;

use chrono::Timelike;
use stxcom_core::Environment;
use stxcom_proto::ClockTime;
use tokio::time::Instant;

/// Environment backed by the system clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    #[allow(clippy::disallowed_methods)]
    fn wall_clock(&self) -> ClockTime {
        let time = chrono::Local::now().time();
        // Leap seconds report second 59 with an oversized fraction.
        ClockTime::new(time.hour() as u8, time.minute() as u8, time.second() as u8)
            .unwrap_or_default()
    }

    fn sleep_until(&self, deadline: Self::Instant) -> impl Future<Output = ()> + Send {
        tokio::time::sleep_until(deadline)
    }
}
