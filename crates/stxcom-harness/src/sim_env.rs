//! Simulated environment.
//!
//! Monotonic time is tokio's clock, which tests pause with
//! `#[tokio::test(start_paused = true)]` so sleeps complete instantly and in
//! order. The time of day used for record stamps is set explicitly.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use stxcom_core::Environment;
use stxcom_proto::ClockTime;
use tokio::time::Instant;

/// Environment for deterministic tests.
#[derive(Debug, Clone)]
pub struct SimEnv {
    clock: Arc<Mutex<ClockTime>>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new(ClockTime::MIDNIGHT)
    }
}

impl SimEnv {
    /// Create an environment whose time of day reads `clock`.
    pub fn new(clock: ClockTime) -> Self {
        Self { clock: Arc::new(Mutex::new(clock)) }
    }

    /// Change the time of day. Shared by every clone.
    pub fn set_clock(&self, clock: ClockTime) {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner) = clock;
    }
}

impl Environment for SimEnv {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn wall_clock(&self) -> ClockTime {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep_until(&self, deadline: Self::Instant) -> impl Future<Output = ()> + Send {
        tokio::time::sleep_until(deadline)
    }
}
