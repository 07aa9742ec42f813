//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`stxcom_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input is a timeline: keyboard and serial entries, each due at an offset
//! from the moment the driver was created. Entries are delivered in offset
//! order on the paused tokio clock. Once the timeline is exhausted keyboard
//! input ends, optionally after a final quiet period so pending timers can
//! still fire.

use std::{
    collections::{HashMap, VecDeque},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use bytes::Bytes;
use stxcom_app::{AppEvent, Driver, KeyInput};
use stxcom_core::{Environment, ScriptError, TransportError};
use thiserror::Error;
use tokio::time::Instant;

use crate::SimEnv;

/// Error type for simulation driver.
#[derive(Debug, Clone, Error)]
#[error("SimDriverError: {0}")]
pub struct SimDriverError(pub String);

/// One captured transport write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    /// Offset from driver creation.
    pub at: Duration,
    /// Bytes written.
    pub data: Bytes,
}

#[derive(Debug)]
enum Input {
    Event(AppEvent),
    Serial(Bytes),
}

/// Shared state for input injection and output capture.
#[derive(Debug, Default)]
struct SharedState {
    timeline: VecDeque<(Instant, Input)>,
    end_after: Option<Duration>,
    written: Vec<Written>,
    displayed: Vec<u8>,
    printed: String,
    notices: Vec<String>,
    log: Vec<u8>,
    scripts: HashMap<PathBuf, Vec<u8>>,
    baud: Option<u32>,
    dtr: Option<bool>,
    closed: bool,
    fail_reconfigure: bool,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share state, so a test keeps one clone to inspect output after the
/// runtime consumed the other.
#[derive(Debug, Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    env: SimEnv,
    start: Instant,
}

impl SimDriver {
    /// Create a driver whose timeline starts now.
    pub fn new(env: SimEnv) -> Self {
        let start = env.now();
        Self { state: Arc::new(Mutex::new(SharedState::default())), env, start }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, at: Duration, input: Input) {
        let due = self.start + at;
        let mut state = self.lock();
        let index = state.timeline.partition_point(|(t, _)| *t <= due);
        state.timeline.insert(index, (due, input));
    }

    /// Inject an `AppEvent` due at `at`.
    pub fn inject_event(&self, at: Duration, event: AppEvent) {
        self.push(at, Input::Event(event));
    }

    /// Inject keys due at `at`, in order.
    pub fn inject_keys(&self, at: Duration, keys: &[KeyInput]) {
        for key in keys {
            self.inject_event(at, AppEvent::Key(*key));
        }
    }

    /// Inject serial bytes due at `at`. They are stamped with the
    /// environment's time of day at delivery.
    pub fn inject_serial(&self, at: Duration, bytes: impl Into<Bytes>) {
        self.push(at, Input::Serial(bytes.into()));
    }

    /// Keep keyboard input open until `at`, then end it.
    pub fn end_input_at(&self, at: Duration) {
        self.lock().end_after = Some(at);
    }

    /// Make a script file readable.
    pub fn add_script(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.lock().scripts.insert(path.into(), contents.into());
    }

    /// Make baud and DTR changes fail.
    pub fn fail_reconfigure(&self) {
        self.lock().fail_reconfigure = true;
    }

    /// Captured writes.
    pub fn written(&self) -> Vec<Written> {
        self.lock().written.clone()
    }

    /// Every written byte, concatenated.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.lock().written.iter().flat_map(|w| w.data.to_vec()).collect()
    }

    /// Device output shown on screen.
    pub fn displayed(&self) -> Vec<u8> {
        self.lock().displayed.clone()
    }

    /// Local text printed.
    pub fn printed(&self) -> String {
        self.lock().printed.clone()
    }

    /// Diagnostic lines.
    pub fn notices(&self) -> Vec<String> {
        self.lock().notices.clone()
    }

    /// Record log contents.
    pub fn log(&self) -> Vec<u8> {
        self.lock().log.clone()
    }

    /// Last baud rate applied.
    pub fn baud(&self) -> Option<u32> {
        self.lock().baud
    }

    /// Last DTR level applied.
    pub fn dtr(&self) -> Option<bool> {
        self.lock().dtr
    }

    /// Whether the transport was closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Whether the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Check if there are undelivered inputs.
    pub fn has_pending(&self) -> bool {
        !self.lock().timeline.is_empty()
    }

    fn reconfigure(&self, apply: impl FnOnce(&mut SharedState)) -> Result<(), TransportError> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        if state.fail_reconfigure {
            return Err(TransportError::Reconfigure("simulated failure".to_string()));
        }
        apply(&mut state);
        Ok(())
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let (next_due, end_after) = {
            let state = self.lock();
            (state.timeline.front().map(|(due, _)| *due), state.end_after)
        };

        let Some(due) = next_due else {
            if let Some(end) = end_after {
                tokio::time::sleep_until(self.start + end).await;
            }
            return Ok(None);
        };

        tokio::time::sleep_until(due).await;

        let input = self.lock().timeline.pop_front().map(|(_, input)| input);
        Ok(input.map(|input| match input {
            Input::Event(event) => event,
            Input::Serial(bytes) => AppEvent::SerialData { bytes, clock: self.env.wall_clock() },
        }))
    }

    async fn write_serial(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let at = self.env.now() - self.start;
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.written.push(Written { at, data: Bytes::copy_from_slice(data) });
        Ok(())
    }

    async fn set_baud(&mut self, baud: u32) -> Result<(), TransportError> {
        self.reconfigure(|state| state.baud = Some(baud))
    }

    async fn set_signal(&mut self, level: bool) -> Result<(), TransportError> {
        self.reconfigure(|state| state.dtr = Some(level))
    }

    async fn close_transport(&mut self) {
        self.lock().closed = true;
    }

    async fn read_script(&mut self, path: &Path) -> Result<Vec<u8>, ScriptError> {
        self.lock().scripts.get(path).cloned().ok_or_else(|| ScriptError::Read {
            path: path.to_path_buf(),
            reason: "No such file or directory".to_string(),
        })
    }

    async fn append_log(&mut self, line: &[u8]) -> io::Result<()> {
        self.lock().log.extend_from_slice(line);
        Ok(())
    }

    fn display(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.lock().displayed.extend_from_slice(bytes);
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), Self::Error> {
        self.lock().printed.push_str(text);
        Ok(())
    }

    fn notice(&mut self, line: &str) -> Result<(), Self::Error> {
        tracing::debug!(line, "notice");
        self.lock().notices.push(line.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}
