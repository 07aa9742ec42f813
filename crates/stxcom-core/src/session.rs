//! The duplexed I/O core.
//!
//! [`Session`] ties the frame decoder, pacing, script queue and timers
//! together. It is a pure state machine: inbound serial chunks, timer ticks
//! and download requests go in, [`SessionAction`]s come out. The caller owns
//! the transport, the display and the record log.
//!
//! # Inbound byte pipeline
//!
//! ```text
//! byte ──> FrameDecoder ──┬─ Passthrough ──> echo gate ──> Display
//!                         ├─ Completed   ──> Log + arm re-query
//!                         └─ Restarted, Abandoned ──> Notice
//!      └─> ready prompt? ──> mark ready, send next queued line
//! ```
//!
//! The echo gate for a byte is evaluated before that byte's prompt check, so
//! the prompt that ends a query stays hidden.

use std::{fmt, path::PathBuf, time::Duration};

use bytes::{Bytes, BytesMut};
use stxcom_proto::{ClockTime, Decoded, FrameDecoder, Record};

use crate::{
    config::{ReadyMarker, SessionConfig},
    env::Timepoint,
    pacing::Pacing,
    script::{Script, ScriptQueue, Selection, encode_latin1},
    throttle,
    timer::TimerSet,
};

/// What a transport write carries. Lets the runtime word failures and decide
/// on post-write echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteKind {
    /// Forwarded keystroke or menu line-mode character.
    Keystroke,
    /// Prompt-paced script line.
    Line,
    /// Re-query command.
    Requery,
    /// Lone CR that starts a prompt-paced download.
    Trigger,
    /// Throttled script line. `echo` is printed once the write succeeds.
    Throttled {
        /// Text to print after a successful write.
        echo: Option<String>,
    },
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keystroke | Self::Trigger => "char",
            Self::Line => "line",
            Self::Requery => "query",
            Self::Throttled { .. } => "throttle",
        })
    }
}

/// Instruction produced by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Write bytes to the transport.
    Write {
        /// Bytes to send.
        data: Bytes,
        /// What the bytes are.
        kind: WriteKind,
    },
    /// Device output for the operator's screen, unmodified.
    Display(Bytes),
    /// Local echo text.
    Print(String),
    /// One diagnostic line for the operator.
    Notice(String),
    /// Append a completed record to the record log.
    Log(Record),
}

/// Payload of a session timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// Send the re-query command.
    Requery,
    /// Send one throttled line.
    ThrottleLine(String),
}

/// Session state for one serial connection.
#[derive(Debug)]
pub struct Session<I: Timepoint> {
    config: SessionConfig,
    decoder: FrameDecoder,
    pacing: Pacing,
    queue: ScriptQueue,
    timers: TimerSet<I, TimerKind>,
}

impl<I: Timepoint> Session<I> {
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> Self {
        let pacing = Pacing::new(config.query_interval);
        Self {
            config,
            decoder: FrameDecoder::new(),
            pacing,
            queue: ScriptQueue::new(),
            timers: TimerSet::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the device has signalled readiness since the last re-query.
    pub fn ready_for_next(&self) -> bool {
        self.pacing.ready_for_next()
    }

    /// Lines waiting for a ready prompt.
    pub fn queue(&self) -> &ScriptQueue {
        &self.queue
    }

    /// Pending timers in firing order.
    pub fn pending_timers(&self) -> impl Iterator<Item = (I, &TimerKind)> {
        self.timers.pending()
    }

    /// Earliest timer deadline, for the driver's sleep.
    pub fn next_deadline(&self) -> Option<I> {
        self.timers.next_deadline()
    }

    /// Whether a record is being assembled.
    pub fn in_record(&self) -> bool {
        self.decoder.in_record()
    }

    /// Process a chunk of serial input received at wall-clock `clock`.
    pub fn handle_serial(&mut self, bytes: &[u8], clock: ClockTime, now: I) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        let mut display = BytesMut::new();
        let prompt = self.config.ready.prompt();

        for &byte in bytes {
            match self.decoder.push(byte, clock) {
                Decoded::Passthrough(b) => {
                    if self.pacing.echo_gate() {
                        display.extend_from_slice(&[b]);
                    }
                },
                Decoded::Started | Decoded::Buffered => {},
                Decoded::Restarted(err) | Decoded::Abandoned(err) => {
                    flush(&mut display, &mut actions);
                    tracing::warn!(%err, "framing anomaly, partial record dropped");
                    actions.push(SessionAction::Notice(format!("framing: {err}")));
                },
                Decoded::Completed(record) => {
                    flush(&mut display, &mut actions);
                    tracing::debug!(stamp = %record.stamp, len = record.payload.len(), "record complete");
                    actions.push(SessionAction::Log(record));
                    self.arm_requery(now);
                },
            }

            if prompt == Some(byte) {
                flush(&mut display, &mut actions);
                self.on_ready(&mut actions);
            }
        }

        flush(&mut display, &mut actions);
        actions
    }

    /// Fire every timer due at `now`.
    pub fn handle_tick(&mut self, now: I) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        for (handle, kind) in self.timers.expire(now) {
            match kind {
                TimerKind::Requery => {
                    if self.pacing.fire(handle) {
                        tracing::debug!("re-query sent");
                        let command = format!("{}\r", self.config.requery_command);
                        actions.push(SessionAction::Write {
                            data: encode_latin1(&command),
                            kind: WriteKind::Requery,
                        });
                    }
                },
                TimerKind::ThrottleLine(line) => actions.push(self.throttled(line)),
            }
        }
        actions
    }

    /// Start a download of `script`.
    ///
    /// The queue is replaced and timers from an earlier throttled download
    /// are cancelled. Prompt mode sends a lone CR to provoke the first
    /// prompt; throttle mode schedules every line immediately.
    pub fn load_script(&mut self, script: Script, now: I) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        if let Selection::MissingSection(label) = script.selection() {
            tracing::warn!(%label, "section not found");
            actions.push(SessionAction::Notice(format!(
                "section {label:?} not found, sending whole script"
            )));
        }

        let cancelled = self.timers.cancel_where(|kind| matches!(kind, TimerKind::ThrottleLine(_)));
        if cancelled > 0 {
            tracing::debug!(cancelled, "dropped lines of previous download");
        }

        let lines = script.into_lines();
        tracing::info!(lines = lines.len(), mode = %self.config.ready, "download started");
        self.queue.replace(lines);

        match self.config.ready {
            ReadyMarker::Prompt(_) => actions.push(SessionAction::Write {
                data: Bytes::from_static(b"\r"),
                kind: WriteKind::Trigger,
            }),
            ReadyMarker::Throttle(interval) => {
                for (offset, line) in throttle::plan(self.queue.drain(), interval) {
                    if offset.is_zero() {
                        actions.push(self.throttled(line));
                    } else {
                        self.timers.schedule(now + offset, TimerKind::ThrottleLine(line));
                    }
                }
            },
        }

        actions
    }

    /// Change the re-query interval. An armed re-query is cancelled and, if
    /// `interval` is non-zero, re-armed from `now`.
    pub fn set_query_interval(&mut self, interval: Duration, now: I) {
        self.config.query_interval = interval;
        if let Some(handle) = self.pacing.set_interval(interval) {
            self.timers.cancel(handle);
            self.arm_requery(now);
        }
    }

    /// Change the script file used by later downloads.
    pub fn set_download_file(&mut self, path: PathBuf) {
        self.config.download_file = Some(path);
    }

    /// Abandon all pending work: timers, queued lines and any partial record.
    pub fn halt(&mut self) {
        self.timers.clear();
        self.queue.clear();
        self.decoder.reset();
        self.pacing.reset();
    }

    fn arm_requery(&mut self, now: I) {
        let Some(deadline) = self.pacing.requery_deadline(now) else {
            return;
        };
        let handle = self.timers.schedule(deadline, TimerKind::Requery);
        if let Some(previous) = self.pacing.arm(handle) {
            self.timers.cancel(previous);
        }
    }

    fn on_ready(&mut self, actions: &mut Vec<SessionAction>) {
        self.pacing.mark_ready();
        let Some(line) = self.queue.pop() else {
            return;
        };

        if self.config.echo {
            actions.push(SessionAction::Print(line.clone()));
        }
        actions.push(SessionAction::Write {
            data: encode_latin1(&format!("{line}\r")),
            kind: WriteKind::Line,
        });
    }

    fn throttled(&self, line: String) -> SessionAction {
        let data = encode_latin1(&line);
        let echo = self.config.echo.then_some(line);
        SessionAction::Write { data, kind: WriteKind::Throttled { echo } }
    }
}

fn flush(display: &mut BytesMut, actions: &mut Vec<SessionAction>) {
    if !display.is_empty() {
        actions.push(SessionAction::Display(display.split().freeze()));
    }
}
