//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - The keyboard and the serial line, delivered by the driver.
//! - Timer expiry, raised by the runtime.
//! - Completions of actions the runtime executed (script reads, transport
//!   reconfiguration).

use bytes::Bytes;
use stxcom_core::{ScriptError, Section};
use stxcom_proto::ClockTime;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Chunk of serial input.
    SerialData {
        /// Received bytes.
        bytes: Bytes,
        /// Local time of day at receipt.
        clock: ClockTime,
    },

    /// A timer deadline passed.
    Tick,

    /// Script file read for a download.
    ScriptLoaded {
        /// Script text.
        text: String,
        /// Section requested.
        section: Section,
    },

    /// Script file could not be read.
    ScriptFailed(ScriptError),

    /// Transport now runs at this baud rate.
    BaudChanged(u32),

    /// DTR now at this level.
    SignalChanged(bool),

    /// Transport opened.
    TransportOpened {
        /// Device path.
        path: String,
        /// Baud rate.
        baud: u32,
    },

    /// Transport closed.
    TransportClosed,

    /// Non-fatal I/O failure to report, such as a failed serial read.
    Error {
        /// Error description.
        message: String,
    },
}
