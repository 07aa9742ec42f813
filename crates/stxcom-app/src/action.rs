//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use std::path::PathBuf;

use bytes::Bytes;
use stxcom_core::{Section, SessionAction, WriteKind};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Write bytes to the serial transport.
    Write {
        /// Bytes to send.
        data: Bytes,
        /// What the bytes are, for failure wording and post-write echo.
        kind: WriteKind,
    },

    /// Device output for the screen, unmodified.
    Display(Bytes),

    /// Local echo or menu text.
    Print(String),

    /// One diagnostic line.
    Notice(String),

    /// Append a line to the record log.
    AppendLog(Bytes),

    /// Read a script file and download a section of it.
    LoadScript {
        /// Script file.
        path: PathBuf,
        /// Section to send.
        section: Section,
    },

    /// Change the transport's baud rate.
    SetBaud(u32),

    /// Drive the DTR line.
    SetSignal(bool),

    /// Close the serial transport.
    CloseTransport,

    /// Quit the application.
    Quit,
}

impl From<SessionAction> for AppAction {
    fn from(action: SessionAction) -> Self {
        match action {
            SessionAction::Write { data, kind } => Self::Write { data, kind },
            SessionAction::Display(bytes) => Self::Display(bytes),
            SessionAction::Print(text) => Self::Print(text),
            SessionAction::Notice(line) => Self::Notice(line),
            SessionAction::Log(record) => Self::AppendLog(record.log_line()),
        }
    }
}
