//! Error types for the stxcom session core.
//!
//! Each category is reported independently to the operator as a single line.
//! Only [`TransportError::Open`] and [`ConfigError`] are fatal; they stop
//! startup.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors from the serial transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Port could not be opened.
    #[error("cannot open {path}: {reason}")]
    Open {
        /// Device path.
        path: String,
        /// OS-level reason.
        reason: String,
    },

    /// Write failed; the data was discarded.
    #[error("write failed: {0}")]
    Write(String),

    /// Baud rate or signal line change failed; settings unchanged.
    #[error("reconfigure failed: {0}")]
    Reconfigure(String),

    /// Port is closed.
    #[error("serial port is not open")]
    Closed,
}

impl TransportError {
    /// Returns true if this error must stop the program.
    ///
    /// Only a failed open is fatal. Write and reconfigure failures are
    /// reported and the session continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Write(err.to_string())
    }
}

/// Errors that abort a script download.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// No download file has been configured.
    #[error("no download file set")]
    NoFile,

    /// The script file could not be read.
    #[error("cannot read {}: {reason}", path.display())]
    Read {
        /// Script path.
        path: PathBuf,
        /// OS-level reason.
        reason: String,
    },

    /// The script, or the selected part of it, has no lines.
    #[error("script has no lines to send")]
    Empty,
}

/// Invalid startup configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Ready marker is neither one character nor a number of milliseconds.
    #[error("ready marker must be one character or a delay in ms, got {0:?}")]
    ReadyMarker(String),

    /// Re-query delay longer than [`MAX_DELAY`](crate::config::MAX_DELAY).
    #[error("query delay must be at most 3600000 ms, got {0}")]
    QueryInterval(u64),

    /// Unknown parity name.
    #[error("parity must be none, even or odd, got {0:?}")]
    Parity(String),

    /// Unsupported character width.
    #[error("data bits must be 7 or 8, got {0}")]
    DataBits(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_open_failures_are_fatal() {
        assert!(
            TransportError::Open { path: "/dev/ttyUSB0".into(), reason: "busy".into() }.is_fatal()
        );
        assert!(!TransportError::Write("broken pipe".into()).is_fatal());
        assert!(!TransportError::Reconfigure("EINVAL".into()).is_fatal());
        assert!(!TransportError::Closed.is_fatal());
    }

    #[test]
    fn io_errors_become_write_errors() {
        let err: TransportError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert_eq!(err, TransportError::Write("gone".into()));
    }

    #[test]
    fn script_read_error_names_path() {
        let err = ScriptError::Read { path: "boot.fs".into(), reason: "not found".into() };
        assert_eq!(err.to_string(), "cannot read boot.fs: not found");
    }
}
