//! Protocol error types.

use thiserror::Error;

/// Convenience alias for results carrying a [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised by the framing and encoding layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// STX arrived while a record was still open.
    ///
    /// The decoder recovers by discarding the partial payload and starting a
    /// new record. The error value describes what was lost.
    #[error("start marker inside open record: discarded {discarded} buffered bytes")]
    UnexpectedStart {
        /// Number of payload bytes dropped.
        discarded: usize,
    },

    /// An open record outgrew the decoder's limit without an ETX.
    ///
    /// The partial payload is dropped and the decoder returns to idle.
    #[error("record exceeded {limit} bytes without end marker: discarded")]
    RecordTooLong {
        /// Payload limit in bytes.
        limit: usize,
    },

    /// Value does not fit in a single base-62 digit.
    #[error("value {0} out of base-62 digit range (0..=61)")]
    Base62Range(u8),

    /// Byte is not one of `0-9`, `A-Z`, `a-z`.
    #[error("invalid base-62 digit {0:#04x}")]
    InvalidDigit(u8),

    /// Clock component outside its calendar range.
    #[error("clock time {hour:02}:{minute:02}:{second:02} out of range")]
    ClockRange {
        /// Hour of day.
        hour: u8,
        /// Minute of hour.
        minute: u8,
        /// Second of minute.
        second: u8,
    },
}
