//! Wire-level framing for stxcom.
//!
//! Devices talking to stxcom interleave free-running console output with
//! framed data records. A record starts with STX (`0x02`) and ends with ETX
//! (`0x03`); everything outside a record is pass-through traffic for the
//! operator's screen.
//!
//! # Components
//!
//! - [`FrameDecoder`]: byte-at-a-time record reassembly
//! - [`Record`]: a completed payload with its receipt [`Stamp`]
//! - [`ClockTime`]: wall-clock hour/minute/second used for stamping
//! - [`base62`]: single-character encoding used by stamps

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod base62;
pub mod decoder;
pub mod errors;
pub mod record;
pub mod timestamp;

pub use decoder::{Decoded, FrameDecoder, MAX_RECORD};
pub use errors::{ProtocolError, Result};
pub use record::Record;
pub use timestamp::{ClockTime, Stamp};

/// Start-of-record marker (ASCII STX).
pub const STX: u8 = 0x02;

/// End-of-record marker (ASCII ETX).
pub const ETX: u8 = 0x03;
