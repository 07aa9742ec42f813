//! Completed data records.

use bytes::{BufMut, Bytes, BytesMut};

use crate::Stamp;

/// One STX…ETX payload plus the stamp taken when ETX arrived.
///
/// The payload holds exactly the bytes seen between the markers. It can never
/// contain STX or ETX since the decoder intercepts both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Receipt time of the end marker.
    pub stamp: Stamp,
    /// Bytes between the markers, possibly empty.
    pub payload: Bytes,
}

impl Record {
    /// Create a record.
    pub fn new(stamp: Stamp, payload: impl Into<Bytes>) -> Self {
        Self { stamp, payload: payload.into() }
    }

    /// Line written to the record log: `STAMP ' ' PAYLOAD '\n'`.
    ///
    /// The single space after the stamp matches the layout of existing
    /// record logs so their readers keep working.
    pub fn log_line(&self) -> Bytes {
        let mut line = BytesMut::with_capacity(self.payload.len() + 5);
        line.put_slice(self.stamp.as_bytes());
        line.put_u8(b' ');
        line.put_slice(&self.payload);
        line.put_u8(b'\n');
        line.freeze()
    }
}
