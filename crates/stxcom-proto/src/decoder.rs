//! Byte-at-a-time record reassembly.
//!
//! # State Machine
//!
//! ```text
//!            STX                  byte (not STX/ETX)
//!  ┌──────┐ ─────> ┌──────────┐ ──────┐
//!  │ Idle │        │ InRecord │ <─────┘
//!  └──────┘ <───── └──────────┘
//!     ↑ │    ETX        │ STX: discard payload, stay InRecord
//!     └─┘               └──────────────────────────────────
//!   other bytes: pass-through
//! ```
//!
//! A lone ETX while idle is ordinary pass-through traffic. A record that
//! grows past the limit without ETX is dropped and the decoder goes idle.

use bytes::BytesMut;

use crate::{ClockTime, ETX, ProtocolError, Record, STX, Stamp};

/// Default limit on an open record's payload, in bytes.
pub const MAX_RECORD: usize = 64 * 1024;

/// Classification of one decoded byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Byte outside any record, destined for the operator's screen.
    Passthrough(u8),
    /// STX opened a new record.
    Started,
    /// STX arrived inside an open record; the partial payload was dropped
    /// and a fresh record opened.
    Restarted(ProtocolError),
    /// Byte appended to the open record.
    Buffered,
    /// The open record outgrew the limit; it was dropped along with this
    /// byte and the decoder is idle.
    Abandoned(ProtocolError),
    /// ETX closed the open record.
    Completed(Record),
}

/// Reassembles STX/ETX records from a byte stream.
///
/// # Invariants
///
/// - At most one record is open at a time.
/// - A completed record's payload never contains STX or ETX.
/// - An open record never holds more than `limit` bytes.
#[derive(Debug)]
pub struct FrameDecoder {
    open: Option<BytesMut>,
    limit: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_RECORD)
    }
}

impl FrameDecoder {
    /// Create an idle decoder with the [`MAX_RECORD`] limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle decoder that abandons records longer than `limit`.
    pub fn with_limit(limit: usize) -> Self {
        Self { open: None, limit }
    }

    /// Whether a record is currently being assembled.
    pub fn in_record(&self) -> bool {
        self.open.is_some()
    }

    /// Bytes buffered for the open record. Zero when idle.
    pub fn buffered(&self) -> usize {
        self.open.as_ref().map_or(0, BytesMut::len)
    }

    /// Feed one byte. `clock` stamps a record completed by this byte.
    pub fn push(&mut self, byte: u8, clock: ClockTime) -> Decoded {
        if byte == STX {
            return match self.open.replace(BytesMut::new()) {
                Some(partial) => {
                    Decoded::Restarted(ProtocolError::UnexpectedStart { discarded: partial.len() })
                },
                None => Decoded::Started,
            };
        }

        match self.open.take() {
            Some(payload) if byte == ETX => {
                Decoded::Completed(Record::new(Stamp::from_clock(clock), payload.freeze()))
            },
            Some(payload) if payload.len() >= self.limit => {
                Decoded::Abandoned(ProtocolError::RecordTooLong { limit: self.limit })
            },
            Some(mut payload) => {
                payload.extend_from_slice(&[byte]);
                self.open = Some(payload);
                Decoded::Buffered
            },
            None => Decoded::Passthrough(byte),
        }
    }

    /// Drop any partially assembled record.
    pub fn reset(&mut self) {
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn feed(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<Decoded> {
        bytes.iter().map(|&b| decoder.push(b, ClockTime::MIDNIGHT)).collect()
    }

    fn records(decoded: &[Decoded]) -> Vec<Vec<u8>> {
        decoded
            .iter()
            .filter_map(|d| match d {
                Decoded::Completed(r) => Some(r.payload.to_vec()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn record_between_markers() {
        let mut decoder = FrameDecoder::new();
        let out = feed(&mut decoder, b"ok\x02T1,22\x03>");

        assert_eq!(out[0], Decoded::Passthrough(b'o'));
        assert_eq!(out[2], Decoded::Started);
        assert_eq!(records(&out), vec![b"T1,22".to_vec()]);
        assert_eq!(out.last(), Some(&Decoded::Passthrough(b'>')));
        assert!(!decoder.in_record());
    }

    #[test]
    fn empty_record() {
        let mut decoder = FrameDecoder::new();
        let out = feed(&mut decoder, b"\x02\x03");
        assert_eq!(records(&out), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn stamp_uses_clock_at_end_marker() {
        let mut decoder = FrameDecoder::new();
        decoder.push(STX, ClockTime::MIDNIGHT);
        decoder.push(b'x', ClockTime::MIDNIGHT);

        let clock = ClockTime::new(10, 0, 37).unwrap();
        let Decoded::Completed(record) = decoder.push(ETX, clock) else {
            panic!("expected completed record");
        };
        assert_eq!(record.stamp.to_string(), "A0b");
    }

    #[test]
    fn nested_start_discards_partial_payload() {
        let mut decoder = FrameDecoder::new();
        let out = feed(&mut decoder, b"\x02abc\x02de\x03");

        assert!(out.contains(&Decoded::Restarted(ProtocolError::UnexpectedStart { discarded: 3 })));
        assert_eq!(records(&out), vec![b"de".to_vec()]);
    }

    #[test]
    fn stray_end_marker_passes_through() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(ETX, ClockTime::MIDNIGHT), Decoded::Passthrough(ETX));
    }

    #[test]
    fn oversized_record_abandoned() {
        let mut decoder = FrameDecoder::with_limit(4);
        let out = feed(&mut decoder, b"\x02abcdXY\x03");

        assert_eq!(out[4], Decoded::Buffered);
        assert_eq!(out[5], Decoded::Abandoned(ProtocolError::RecordTooLong { limit: 4 }));
        assert_eq!(&out[6..], [Decoded::Passthrough(b'Y'), Decoded::Passthrough(ETX)]);
        assert!(records(&out).is_empty());
        assert!(!decoder.in_record());
    }

    #[test]
    fn record_at_limit_completes() {
        let mut decoder = FrameDecoder::with_limit(4);
        assert_eq!(records(&feed(&mut decoder, b"\x02abcd\x03")), vec![b"abcd".to_vec()]);
        assert_eq!(FrameDecoder::new().limit, MAX_RECORD);
    }

    #[test]
    fn reset_drops_open_record() {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, b"\x02abc");
        assert_eq!(decoder.buffered(), 3);

        decoder.reset();
        assert!(!decoder.in_record());
        assert_eq!(decoder.push(b'z', ClockTime::MIDNIGHT), Decoded::Passthrough(b'z'));
    }

    /// Segments of plain bytes (no markers) used to build framed streams.
    fn plain() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>().prop_filter("no markers", |b| *b != STX && *b != ETX), 0..16)
    }

    proptest! {
        #[test]
        fn each_span_yields_one_record(spans in prop::collection::vec((plain(), plain()), 0..8)) {
            let mut stream = Vec::new();
            for (noise, payload) in &spans {
                stream.extend_from_slice(noise);
                stream.push(STX);
                stream.extend_from_slice(payload);
                stream.push(ETX);
            }

            let mut decoder = FrameDecoder::new();
            let out = feed(&mut decoder, &stream);

            let expected: Vec<Vec<u8>> = spans.iter().map(|(_, p)| p.clone()).collect();
            prop_assert_eq!(records(&out), expected);

            let passthrough: Vec<u8> = out.iter().filter_map(|d| match d {
                Decoded::Passthrough(b) => Some(*b),
                _ => None,
            }).collect();
            let noise: Vec<u8> = spans.iter().flat_map(|(n, _)| n.clone()).collect();
            prop_assert_eq!(passthrough, noise);
        }

        #[test]
        fn arbitrary_bytes_never_leave_payload_with_markers(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let mut decoder = FrameDecoder::with_limit(16);
            for d in feed(&mut decoder, &bytes) {
                prop_assert!(decoder.buffered() <= 16);
                if let Decoded::Completed(record) = d {
                    prop_assert!(!record.payload.contains(&STX));
                    prop_assert!(!record.payload.contains(&ETX));
                }
            }
        }
    }
}
