//! Fuzz target for STX/ETX record reassembly
//!
//! # Strategy
//!
//! - Well-formed records between noise
//! - Stray and nested markers
//! - Arbitrary raw bytes
//! - Clock values across the full u8 range (most invalid)
//!
//! # Invariants
//!
//! - Decoder NEVER panics
//! - Completed payloads never contain STX or ETX
//! - `buffered()` tracks exactly the bytes appended since the last STX
//! - The decoder is idle right after a record completes or is abandoned
//! - An open record never exceeds `MAX_RECORD` bytes

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stxcom_proto::{ClockTime, Decoded, ETX, FrameDecoder, MAX_RECORD, STX};

#[derive(Debug, Clone, Arbitrary)]
enum Chunk {
    Noise(Vec<u8>),
    Record(Vec<u8>),
    Start,
    End,
    Raw(Vec<u8>),
    Clock { hour: u8, minute: u8, second: u8 },
}

fuzz_target!(|chunks: Vec<Chunk>| {
    let mut decoder = FrameDecoder::new();
    let mut clock = ClockTime::MIDNIGHT;
    let mut expected_buffered = None::<usize>;

    for chunk in chunks {
        let bytes = match chunk {
            Chunk::Noise(bytes) | Chunk::Raw(bytes) => bytes,
            Chunk::Record(payload) => {
                let mut bytes = vec![STX];
                bytes.extend(payload.into_iter().filter(|b| *b != STX && *b != ETX));
                bytes.push(ETX);
                bytes
            },
            Chunk::Start => vec![STX],
            Chunk::End => vec![ETX],
            Chunk::Clock { hour, minute, second } => {
                if let Ok(next) = ClockTime::new(hour, minute, second) {
                    clock = next;
                }
                continue;
            },
        };

        for byte in bytes {
            match decoder.push(byte, clock) {
                Decoded::Completed(record) => {
                    assert!(!record.payload.contains(&STX));
                    assert!(!record.payload.contains(&ETX));
                    assert_eq!(Some(record.payload.len()), expected_buffered);
                    assert_eq!(record.stamp.to_clock().ok(), Some(clock));
                    assert!(!decoder.in_record());
                    expected_buffered = None;
                },
                Decoded::Started | Decoded::Restarted(_) => expected_buffered = Some(0),
                Decoded::Abandoned(_) => {
                    assert_eq!(expected_buffered, Some(MAX_RECORD));
                    expected_buffered = None;
                },
                Decoded::Buffered => {
                    expected_buffered = expected_buffered.map(|n| n + 1);
                    assert!(expected_buffered.is_some());
                },
                Decoded::Passthrough(_) => assert!(expected_buffered.is_none()),
            }
            assert_eq!(decoder.buffered(), expected_buffered.unwrap_or(0));
            assert_eq!(decoder.in_record(), expected_buffered.is_some());
        }
    }
});
