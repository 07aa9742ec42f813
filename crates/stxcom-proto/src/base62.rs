//! Single-digit base-62 encoding.
//!
//! Digits `0-9` carry 0..=9, `A-Z` carry 10..=35 and `a-z` carry 36..=61.
//! Stamps only ever need one digit per component (hours, minutes, seconds all
//! fit below 62), so no multi-digit form exists.

use crate::errors::{ProtocolError, Result};

/// Largest value representable by one digit.
pub const MAX_DIGIT: u8 = 61;

/// Encode `value` as one ASCII base-62 digit.
///
/// # Errors
///
/// - `ProtocolError::Base62Range` if `value > 61`
pub fn encode(value: u8) -> Result<u8> {
    match value {
        0..=9 => Ok(b'0' + value),
        10..=35 => Ok(b'A' + (value - 10)),
        36..=MAX_DIGIT => Ok(b'a' + (value - 36)),
        _ => Err(ProtocolError::Base62Range(value)),
    }
}

/// Decode one ASCII base-62 digit.
///
/// # Errors
///
/// - `ProtocolError::InvalidDigit` if `digit` is not alphanumeric ASCII
pub fn decode(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'A'..=b'Z' => Ok(digit - b'A' + 10),
        b'a'..=b'z' => Ok(digit - b'a' + 36),
        _ => Err(ProtocolError::InvalidDigit(digit)),
    }
}
