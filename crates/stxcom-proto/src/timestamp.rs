//! Wall-clock time and the three-character record stamp.

use std::fmt;

use crate::{
    base62,
    errors::{ProtocolError, Result},
};

/// Local wall-clock time of day, second resolution.
///
/// # Invariants
///
/// - `hour < 24`, `minute < 60`, `second < 60`. Enforced by [`ClockTime::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl ClockTime {
    /// Midnight.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0, second: 0 };

    /// Create a time of day.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::ClockRange` if any component is out of range
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(ProtocolError::ClockRange { hour, minute, second });
        }
        Ok(Self { hour, minute, second })
    }

    /// Hour of day (0..24).
    pub fn hour(self) -> u8 {
        self.hour
    }

    /// Minute of hour (0..60).
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Second of minute (0..60).
    pub fn second(self) -> u8 {
        self.second
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Compact record stamp: one base-62 digit each for hour, minute, second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp([u8; 3]);

impl Stamp {
    /// Stamp for the given time of day.
    pub fn from_clock(clock: ClockTime) -> Self {
        // Components are range-checked by ClockTime::new, all below 62.
        let digit = |v: u8| base62::encode(v).unwrap_or(b'?');
        Self([digit(clock.hour), digit(clock.minute), digit(clock.second)])
    }

    /// Parse a stamp back into a time of day.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidDigit` for a non base-62 byte
    /// - `ProtocolError::ClockRange` if the digits do not form a valid time
    pub fn to_clock(self) -> Result<ClockTime> {
        let [h, m, s] = self.0;
        ClockTime::new(base62::decode(h)?, base62::decode(m)?, base62::decode(s)?)
    }

    /// Raw ASCII digits.
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}
