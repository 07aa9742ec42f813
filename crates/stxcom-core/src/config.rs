//! Session configuration.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ConfigError;

/// Default ready prompt.
pub const DEFAULT_READY: u8 = b'}';

/// Default command sent to re-query the device after each record.
pub const DEFAULT_REQUERY_COMMAND: &str = "fet";

/// Longest throttle or re-query delay. Longer requests are refused at
/// startup and clamped everywhere else, keeping every deadline representable.
pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

/// How scripted lines are paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyMarker {
    /// Send one line each time this byte appears in device output.
    Prompt(u8),
    /// Send lines at this fixed interval without waiting for the device.
    Throttle(Duration),
}

impl ReadyMarker {
    /// The prompt byte, if pacing on prompts.
    pub fn prompt(&self) -> Option<u8> {
        match self {
            Self::Prompt(b) => Some(*b),
            Self::Throttle(_) => None,
        }
    }
}

impl Default for ReadyMarker {
    fn default() -> Self {
        Self::Prompt(DEFAULT_READY)
    }
}

impl FromStr for ReadyMarker {
    type Err = ConfigError;

    /// A decimal number is a throttle delay in milliseconds, at most
    /// [`MAX_DELAY`]; any other single character (one byte wide) is a prompt.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(ms) = s.parse::<u64>() {
            let delay = Duration::from_millis(ms);
            if delay > MAX_DELAY {
                return Err(ConfigError::ReadyMarker(s.to_string()));
            }
            return Ok(Self::Throttle(delay));
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => u8::try_from(c)
                .map(Self::Prompt)
                .map_err(|_| ConfigError::ReadyMarker(s.to_string())),
            _ => Err(ConfigError::ReadyMarker(s.to_string())),
        }
    }
}

impl fmt::Display for ReadyMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt(b) => write!(f, "prompt {:?}", char::from(*b)),
            Self::Throttle(d) => write!(f, "throttle {} ms", d.as_millis()),
        }
    }
}

/// Runtime-mutable settings owned by the session.
///
/// Serial line settings (device, baud, parity, width) belong to the transport
/// and are not repeated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Echo typed characters and sent script lines locally.
    pub echo: bool,
    /// Pacing mode for scripted lines.
    pub ready: ReadyMarker,
    /// Delay after a record before re-querying. Zero disables re-query.
    pub query_interval: Duration,
    /// Command sent (followed by CR) to re-query the device.
    pub requery_command: String,
    /// Script file used by downloads.
    pub download_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            echo: false,
            ready: ReadyMarker::default(),
            query_interval: Duration::ZERO,
            requery_command: DEFAULT_REQUERY_COMMAND.to_string(),
            download_file: None,
        }
    }
}
