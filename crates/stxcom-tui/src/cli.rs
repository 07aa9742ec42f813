//! Command-line arguments.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use stxcom_core::{
    ConfigError, ReadyMarker, SessionConfig,
    config::{DEFAULT_REQUERY_COMMAND, MAX_DELAY},
};

use crate::serial::{DataBits, Parity, SerialSettings};

/// Serial terminal with STX/ETX record logging and paced script download
#[derive(Parser, Debug, Clone)]
#[command(name = "stxcom")]
#[command(about = "Serial terminal with STX/ETX record logging and paced script download")]
#[command(version)]
pub struct Args {
    /// Serial port device
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    pub port: String,

    /// Baud rate (bps)
    #[arg(short, long, default_value_t = 38_400)]
    pub baud: u32,

    /// Parity (none, even, odd)
    #[arg(long, default_value = "none")]
    pub parity: String,

    /// Data bits (7 or 8)
    #[arg(long, default_value_t = 8)]
    pub bits: u8,

    /// Echo typed characters and sent lines
    #[arg(short, long)]
    pub echo: bool,

    /// Ready prompt character, or a throttle delay in milliseconds
    #[arg(short, long, default_value = "}")]
    pub ready: String,

    /// Re-query delay after each record, in milliseconds (0 disables)
    #[arg(short, long, default_value_t = 0)]
    pub query: u64,

    /// Download script file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// List serial ports and exit
    #[arg(short, long)]
    pub list: bool,

    /// Command sent to re-query the device
    #[arg(long, default_value = DEFAULT_REQUERY_COMMAND)]
    pub query_command: String,

    /// Record log file (appended)
    #[arg(long, default_value = "log.txt")]
    pub log: PathBuf,

    /// Write diagnostics here instead of stderr
    #[arg(long)]
    pub trace_file: Option<PathBuf>,

    /// Diagnostic level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Session settings.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ReadyMarker` if `--ready` is neither a number nor a
    ///   single character
    /// - `ConfigError::QueryInterval` if `--query` exceeds the longest delay
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let query_interval = Duration::from_millis(self.query);
        if query_interval > MAX_DELAY {
            return Err(ConfigError::QueryInterval(self.query));
        }

        Ok(SessionConfig {
            echo: self.echo,
            ready: self.ready.parse::<ReadyMarker>()?,
            query_interval,
            requery_command: self.query_command.clone(),
            download_file: self.file.clone(),
        })
    }

    /// Serial line settings.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Parity` or `ConfigError::DataBits` for unsupported
    ///   values
    pub fn serial_settings(&self) -> Result<SerialSettings, ConfigError> {
        Ok(SerialSettings {
            path: self.port.clone(),
            baud: self.baud,
            parity: self.parity.parse::<Parity>()?,
            data_bits: DataBits::try_from(self.bits)?,
        })
    }
}
