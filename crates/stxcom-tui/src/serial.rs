//! Serial port transport.
//!
//! [`SerialTransport`] wraps a `tokio-serial` stream. Every operation takes
//! `&mut self` from the single runtime task, so the stream is never split.

use std::{fmt, io, str::FromStr};

use bytes::Bytes;
use stxcom_core::{ConfigError, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};

/// Size of one read from the port.
const READ_CHUNK: usize = 256;

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
}

impl FromStr for Parity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "even" => Ok(Self::Even),
            "odd" => Ok(Self::Odd),
            _ => Err(ConfigError::Parity(s.to_string())),
        }
    }
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Even => tokio_serial::Parity::Even,
            Parity::Odd => tokio_serial::Parity::Odd,
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataBits {
    /// Seven bits.
    Seven,
    /// Eight bits.
    #[default]
    Eight,
}

impl TryFrom<u8> for DataBits {
    type Error = ConfigError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(ConfigError::DataBits(other)),
        }
    }
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

/// Serial line settings fixed at open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Device path.
    pub path: String,
    /// Initial baud rate.
    pub baud: u32,
    /// Parity.
    pub parity: Parity,
    /// Data bits.
    pub data_bits: DataBits,
}

impl fmt::Display for SerialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        };
        write!(f, "{} {} {bits}{parity}1", self.path, self.baud)
    }
}

/// Open serial connection.
pub struct SerialTransport {
    port: Option<SerialStream>,
    path: String,
    baud: u32,
    buf: Box<[u8; READ_CHUNK]>,
}

impl SerialTransport {
    /// Open the device described by `settings`.
    ///
    /// # Errors
    ///
    /// - `TransportError::Open` if the device cannot be opened
    pub fn open(settings: &SerialSettings) -> Result<Self, TransportError> {
        tracing::debug!(%settings, "opening serial port");

        let port = tokio_serial::new(&settings.path, settings.baud)
            .data_bits(settings.data_bits.into())
            .parity(settings.parity.into())
            .open_native_async()
            .map_err(|e| {
                tracing::error!(path = %settings.path, error = %e, "failed to open serial port");
                TransportError::Open { path: settings.path.clone(), reason: e.to_string() }
            })?;

        tracing::info!(path = %settings.path, baud = settings.baud, "serial port opened");
        Ok(Self {
            port: Some(port),
            path: settings.path.clone(),
            baud: settings.baud,
            buf: Box::new([0; READ_CHUNK]),
        })
    }

    /// Device path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current baud rate.
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Wait for the next chunk of input.
    ///
    /// Returns `Ok(None)` at end of file and the OS error if the read fails;
    /// the port is closed in both cases. Never completes while the port is
    /// closed. Cancel-safe.
    pub async fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        let Some(port) = self.port.as_mut() else {
            return std::future::pending().await;
        };

        match port.read(&mut self.buf[..]).await {
            Ok(0) => {
                tracing::info!(path = %self.path, "serial port reached end of file");
                self.port = None;
                Ok(None)
            },
            Ok(n) => {
                tracing::trace!(bytes = n, "serial input");
                Ok(Some(Bytes::copy_from_slice(&self.buf[..n])))
            },
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "serial read failed");
                self.port = None;
                Err(e)
            },
        }
    }

    /// Write and flush.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` if the port is closed
    /// - `TransportError::Write` if the OS write fails
    pub async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        port.write_all(data).await?;
        port.flush().await?;
        Ok(())
    }

    /// Change the baud rate.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` if the port is closed
    /// - `TransportError::Reconfigure` if the driver rejects the rate
    pub fn set_baud(&mut self, baud: u32) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        port.set_baud_rate(baud).map_err(|e| TransportError::Reconfigure(e.to_string()))?;
        tracing::debug!(baud, "baud rate changed");
        self.baud = baud;
        Ok(())
    }

    /// Drive DTR.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` if the port is closed
    /// - `TransportError::Reconfigure` if the driver rejects the change
    pub fn set_dtr(&mut self, level: bool) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        port.write_data_terminal_ready(level).map_err(|e| TransportError::Reconfigure(e.to_string()))
    }

    /// Flush and close. Closing twice is harmless.
    pub async fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush().await {
                tracing::warn!(path = %self.path, error = %e, "flush before close failed");
            }
            tracing::info!(path = %self.path, "serial port closed");
        }
    }
}
