//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, io, path::Path};

use stxcom_core::{ScriptError, TransportError};

use crate::AppEvent;

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal and in simulation.
///
/// # Implementations
///
/// - **Terminal**: crossterm for keys and output, tokio-serial for the port
/// - **Simulation**: scripted keys and serial chunks, captured output
///
/// # Errors
///
/// [`Error`](Driver::Error) is reserved for failures that end the session
/// (the terminal itself failing). Transport, script and log failures use
/// their own types and are reported to the operator instead.
pub trait Driver: Send {
    /// Platform-specific fatal error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next keyboard or serial event.
    ///
    /// Returns `None` once keyboard input has ended. Must be cancel-safe: the
    /// runtime drops the future when a timer deadline passes first.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Write bytes to the serial port and wait for completion.
    fn write_serial(&mut self, data: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Change the baud rate.
    fn set_baud(&mut self, baud: u32) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Drive the DTR line.
    fn set_signal(&mut self, level: bool) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Close the serial port. Later writes fail with
    /// [`TransportError::Closed`].
    fn close_transport(&mut self) -> impl Future<Output = ()> + Send;

    /// Read a script file.
    fn read_script(&mut self, path: &Path) -> impl Future<Output = Result<Vec<u8>, ScriptError>> + Send;

    /// Append one line to the record log.
    fn append_log(&mut self, line: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Show device output unmodified.
    fn display(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Show local text (echo, menu prompts) inline.
    fn print(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Show a diagnostic on its own line.
    fn notice(&mut self, line: &str) -> Result<(), Self::Error>;

    /// Release resources before exit.
    fn stop(&mut self);
}
