//! Terminal driver.
//!
//! Implements the [`Driver`] trait for a raw-mode terminal: crossterm for
//! keyboard events and output, [`SerialTransport`] for the port and
//! [`RecordLog`] for completed records. Device output scrolls in the normal
//! screen; there is no alternate screen.

use std::{
    collections::VecDeque,
    io::{self, Stdout, Write, stdout},
    path::Path,
};

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use stxcom_app::{AppEvent, Driver, KeyInput};
use stxcom_core::{Environment, ScriptError, TransportError};
use thiserror::Error;

use crate::{RecordLog, SerialTransport, SystemEnv};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
pub struct TerminalDriver {
    events: EventStream,
    serial: SerialTransport,
    log: RecordLog,
    out: Stdout,
    env: SystemEnv,
    pending: VecDeque<AppEvent>,
}

impl TerminalDriver {
    /// Take over the terminal.
    ///
    /// The first event delivered reports the already open port.
    pub fn new(serial: SerialTransport, log: RecordLog, env: SystemEnv) -> Result<Self, TerminalError> {
        enable_raw_mode()?;

        let opened = AppEvent::TransportOpened { path: serial.path().to_string(), baud: serial.baud() };
        Ok(Self {
            events: EventStream::new(),
            serial,
            log,
            out: stdout(),
            env,
            pending: VecDeque::from([opened]),
        })
    }

    /// Convert a crossterm key event to `KeyInput`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyInput::Ctrl(c.to_ascii_lowercase()))
            },
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        self.out.write_all(bytes)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        loop {
            tokio::select! {
                maybe_event = self.events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if let Some(input) = Self::convert_key(key) {
                                return Ok(Some(AppEvent::Key(input)));
                            }
                        },
                        Some(Ok(_)) => {},
                        Some(Err(e)) => return Err(TerminalError::Io(e)),
                        None => return Ok(None),
                    }
                }

                chunk = self.serial.read_chunk() => {
                    return Ok(Some(match chunk {
                        Ok(Some(bytes)) => AppEvent::SerialData { bytes, clock: self.env.wall_clock() },
                        Ok(None) => AppEvent::TransportClosed,
                        Err(e) => {
                            self.pending.push_back(AppEvent::TransportClosed);
                            AppEvent::Error { message: format!("error on serial read: {e}") }
                        },
                    }));
                }
            }
        }
    }

    async fn write_serial(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.serial.write(data).await
    }

    async fn set_baud(&mut self, baud: u32) -> Result<(), TransportError> {
        self.serial.set_baud(baud)
    }

    async fn set_signal(&mut self, level: bool) -> Result<(), TransportError> {
        self.serial.set_dtr(level)
    }

    async fn close_transport(&mut self) {
        self.serial.close().await;
    }

    async fn read_script(&mut self, path: &Path) -> Result<Vec<u8>, ScriptError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| ScriptError::Read { path: path.to_path_buf(), reason: e.to_string() })
    }

    async fn append_log(&mut self, line: &[u8]) -> io::Result<()> {
        self.log.append(line).await
    }

    fn display(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.emit(bytes)
    }

    fn print(&mut self, text: &str) -> Result<(), Self::Error> {
        let text = text.replace('\n', "\r\n");
        self.emit(text.as_bytes())
    }

    fn notice(&mut self, line: &str) -> Result<(), Self::Error> {
        let text = format!("\r\n{line}\r\n");
        self.emit(text.as_bytes())
    }

    fn stop(&mut self) {
        let _ = self.out.flush();
        let _ = disable_raw_mode();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
