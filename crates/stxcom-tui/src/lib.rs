//! Terminal serial client.
//!
//! A thin shell over [`stxcom_app::Driver`] that provides the terminal, the
//! serial port and the record log. All orchestration logic lives in the
//! generic [`stxcom_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod log_sink;
pub mod ports;
pub mod serial;
pub mod system_env;
pub mod terminal;

pub use cli::Args;
pub use log_sink::RecordLog;
pub use serial::{DataBits, Parity, SerialSettings, SerialTransport};
pub use stxcom_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
