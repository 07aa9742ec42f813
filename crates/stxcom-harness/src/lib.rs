//! Deterministic simulation harness for stxcom.
//!
//! [`SimEnv`] runs on tokio's paused clock with a settable time of day, and
//! [`SimDriver`] replays scripted keyboard and serial input while capturing
//! everything the runtime writes, shows and logs. Together they run the
//! production [`stxcom_app::Runtime`] without a terminal or a serial port.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_driver;
pub mod sim_env;

pub use sim_driver::{SimDriver, SimDriverError, Written};
pub use sim_env::SimEnv;
