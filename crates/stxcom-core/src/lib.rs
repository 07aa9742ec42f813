//! Session core for stxcom.
//!
//! Pure state machines for the duplexed I/O core: framing inbound bytes into
//! records, pacing scripted lines against the device's ready prompt, throttled
//! bulk transmission and the periodic re-query cycle. Nothing here performs
//! I/O; callers pass in time and bytes and execute the returned
//! [`SessionAction`]s.
//!
//! # Components
//!
//! - [`Session`]: owns decoder, pacing, queue and timers
//! - [`Pacing`]: ready-for-next flag and re-query arming
//! - [`Script`] / [`ScriptQueue`]: download parsing and staging
//! - [`TimerSet`]: cancellable one-shot timers
//! - [`Environment`]: time source abstraction for drivers

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod env;
pub mod error;
pub mod pacing;
pub mod script;
pub mod session;
pub mod throttle;
pub mod timer;

pub use config::{ReadyMarker, SessionConfig};
pub use env::{Environment, Timepoint};
pub use error::{ConfigError, ScriptError, TransportError};
pub use pacing::Pacing;
pub use script::{Script, ScriptQueue, Section};
pub use session::{Session, SessionAction, TimerKind, WriteKind};
pub use timer::{TimerHandle, TimerSet};
