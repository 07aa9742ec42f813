//! Application layer for stxcom
//!
//! Pure state machines and a generic runtime for the interactive terminal,
//! so deterministic simulation runs the same code as production.
//!
//! # Components
//!
//! - [`App`]: input router owning the session and the menu
//! - [`Menu`]: line-editing menu for runtime reconfiguration
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic event loop over a Driver and an Environment

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod input;
pub mod menu;
mod runtime;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use menu::{Menu, MenuEffect, MenuState};
pub use runtime::Runtime;
