//! Application state machine.
//!
//! This module defines the [`App`] state machine, which routes keyboard input
//! and feeds serial traffic, timer ticks and completions into the session.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Key routing
//!
//! - Ctrl-C quits, Ctrl-X closes the port, Ctrl-K opens the menu.
//! - Other Ctrl keys forward their control code.
//! - While the menu is active it receives every other key.
//! - Otherwise keys are forwarded to the device and optionally echoed.

use stxcom_core::{Script, ScriptError, Session, SessionConfig, Timepoint, WriteKind};

use crate::{AppAction, AppEvent, KeyInput, Menu, MenuEffect};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug)]
pub struct App<I: Timepoint> {
    session: Session<I>,
    menu: Menu,
    /// Baud rate last confirmed by the transport.
    baud: u32,
}

impl<I: Timepoint> App<I> {
    /// Create a new App for a transport opened at `baud`.
    pub fn new(config: SessionConfig, baud: u32) -> Self {
        Self { session: Session::new(config), menu: Menu::new(), baud }
    }

    /// The session core.
    pub fn session(&self) -> &Session<I> {
        &self.session
    }

    /// The menu.
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Baud rate last confirmed by the transport.
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<I> {
        self.session.next_deadline()
    }

    /// Cancel all pending work before exit.
    pub fn shutdown(&mut self) {
        self.session.halt();
    }

    /// Process an event at monotonic time `now` and return actions.
    pub fn handle(&mut self, event: AppEvent, now: I) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key, now),
            AppEvent::SerialData { bytes, clock } => {
                self.session.handle_serial(&bytes, clock, now).into_iter().map(Into::into).collect()
            },
            AppEvent::Tick => self.session.handle_tick(now).into_iter().map(Into::into).collect(),
            AppEvent::ScriptLoaded { text, section } => match Script::parse(&text, &section) {
                Ok(script) => {
                    self.session.load_script(script, now).into_iter().map(Into::into).collect()
                },
                Err(err) => script_failed(&err),
            },
            AppEvent::ScriptFailed(err) => script_failed(&err),
            AppEvent::BaudChanged(baud) => {
                self.baud = baud;
                vec![AppAction::Print(format!("; Baud rate changed to [{baud}]"))]
            },
            AppEvent::SignalChanged(level) => {
                vec![AppAction::Print(format!("; dtr= {}", u8::from(level)))]
            },
            AppEvent::TransportOpened { path, baud } => {
                self.baud = baud;
                tracing::info!(%path, baud, "serial port open");
                vec![AppAction::Notice(format!("serial port open at {baud} baud @ {path}"))]
            },
            AppEvent::TransportClosed => {
                self.session.halt();
                tracing::info!("serial port closed");
                vec![AppAction::Notice("serial port closed".to_string())]
            },
            AppEvent::Error { message } => vec![AppAction::Notice(message)],
        }
    }

    fn handle_key(&mut self, key: KeyInput, now: I) -> Vec<AppAction> {
        match key {
            KeyInput::Ctrl('c') => {
                return vec![
                    AppAction::Notice("exit via ctrl-C".to_string()),
                    AppAction::CloseTransport,
                    AppAction::Quit,
                ];
            },
            KeyInput::Ctrl('x') => return vec![AppAction::CloseTransport],
            KeyInput::Ctrl('k') => {},
            KeyInput::Ctrl(_) => {
                return key
                    .to_bytes()
                    .map(|data| AppAction::Write { data, kind: WriteKind::Keystroke })
                    .into_iter()
                    .collect();
            },
            _ if !self.menu.is_active() => return self.passthrough(key),
            _ => {},
        }

        let file = self.session.config().download_file.clone();
        let effects = self.menu.handle(key, self.baud, file.as_deref());
        effects.into_iter().filter_map(|effect| self.apply(effect, now)).collect()
    }

    fn passthrough(&self, key: KeyInput) -> Vec<AppAction> {
        let Some(data) = key.to_bytes() else {
            return vec![];
        };

        let mut actions = Vec::with_capacity(2);
        if self.session.config().echo && key != KeyInput::Enter {
            actions.push(AppAction::Print(String::from_utf8_lossy(&data).into_owned()));
        }
        actions.push(AppAction::Write { data, kind: WriteKind::Keystroke });
        actions
    }

    fn apply(&mut self, effect: MenuEffect, now: I) -> Option<AppAction> {
        match effect {
            MenuEffect::Print(text) => Some(AppAction::Print(text)),
            MenuEffect::Notice(line) => Some(AppAction::Notice(line)),
            MenuEffect::Write(data) => Some(AppAction::Write { data, kind: WriteKind::Keystroke }),
            MenuEffect::Remember(_) => None,
            MenuEffect::LoadScript(section) => match &self.session.config().download_file {
                Some(path) => Some(AppAction::LoadScript { path: path.clone(), section }),
                None => script_failed(&ScriptError::NoFile).pop(),
            },
            MenuEffect::SetQueryInterval(interval) => {
                tracing::debug!(?interval, "query interval changed");
                self.session.set_query_interval(interval, now);
                None
            },
            MenuEffect::SetSignal(level) => Some(AppAction::SetSignal(level)),
            MenuEffect::SetBaud(baud) => Some(AppAction::SetBaud(baud)),
            MenuEffect::SetDownloadFile(path) => {
                tracing::debug!(path = %path.display(), "download file changed");
                self.session.set_download_file(path);
                None
            },
        }
    }
}

fn script_failed(err: &ScriptError) -> Vec<AppAction> {
    tracing::warn!(%err, "download aborted");
    vec![AppAction::Notice(format!("download aborted: {err}"))]
}
