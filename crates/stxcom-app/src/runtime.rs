//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: input routing and session state machine
//! - [`Driver`]: platform-specific I/O
//! - [`Environment`]: monotonic time and sleeping

use std::collections::VecDeque;

use stxcom_core::{Environment, WriteKind, script::decode_latin1};

use crate::{App, AppAction, AppEvent, Driver};

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment supplying time
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    env: E,
    app: App<E::Instant>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime.
    pub fn new(driver: D, env: E, app: App<E::Instant>) -> Self {
        Self { driver, env, app }
    }

    /// Run the main event loop.
    ///
    /// Each cycle waits for whichever comes first: a driver event or the
    /// earliest timer deadline. The event is handled to completion,
    /// including every follow-up event its actions produce, before the next
    /// wait.
    ///
    /// Returns when the App quits or keyboard input ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver's terminal I/O fails.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let result = self.event_loop().await;
        self.app.shutdown();
        self.driver.stop();
        result
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        loop {
            let deadline = self.app.next_deadline();
            let event = tokio::select! {
                biased;

                () = sleep_until(&self.env, deadline) => AppEvent::Tick,

                polled = self.driver.poll_event() => match polled? {
                    Some(event) => event,
                    None => {
                        tracing::debug!("keyboard input ended");
                        return Ok(());
                    },
                },
            };

            if self.process_event(event).await? {
                return Ok(());
            }
        }
    }

    /// Handle one event and every event its actions produce.
    ///
    /// Returns `true` if the App asked to quit. Remaining actions are still
    /// executed first.
    async fn process_event(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let mut pending = VecDeque::from([event]);
        let mut quit = false;

        while let Some(event) = pending.pop_front() {
            let now = self.env.now();
            for action in self.app.handle(event, now) {
                match action {
                    AppAction::Write { data, kind } => self.write(&data, kind).await?,
                    AppAction::Display(bytes) => self.driver.display(&bytes)?,
                    AppAction::Print(text) => self.driver.print(&text)?,
                    AppAction::Notice(line) => self.driver.notice(&line)?,
                    AppAction::AppendLog(line) => {
                        if let Err(err) = self.driver.append_log(&line).await {
                            tracing::warn!(%err, "record log append failed");
                            self.driver.notice(&format!("error on log write: {err}"))?;
                        }
                    },
                    AppAction::LoadScript { path, section } => {
                        let event = match self.driver.read_script(&path).await {
                            Ok(bytes) => AppEvent::ScriptLoaded { text: decode_latin1(&bytes), section },
                            Err(err) => AppEvent::ScriptFailed(err),
                        };
                        pending.push_back(event);
                    },
                    AppAction::SetBaud(baud) => match self.driver.set_baud(baud).await {
                        Ok(()) => pending.push_back(AppEvent::BaudChanged(baud)),
                        Err(err) => self.reconfigure_failed("baud set", &err.to_string())?,
                    },
                    AppAction::SetSignal(level) => match self.driver.set_signal(level).await {
                        Ok(()) => pending.push_back(AppEvent::SignalChanged(level)),
                        Err(err) => self.reconfigure_failed("dtr set", &err.to_string())?,
                    },
                    AppAction::CloseTransport => {
                        self.driver.close_transport().await;
                        pending.push_back(AppEvent::TransportClosed);
                    },
                    AppAction::Quit => quit = true,
                }
            }
        }

        Ok(quit)
    }

    /// Write and report failure. Throttled lines echo only once written.
    async fn write(&mut self, data: &[u8], kind: WriteKind) -> Result<(), D::Error> {
        match self.driver.write_serial(data).await {
            Ok(()) => {
                if let WriteKind::Throttled { echo: Some(line) } = kind {
                    self.driver.print(&format!("{line}\n"))?;
                }
            },
            Err(err) => {
                tracing::warn!(%err, %kind, "serial write failed");
                self.driver.notice(&format!("error on {kind} write: {err}"))?;
            },
        }
        Ok(())
    }

    fn reconfigure_failed(&mut self, what: &str, reason: &str) -> Result<(), D::Error> {
        tracing::warn!(what, reason, "transport reconfigure failed");
        self.driver.notice(&format!("error on {what}: {reason}"))
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until<E: Environment>(env: &E, deadline: Option<E::Instant>) {
    match deadline {
        Some(deadline) => env.sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
