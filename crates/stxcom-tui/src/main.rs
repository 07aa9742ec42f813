//! stxcom entry point.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a board, pacing downloads on the `}` prompt
//! stxcom --port /dev/ttyUSB0 --baud 38400 --file boot.fs
//!
//! # Throttle downloads to one line every 200 ms, re-query 500 ms after records
//! stxcom -r 200 -q 500 -f boot.fs
//!
//! # List serial adapters
//! stxcom --list
//! ```

use std::{
    fs::File,
    io::{self, Write},
    sync::Mutex,
};

use clap::Parser;
use stxcom_tui::{App, Args, RecordLog, Runtime, SerialTransport, SystemEnv, TerminalDriver, ports};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args)?;

    if args.list {
        let mut out = io::stdout().lock();
        for port in ports::list()? {
            writeln!(out, "{port}")?;
        }
        return Ok(());
    }

    let config = args.session_config()?;
    let settings = args.serial_settings()?;

    tracing::info!("stxcom starting");

    let serial = SerialTransport::open(&settings)?;
    let log = RecordLog::open(&args.log).await?;
    let driver = TerminalDriver::new(serial, log, SystemEnv::new())?;

    let app = App::new(config, settings.baud);
    Runtime::new(driver, SystemEnv::new(), app).run().await?;

    tracing::info!("stxcom exiting");
    Ok(())
}

/// Diagnostics go to `--trace-file` when given, otherwise to stderr.
fn init_tracing(args: &Args) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let file_layer = match &args.trace_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        },
        None => None,
    };
    let stderr_layer = file_layer.is_none().then(|| fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).with(filter).init();
    Ok(())
}
