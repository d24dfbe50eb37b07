//! Doorwarden - single-door RFID access controller.
//!
//! Runs the control loop against console peripherals: badge ids typed on
//! standard input stand in for the reader, and lock, LED and display changes
//! are logged. Notifications go to a SIM800L modem when a serial port is
//! configured.

mod actuator;
mod config;

use actuator::TracingActuator;
use anyhow::Context;
use clap::Parser;
use config::Config;
use doorwarden_controller::{DoorController, Peripherals, show_clock_error};
use doorwarden_core::BadgeId;
use doorwarden_hardware::SystemClock;
use doorwarden_hardware::mock::{MockBadgeReader, MockBadgeReaderHandle};
use doorwarden_reporting::{
    QueuedNotifier, Sim800l, WriterAuditSink,
    notifier::DEFAULT_QUEUE_CAPACITY,
    sms::{LogTransport, open_serial},
};
use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Single-door RFID access controller
#[derive(Parser, Debug)]
#[command(name = "doorwarden", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "doorwarden.toml")]
    config: PathBuf,

    /// Control loop period in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::load(&args.config)?;
    info!(
        "Loaded {} ({} users, audit {})",
        args.config.display(),
        config.users.len(),
        config.audit.format
    );

    let mut actuator = TracingActuator::new();
    let clock = match SystemClock::new() {
        Ok(clock) => clock,
        Err(e) => {
            show_clock_error(&mut actuator);
            return Err(e).context("Cannot start without a valid wall clock");
        }
    };

    let (notifier, notifier_task) = match &config.notifier.serial_port {
        Some(path) => {
            let port = open_serial(path, config.notifier.baud_rate)
                .with_context(|| format!("Failed to open SMS modem on {path}"))?;
            QueuedNotifier::spawn(
                Sim800l::new(port, config.notifier.admin_phone.clone()),
                DEFAULT_QUEUE_CAPACITY,
            )
        }
        None => {
            warn!("No SMS modem configured, notifications will only be logged");
            QueuedNotifier::spawn(
                LogTransport::new(config.notifier.admin_phone.clone()),
                DEFAULT_QUEUE_CAPACITY,
            )
        }
    };

    let audit_out: Box<dyn Write + Send> = match &config.audit.path {
        Some(path) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open audit log {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    // Standard input is read on a plain thread: a blocked read there does not
    // hold up runtime shutdown.
    let (reader, reader_handle) = MockBadgeReader::with_name("stdin".to_string());
    thread::Builder::new()
        .name("stdin-badges".to_string())
        .spawn(move || feed_badges(std::io::stdin().lock(), reader_handle))
        .context("Failed to start the stdin reader")?;

    let mut controller = DoorController::new(
        config.engine()?,
        config.cooldown(),
        Peripherals {
            reader,
            actuator,
            clock,
            notifier,
            audit: WriterAuditSink::new(audit_out, config.audit.format),
        },
    );
    controller.start();
    info!("Type a badge id (8 hex digits) and press Enter to present it");

    let mut interval = tokio::time::interval(Duration::from_millis(args.tick_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                controller.step();
            }
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    // Dropping the controller closes the queue; give pending messages a
    // bounded chance to go out.
    drop(controller);
    if tokio::time::timeout(Duration::from_secs(15), notifier_task)
        .await
        .is_err()
    {
        warn!("Pending notifications were not delivered before shutdown");
    }
    Ok(())
}

/// Present every badge id read from `input`, one per line, until EOF.
///
/// Blocks the calling thread; run it outside the async runtime.
fn feed_badges(input: impl BufRead, reader: MockBadgeReaderHandle) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read standard input: {}", e);
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match BadgeId::new(&line) {
            Ok(badge) => {
                if let Err(e) = reader.blocking_present(badge) {
                    warn!("Reader {} rejected badge: {}", reader.name(), e);
                    return;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
    info!("Standard input closed; badge entry disabled");
}
