//! Connectivity monitor daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────┐     ┌──────────────┐     ┌────────────────────┐
//!   │ scheduler │────▶│   executor   │────▶│ state (hysteresis, │
//!   │ idle/run  │     │ ping → http  │     │ bounded history)   │
//!   └─────▲─────┘     └──────────────┘     └─────────┬──────────┘
//!         │ re-arm timer                             │
//!         └──────────────────────────────────────────┤
//!                                                    ▼
//!   stdout (JSON lines) ◀── status watch + notifier events
//! ```
//!
//! Logs go to stderr; stdout carries one JSON object per status snapshot
//! or event.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use connectivity_monitor::config::{load_config, MonitorConfig};
use connectivity_monitor::engine::{Engine, Event, StatusRecord};
use connectivity_monitor::lifecycle::{signals, Shutdown};
use connectivity_monitor::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "connectivity-monitor")]
#[command(about = "Monitor upstream internet connectivity", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single check, print the status and exit (0 = connected).
    #[arg(long)]
    once: bool,
}

/// One line of stdout output.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Output<'a> {
    Status(&'a StatusRecord),
    Event(&'a Event),
}

fn print_line(output: &Output<'_>) {
    match serde_json::to_string(output) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(
        ping_target = %config.ping.target,
        ping_method = ?config.ping.method,
        http_url = %config.http.url,
        interval_secs = config.schedule.update_interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut engine = Engine::from_config(config)?;

    if cli.once {
        engine.run_once().await;
        let status = engine.snapshot();
        print_line(&Output::Status(&status));
        return Ok(if status.is_connected { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let mut events = engine.subscribe_events();
    let mut status = engine.watch_status();
    let shutdown = Shutdown::new();
    let handle = engine.spawn(shutdown.subscribe());

    let signal = signals::wait_for_shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            result = &mut signal => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Signal handler failed");
                }
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = status.borrow_and_update().clone();
                print_line(&Output::Status(&snapshot));
            }
            event = events.recv() => match event {
                Ok(event) => print_line(&Output::Event(&event)),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Event output lagging"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    shutdown.trigger();
    handle.join().await?;

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
