//! # FOSSA Ground Station
//!
//! Ground station for the FOSSASAT-1 LoRa telemetry and command link.
//!
//! Sends operator commands to the satellite and decodes whatever it sends
//! back: pongs, system info telemetry, last packet link quality and relayed
//! messages.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use fossa_ground_station::config::{Config, DisplayFormat, LoggingConfig};
use fossa_ground_station::display::{ConsolePresenter, JsonlPresenter, Presenter, ReceivingIndicator};
use fossa_ground_station::operator::{self, OperatorCommand, CONTROLS, RETRANSMIT_PROMPT};
use fossa_ground_station::radio::SimulatedRadio;
use fossa_ground_station::station::GroundStation;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Input lines buffered between the stdin reader and the main loop
const INPUT_QUEUE_DEPTH: usize = 8;

/// Main entry point for the ground station
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Initialize the radio and attach the receive interrupt
///
/// 2. **Main Loop**
///    - Drain and dispatch received frames every `poll_interval_ms`
///    - Execute operator commands read from stdin
///    - Show the "Receiving" status every `status_interval_ms`
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration is invalid or the radio cannot be
/// initialized. Nothing after start-up is fatal.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)?;

    let _log_guard = init_logging(&config.logging)?;

    let mut presenter: Box<dyn Presenter> = match config.display.format {
        DisplayFormat::Text => Box::new(ConsolePresenter::stdout()),
        DisplayFormat::Jsonl => Box::new(JsonlPresenter::stdout()),
    };
    presenter.progress(0);

    info!("FOSSA Ground Station v{} starting...", env!("CARGO_PKG_VERSION"));
    presenter.status_line("FOSSA Ground Station");
    presenter.progress(10);

    let callsign = config.station.callsign.clone();
    let radio = SimulatedRadio::new(callsign.clone(), config.simulator.clone());
    let mut station = GroundStation::new(radio, presenter, callsign);

    station
        .start(&config.radio)
        .context("Failed to initialize radio")?;

    station.presenter_mut().progress(100);
    info!("Listening for {}", station.callsign());
    if config.display.show_controls {
        station.presenter_mut().status_line(CONTROLS);
    }

    let mut input = spawn_input_reader();
    let mut awaiting_message = false;

    let mut poll_interval = interval(Duration::from_millis(config.station.poll_interval_ms));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut status_interval = interval(Duration::from_millis(config.station.status_interval_ms));
    status_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut indicator = ReceivingIndicator::default();

    // Main control loop
    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                if let Some(outcome) = station.poll_and_dispatch() {
                    debug!("Dispatch outcome: {:?}", outcome);
                    if config.display.show_controls {
                        station.presenter_mut().status_line(CONTROLS);
                    }
                }
            }

            Some(line) = input.recv() => {
                if awaiting_message {
                    awaiting_message = false;
                    if let Err(e) = station.request_retransmit(&line) {
                        warn!("Retransmit request failed: {}", e);
                    }
                    continue;
                }

                let Some(command) = OperatorCommand::parse(&String::from_utf8_lossy(&line)) else {
                    continue;
                };

                let result = match command {
                    OperatorCommand::Ping => station.send_ping(),
                    OperatorCommand::RequestInfo => station.request_system_info(),
                    OperatorCommand::RequestPacketInfo => station.request_last_packet_info(),
                    OperatorCommand::Retransmit => {
                        station.presenter_mut().status_line(RETRANSMIT_PROMPT);
                        awaiting_message = true;
                        Ok(())
                    }
                    OperatorCommand::ShowControls => {
                        station.presenter_mut().status_line(CONTROLS);
                        Ok(())
                    }
                };

                if let Err(e) = result {
                    warn!("Command {:?} failed: {}", command, e);
                }
            }

            _ = status_interval.tick() => {
                station.presenter_mut().status_line(&indicator.next_line());
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames received: {}", station.packets_received());
                break;
            }
        }
    }

    Ok(())
}

/// Load the configuration file, falling back to defaults if it does not exist
fn load_config(path: &str) -> Result<Config> {
    if !Path::new(path).exists() {
        // Logging is not up yet
        eprintln!("Configuration file {} not found, using defaults", path);
        return Ok(Config::default());
    }

    Config::load(path).with_context(|| format!("Failed to load configuration from {}", path))
}

/// Initialize tracing, writing to the configured file or to stderr
///
/// Stdout is reserved for the presenter.
fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let level: tracing::Level = config
        .level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let (writer, guard) = match &config.file {
        Some(file) => {
            let path = Path::new(file);
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path '{}' has no file name", file))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(writer)
        .with_ansi(config.file.is_none())
        .init();

    Ok(guard)
}

/// Read operator input lines on a background task
///
/// Each line is already cut to a retransmit-sized message, which is also
/// enough to recognize a single-key command.
fn spawn_input_reader() -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel(INPUT_QUEUE_DEPTH);

    tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin());
        loop {
            match operator::read_message(&mut stdin).await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Operator input closed");
                    break;
                }
                Err(e) => {
                    warn!("Failed to read operator input: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config("/nonexistent/fossa-ground-station.toml").unwrap();
        assert_eq!(config.station.callsign.as_str(), "FOSSASAT-1");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[station]\npoll_interval_ms = 0\n[radio]\n[display]\n").unwrap();
        file.flush().unwrap();

        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }
}
