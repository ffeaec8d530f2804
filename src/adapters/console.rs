//! Serial console command source.
//!
//! A reader thread collects lines from stdin (UART0 on the board) and
//! queues them on a bounded channel.  The control loop drains the queue
//! with [`SerialConsole::poll`] between ticks, so parsing and every config
//! change happen on the control thread.
//!
//! | Line                  | Result                                     |
//! |-----------------------|--------------------------------------------|
//! | `set <field> <value>` | `UpdateConfig` with one field changed      |
//! | `config <json>`       | `UpdateConfig` with a complete config      |
//! | `save`                | `SaveConfig`                               |
//! | `show`                | live config logged as JSON                 |
//!
//! Range checks are left to [`SystemConfig::validate`]; a bad value comes
//! back as `AppEvent::ConfigRejected`.

use std::io::{BufRead, ErrorKind};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::time::Duration;

use log::{info, warn};

use crate::app::commands::AppCommand;
use crate::config::SystemConfig;

/// Lines buffered between the reader thread and the control loop.
const LINE_QUEUE_DEPTH: usize = 8;

const READER_STACK_SIZE: usize = 6 * 1024;

/// Back-off while the UART has nothing for a non-blocking read.
const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    UnknownCommand,
    UnknownField,
    MissingValue,
    BadValue,
    BadJson,
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "unknown command (set, config, save, show)"),
            Self::UnknownField => write!(f, "unknown config field"),
            Self::MissingValue => write!(f, "missing value"),
            Self::BadValue => write!(f, "value does not parse"),
            Self::BadJson => write!(f, "config JSON does not parse"),
        }
    }
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleRequest {
    Command(AppCommand),
    Show,
}

/// Parse one console line against the live config.
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str, current: &SystemConfig) -> Result<Option<ConsoleRequest>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let request = match verb {
        "save" => ConsoleRequest::Command(AppCommand::SaveConfig),
        "show" => ConsoleRequest::Show,
        "config" => {
            let config: SystemConfig =
                serde_json::from_str(rest).map_err(|_| ConsoleError::BadJson)?;
            ConsoleRequest::Command(AppCommand::UpdateConfig(config))
        }
        "set" => {
            let mut args = rest.split_whitespace();
            let field = args.next().ok_or(ConsoleError::MissingValue)?;
            let raw = args.next().ok_or(ConsoleError::MissingValue)?;
            let mut config = current.clone();
            set_field(&mut config, field, raw)?;
            ConsoleRequest::Command(AppCommand::UpdateConfig(config))
        }
        _ => return Err(ConsoleError::UnknownCommand),
    };
    Ok(Some(request))
}

fn set_field(config: &mut SystemConfig, field: &str, raw: &str) -> Result<(), ConsoleError> {
    match field {
        "adc_reference_volts" => config.adc_reference_volts = value(raw)?,
        "adc_max_raw" => config.adc_max_raw = value(raw)?,
        "current_scale" => config.current_scale = value(raw)?,
        "voltage_scale" => config.voltage_scale = value(raw)?,
        "motor_threshold_amps" => config.motor_threshold_amps = value(raw)?,
        "motor_hysteresis_amps" => config.motor_hysteresis_amps = value(raw)?,
        "rotation_period_months" => config.rotation_period_months = value(raw)?,
        "interlock_delay_ms" => config.interlock_delay_ms = value(raw)?,
        "overcurrent_limit_amps" => config.overcurrent_limit_amps = value(raw)?,
        "utc_offset_secs" => config.utc_offset_secs = value(raw)?,
        "control_loop_interval_ms" => config.control_loop_interval_ms = value(raw)?,
        "telemetry_interval_ms" => config.telemetry_interval_ms = value(raw)?,
        _ => return Err(ConsoleError::UnknownField),
    }
    Ok(())
}

fn value<T: FromStr>(raw: &str) -> Result<T, ConsoleError> {
    raw.parse().map_err(|_| ConsoleError::BadValue)
}

/// Line console on stdin.
pub struct SerialConsole {
    lines: Receiver<String>,
}

impl SerialConsole {
    /// Start the reader thread on stdin.
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::sync_channel(LINE_QUEUE_DEPTH);
        std::thread::Builder::new()
            .name("console".into())
            .stack_size(READER_STACK_SIZE)
            .spawn(move || read_lines(std::io::stdin().lock(), &tx))?;
        info!("Console: ready (set <field> <value> | config <json> | save | show)");
        Ok(Self { lines: rx })
    }

    /// Console fed from an existing line channel.
    pub fn from_receiver(lines: Receiver<String>) -> Self {
        Self { lines }
    }

    /// Drain queued lines up to the first one that yields a command.
    pub fn poll(&self, current: &SystemConfig) -> Option<AppCommand> {
        while let Ok(line) = self.lines.try_recv() {
            match parse_line(&line, current) {
                Ok(Some(ConsoleRequest::Command(cmd))) => return Some(cmd),
                Ok(Some(ConsoleRequest::Show)) => match serde_json::to_string(current) {
                    Ok(json) => info!("CONSOLE | {}", json),
                    Err(e) => warn!("CONSOLE | config not printable: {}", e),
                },
                Ok(None) => {}
                Err(e) => warn!("CONSOLE | {}: {:?}", e, line),
            }
        }
        None
    }
}

/// Reader-thread body: forward complete lines until EOF or the control
/// loop drops its end.
fn read_lines(mut reader: impl BufRead, tx: &SyncSender<String>) {
    let mut line = String::new();
    loop {
        match reader.read_line(&mut line) {
            Ok(0) => {
                if !line.trim().is_empty() {
                    let _ = tx.try_send(line.trim().to_owned());
                }
                info!("Console: input closed");
                return;
            }
            // A non-blocking read can hand back part of a line; keep it.
            Ok(_) if !line.ends_with('\n') => {}
            Ok(_) => {
                match tx.try_send(line.trim().to_owned()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(dropped)) => {
                        warn!("Console: queue full, dropped {:?}", dropped);
                    }
                    Err(TrySendError::Disconnected(_)) => return,
                }
                line.clear();
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => {
                std::thread::sleep(IDLE_POLL);
            }
            Err(e) => {
                warn!("Console: read failed: {}", e);
                return;
            }
        }
    }
}
