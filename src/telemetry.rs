//! Status snapshot and the telemetry record built from it.
//!
//! The snapshot is assembled every tick and handed to the display; the
//! telemetry record is the same data under the backend's key names,
//! published on a slower, elapsed-time-gated cadence.
//!
//! | Key            | Type        | Notes                                  |
//! |----------------|-------------|----------------------------------------|
//! | `voltage`      | float (V)   |                                        |
//! | `current`      | float (A)   |                                        |
//! | `active_meter` | int or null | null while switching / before connect  |
//! | `motor_status` | `"ON"/"OFF"`|                                        |
//! | `total_runtime_today` | float (h) | motor run time, local day        |
//! | `energy_kwh`   | float (kWh) | apparent energy, local day             |

use serde::{Deserialize, Serialize};

use crate::meter::MeterId;

/// Root under which the backend groups the status keys.
pub const STATUS_ROOT: &str = "system_status";

/// Per-tick aggregate handed to presentation and telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusSnapshot {
    pub current_amps: f32,
    pub voltage_volts: f32,
    pub active_meter: Option<MeterId>,
    pub motor_running: bool,
    pub runtime_today_hours: f32,
    pub energy_today_kwh: f32,
}

/// Motor state as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorStatus {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl MotorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl From<bool> for MotorStatus {
    fn from(running: bool) -> Self {
        if running { Self::On } else { Self::Off }
    }
}

/// Wire form of a [`StatusSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub voltage: f32,
    pub current: f32,
    pub active_meter: Option<MeterId>,
    pub motor_status: MotorStatus,
    pub total_runtime_today: f32,
    pub energy_kwh: f32,
}

impl From<&StatusSnapshot> for TelemetryRecord {
    fn from(s: &StatusSnapshot) -> Self {
        Self {
            voltage: s.voltage_volts,
            current: s.current_amps,
            active_meter: s.active_meter,
            motor_status: s.motor_running.into(),
            total_runtime_today: s.runtime_today_hours,
            energy_kwh: s.energy_today_kwh,
        }
    }
}

impl TelemetryRecord {
    /// JSON object body for the `system_status` node.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Elapsed-time gate for the telemetry cadence.
///
/// Not a queue: a missed or failed publish is simply not retried until
/// the next interval has elapsed.
pub struct TelemetryGate {
    interval_ms: u64,
    last_ms: u64,
}

impl TelemetryGate {
    /// The first interval is measured from boot (uptime 0).
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            last_ms: 0,
        }
    }

    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = u64::from(interval_ms);
    }

    /// Strictly more than one interval since the last publish.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_ms) > self.interval_ms
    }

    /// Record a publish attempt at `now_ms`.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }
}
