//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (ADC, relays, clock, presenters, storage) implement these
//! traits.  The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::SystemConfig;
use crate::meter::MeterId;
use crate::sensors::AnalogChannel;
use crate::telemetry::{StatusSnapshot, TelemetryRecord};

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw ADC access.  Calibration happens in the domain
/// ([`SensorReader`](crate::sensors::SensorReader)), not in the adapter.
pub trait AnalogPort {
    /// One raw conversion on `channel`, in ADC codes.
    fn read_raw(&mut self, channel: AnalogChannel) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the meter relays.
///
/// Only the [`SwitchController`](crate::control::switch::SwitchController)
/// holds a path to this port during normal operation.  Implementations
/// own the active-low polarity; callers speak in closed/open.
pub trait RelayPort {
    /// Connect (`true`) or disconnect (`false`) one meter.
    fn set_meter(&mut self, meter: MeterId, closed: bool);

    /// Disconnect every meter relay and the motor relay.
    fn open_all(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic uptime plus the local calendar.
///
/// The local-time offset is owned by the configuration; the service pushes
/// it in through [`set_utc_offset`](Self::set_utc_offset) at start and on
/// every accepted config change.
pub trait ClockPort {
    /// Milliseconds since boot (monotonic).
    fn uptime_ms(&self) -> u64;

    /// Calendar month (1–12) in local time, `None` while the wall clock
    /// is not synchronised.
    fn current_month(&self) -> Option<u8>;

    /// Day of the year (1–366) in local time, `None` while unsynchronised.
    fn local_day(&self) -> Option<u16>;

    fn set_utc_offset(&self, utc_offset_secs: i32);
}

// ───────────────────────────────────────────────────────────────
// Presentation ports (collaborators)
// ───────────────────────────────────────────────────────────────

/// Local display.  Receives every tick's snapshot.
pub trait DisplayPort {
    fn present(&mut self, snapshot: &StatusSnapshot);
}

/// Cloud telemetry.  Called on the slower telemetry cadence only.
pub trait TelemetryPort {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST call [`SystemConfig::validate`] before persisting.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`TelemetryPort::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// No network path to the backend right now.
    Offline,
    /// The payload could not be encoded.
    Encoding,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Offline => write!(f, "offline"),
            Self::Encoding => write!(f, "encoding failed"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::Corrupted => Self::Config("stored config corrupted"),
            ConfigError::IoError => Self::Config("config storage I/O error"),
        }
    }
}
