//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (log to serial, forward upstream).

use crate::error::{InterlockViolation, ScheduleError};
use crate::meter::MeterId;
use crate::telemetry::TelemetryRecord;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started; every relay is open.
    Started,

    /// A meter was connected straight from the disconnected boot state.
    MeterConnected(MeterId),

    /// All relays opened; interlock window running toward `to`.
    SwitchStarted { from: MeterId, to: MeterId },

    /// Interlock elapsed; `to` is now the active meter.
    SwitchCompleted { from: MeterId, to: MeterId },

    /// The relay bank refused a command.  Fatal.
    InterlockFault(InterlockViolation),

    /// The calendar input could not be mapped to a meter.
    ScheduleRejected(ScheduleError),

    /// The motor running state flipped.
    MotorChanged { running: bool },

    /// One or more supervisory faults were raised (full bitmask).
    FaultDetected(u8),

    /// All supervisory faults have cleared.
    FaultCleared,

    /// A telemetry record was handed to the publisher.
    Telemetry(TelemetryRecord),

    /// A new configuration was accepted at runtime.
    ConfigUpdated,

    /// A runtime configuration was refused.
    ConfigRejected(&'static str),
}
