//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  The SD-card
//! logger and the cloud uplink would implement the same trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::SafetyFault;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | all relays open"),
            AppEvent::MeterConnected(m) => info!("METER | {} connected", m),
            AppEvent::SwitchStarted { from, to } => info!("SWITCH | {} -> {} (gap)", from, to),
            AppEvent::SwitchCompleted { from, to } => info!("SWITCH | {} -> {} done", from, to),
            AppEvent::InterlockFault(v) => error!("INTERLOCK | {}", v),
            AppEvent::ScheduleRejected(e) => warn!("SCHEDULE | {}", e),
            AppEvent::MotorChanged { running } => {
                info!("MOTOR | {}", if *running { "ON" } else { "OFF" });
            }
            AppEvent::FaultDetected(flags) => {
                for fault in SafetyFault::ALL.iter().filter(|f| flags & f.mask() != 0) {
                    warn!("FAULT | {} (flags=0b{:08b})", fault, flags);
                }
            }
            AppEvent::FaultCleared => info!("FAULT | all cleared"),
            AppEvent::Telemetry(t) => info!(
                "TELEM | V={:.1} I={:.2} meter={} motor={} run={:.2}h E={:.3}kWh",
                t.voltage,
                t.current,
                t.active_meter.map_or(0, u8::from),
                t.motor_status.as_str(),
                t.total_runtime_today,
                t.energy_kwh,
            ),
            AppEvent::ConfigUpdated => info!("CONFIG | updated"),
            AppEvent::ConfigRejected(reason) => warn!("CONFIG | rejected: {}", reason),
        }
    }
}
