//! Serial stand-ins for the LCD and the telemetry uplink.
//!
//! The I²C LCD driver and the cloud client live with collaborators; until
//! they are wired in, both outputs go to the log so the board can be
//! commissioned over UART.

use log::{info, warn};

use crate::app::ports::{DisplayPort, TelemetryError, TelemetryPort};
use crate::display::DisplayLines;
use crate::telemetry::{STATUS_ROOT, StatusSnapshot, TelemetryRecord};

/// Renders the two LCD rows and logs them when they change.
#[derive(Default)]
pub struct SerialDisplay {
    last: Option<DisplayLines>,
}

impl SerialDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_lines(&self) -> Option<&DisplayLines> {
        self.last.as_ref()
    }
}

impl DisplayPort for SerialDisplay {
    fn present(&mut self, snapshot: &StatusSnapshot) {
        let lines = DisplayLines::render(snapshot);
        if self.last.as_ref() != Some(&lines) {
            info!("LCD | {} | {}", lines.top, lines.bottom);
            self.last = Some(lines);
        }
    }
}

/// Logs each record as the JSON body of the `system_status` node.
#[derive(Default)]
pub struct LogTelemetry {
    published: u32,
}

impl LogTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> u32 {
        self.published
    }
}

impl TelemetryPort for LogTelemetry {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        let body = record.to_json().map_err(|e| {
            warn!("Telemetry encode failed: {}", e);
            TelemetryError::Encoding
        })?;
        info!("PUT /{} {}", STATUS_ROOT, body);
        self.published += 1;
        Ok(())
    }
}

/// Both outputs in one value, for `AppService::tick`.
#[derive(Default)]
pub struct SerialOutputs {
    pub display: SerialDisplay,
    pub telemetry: LogTelemetry,
}

impl DisplayPort for SerialOutputs {
    fn present(&mut self, snapshot: &StatusSnapshot) {
        self.display.present(snapshot);
    }
}

impl TelemetryPort for SerialOutputs {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        self.telemetry.publish(record)
    }
}
