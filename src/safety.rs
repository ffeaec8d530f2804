//! Safety supervisor.
//!
//! Runs every tick after sampling and accumulates a fault bitmask.  It
//! **reports only**: the switch controller's behaviour does not depend on
//! it, and no relay is opened or closed because of a fault here.
//!
//! ## Fault lifecycle
//!
//! 1. A condition triggers a fault (e.g. load current above 15 A).
//! 2. The supervisor sets the corresponding bit and logs it once.
//! 3. Each tick the condition is re-evaluated; when it clears, the bit is
//!    cleared and that is logged once too.

use crate::config::SystemConfig;
use crate::error::SafetyFault;
use crate::sensors::SensorSample;
use crate::sensors::calibration::ChannelCalibration;
use log::{error, info};

/// Safety supervisor.
pub struct SafetySupervisor {
    overcurrent_limit_amps: f32,
    current_cal: ChannelCalibration,
    voltage_cal: ChannelCalibration,
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            overcurrent_limit_amps: config.overcurrent_limit_amps,
            current_cal: ChannelCalibration::current(config),
            voltage_cal: ChannelCalibration::voltage(config),
            faults: 0,
        }
    }

    /// Pick up new limits; latched faults are re-evaluated next tick.
    pub fn reconfigure(&mut self, config: &SystemConfig) {
        self.overcurrent_limit_amps = config.overcurrent_limit_amps;
        self.current_cal = ChannelCalibration::current(config);
        self.voltage_cal = ChannelCalibration::voltage(config);
    }

    /// Evaluate all conditions against the latest sample.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, sample: &SensorSample) -> u8 {
        self.eval_fault(
            SafetyFault::Overcurrent,
            sample.current_amps > self.overcurrent_limit_amps,
        );
        self.eval_fault(
            SafetyFault::CurrentSaturated,
            self.current_cal.is_saturated(sample.current_raw),
        );
        self.eval_fault(
            SafetyFault::VoltageSaturated,
            self.voltage_cal.is_saturated(sample.voltage_raw),
        );
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
