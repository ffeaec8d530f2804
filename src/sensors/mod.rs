//! Sensor subsystem: raw ADC access and the calibrating [`SensorReader`].
//!
//! The reader owns the per-channel calibration and produces one
//! [`SensorSample`] per control tick from an [`AnalogPort`].  A
//! disconnected transducer reads as a low or zero value; there is no
//! error path.

pub mod adc;
pub mod calibration;

use serde::{Deserialize, Serialize};

use crate::app::ports::AnalogPort;
use crate::config::SystemConfig;
use calibration::ChannelCalibration;

/// The two analog inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogChannel {
    Current,
    Voltage,
}

/// One calibrated reading of both channels.  Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSample {
    /// Load current (A), ≥ 0.
    pub current_amps: f32,
    /// Mains voltage (V), ≥ 0.
    pub voltage_volts: f32,
    /// Uptime at which the sample was taken (ms).
    pub sampled_at: u64,
    /// Raw current code, kept for saturation checks.
    pub current_raw: u16,
    /// Raw voltage code, kept for saturation checks.
    pub voltage_raw: u16,
}

/// Converts raw ADC codes into physical units.
pub struct SensorReader {
    current: ChannelCalibration,
    voltage: ChannelCalibration,
}

impl SensorReader {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            current: ChannelCalibration::current(config),
            voltage: ChannelCalibration::voltage(config),
        }
    }

    /// Swap in new calibration constants (config hot-reload).
    pub fn reconfigure(&mut self, config: &SystemConfig) {
        *self = Self::new(config);
    }

    /// Read both channels and convert.
    pub fn sample(&self, adc: &mut impl AnalogPort, now_ms: u64) -> SensorSample {
        let current_raw = adc.read_raw(AnalogChannel::Current);
        let voltage_raw = adc.read_raw(AnalogChannel::Voltage);
        SensorSample {
            current_amps: self.current.convert(current_raw),
            voltage_volts: self.voltage.convert(voltage_raw),
            sampled_at: now_ms,
            current_raw,
            voltage_raw,
        }
    }

    /// Calibrated current for a raw code.
    pub fn read_current(&self, raw: u16) -> f32 {
        self.current.convert(raw)
    }

    /// Calibrated voltage for a raw code.
    pub fn read_voltage(&self, raw: u16) -> f32 {
        self.voltage.convert(raw)
    }
}
