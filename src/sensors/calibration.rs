//! Affine ADC-code → physical-unit calibration.
//!
//! `value = raw * (reference_volts / max_raw) * scale`
//!
//! Codes above `max_raw` are clamped, so the conversion is monotonic
//! non-decreasing over the whole `u16` range and never negative.

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCalibration {
    /// ADC full-scale reference (V).
    pub reference_volts: f32,
    /// Highest code the converter returns.
    pub max_raw: u16,
    /// Transducer scale: physical units per volt at the ADC pin.
    pub scale: f32,
}

impl ChannelCalibration {
    /// Current channel calibration from the system config.
    pub fn current(config: &SystemConfig) -> Self {
        Self {
            reference_volts: config.adc_reference_volts,
            max_raw: config.adc_max_raw,
            scale: config.current_scale,
        }
    }

    /// Voltage channel calibration from the system config.
    pub fn voltage(config: &SystemConfig) -> Self {
        Self {
            reference_volts: config.adc_reference_volts,
            max_raw: config.adc_max_raw,
            scale: config.voltage_scale,
        }
    }

    /// Convert one raw code to physical units.
    pub fn convert(&self, raw: u16) -> f32 {
        if self.max_raw == 0 {
            return 0.0;
        }
        let code = raw.min(self.max_raw) as f32;
        let pin_volts = code * (self.reference_volts / self.max_raw as f32);
        (pin_volts * self.scale).max(0.0)
    }

    /// True if `raw` sits at (or beyond) the converter's full scale.
    pub fn is_saturated(&self, raw: u16) -> bool {
        raw >= self.max_raw
    }
}
