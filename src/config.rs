//! System configuration parameters
//!
//! All tunable parameters for the MeterSwitch system.
//! Values can be overridden via NVS (non-volatile storage) or at runtime
//! through [`AppCommand::UpdateConfig`](crate::app::commands::AppCommand).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- ADC calibration ---
    /// ADC full-scale reference voltage (V)
    pub adc_reference_volts: f32,
    /// Highest raw code the ADC can return (4095 for 12-bit)
    pub adc_max_raw: u16,
    /// Current transducer scale (A per volt at the ADC pin)
    pub current_scale: f32,
    /// Voltage transducer scale (mains V per volt at the ADC pin)
    pub voltage_scale: f32,

    // --- Motor detection ---
    /// Current above which the motor counts as running (A)
    pub motor_threshold_amps: f32,
    /// Release band below the threshold while running (A). 0 = no hysteresis.
    pub motor_hysteresis_amps: f32,

    // --- Rotation ---
    /// Consecutive calendar months each meter carries the load (1, 2 or 4)
    pub rotation_period_months: u8,
    /// All-relays-open hold between disconnecting one meter and connecting the next (ms)
    pub interlock_delay_ms: u32,

    // --- Supervision ---
    /// Overload threshold (A). Reported as a fault, never acted upon.
    pub overcurrent_limit_amps: f32,

    // --- Time ---
    /// Local-time offset from UTC (seconds), used to derive the calendar month
    pub utc_offset_secs: i32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry publish interval (milliseconds)
    pub telemetry_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Calibration (SCT-013 30A/1V, ZMPT101B, 12-bit ADC at 3.3 V)
            adc_reference_volts: 3.3,
            adc_max_raw: 4095,
            current_scale: 30.0,
            voltage_scale: 250.0,

            // Motor
            motor_threshold_amps: 1.0,
            motor_hysteresis_amps: 0.0,

            // Rotation
            rotation_period_months: 1,
            interlock_delay_ms: 5_000,

            // Supervision
            overcurrent_limit_amps: 15.0,

            // IST
            utc_offset_secs: 19_800,

            // Timing
            control_loop_interval_ms: 1_000, // 1 Hz
            telemetry_interval_ms: 5_000,    // every 5 s
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1.0..=5.0).contains(&self.adc_reference_volts) {
            return Err(ConfigError::ValidationFailed(
                "adc_reference_volts must be 1.0–5.0",
            ));
        }
        if self.adc_max_raw == 0 {
            return Err(ConfigError::ValidationFailed("adc_max_raw must be non-zero"));
        }
        if !(self.current_scale > 0.0 && self.current_scale <= 1000.0) {
            return Err(ConfigError::ValidationFailed(
                "current_scale must be in (0, 1000]",
            ));
        }
        if !(self.voltage_scale > 0.0 && self.voltage_scale <= 1000.0) {
            return Err(ConfigError::ValidationFailed(
                "voltage_scale must be in (0, 1000]",
            ));
        }
        if !(0.0..=100.0).contains(&self.motor_threshold_amps) {
            return Err(ConfigError::ValidationFailed(
                "motor_threshold_amps must be 0–100",
            ));
        }
        if !(0.0..=self.motor_threshold_amps).contains(&self.motor_hysteresis_amps) {
            return Err(ConfigError::ValidationFailed(
                "motor_hysteresis_amps must be between 0 and motor_threshold_amps",
            ));
        }
        if !matches!(self.rotation_period_months, 1 | 2 | 4) {
            return Err(ConfigError::ValidationFailed(
                "rotation_period_months must be 1, 2 or 4",
            ));
        }
        if !(1_000..=60_000).contains(&self.interlock_delay_ms) {
            return Err(ConfigError::ValidationFailed(
                "interlock_delay_ms must be 1000–60000",
            ));
        }
        if !(self.overcurrent_limit_amps > self.motor_threshold_amps) {
            return Err(ConfigError::ValidationFailed(
                "overcurrent_limit_amps must exceed motor_threshold_amps",
            ));
        }
        if !(-43_200..=50_400).contains(&self.utc_offset_secs) {
            return Err(ConfigError::ValidationFailed(
                "utc_offset_secs must be within UTC-12..UTC+14",
            ));
        }
        if !(100..=10_000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–10000",
            ));
        }
        if self.telemetry_interval_ms < self.control_loop_interval_ms
            || self.telemetry_interval_ms > 3_600_000
        {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_ms must be between the control interval and 1 h",
            ));
        }
        Ok(())
    }
}
