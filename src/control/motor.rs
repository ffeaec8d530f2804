//! Motor running detection from load current.
//!
//! [`MotorClassifier`] is the plain level comparison: `current > threshold`.
//! It keeps no state, so a load hovering at the threshold toggles the
//! reported state tick by tick.
//!
//! [`MotorDetector`] wraps the classifier with an optional release band.
//! With a band of 0 A (the default) it reports exactly what the
//! classifier reports.

use crate::config::SystemConfig;

/// Stateless threshold classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorClassifier {
    threshold_amps: f32,
}

impl MotorClassifier {
    pub fn new(threshold_amps: f32) -> Self {
        Self { threshold_amps }
    }

    /// `true` iff `current_amps` is strictly above the threshold.
    pub fn classify(&self, current_amps: f32) -> bool {
        current_amps > self.threshold_amps
    }

    pub fn threshold_amps(&self) -> f32 {
        self.threshold_amps
    }
}

/// Classifier plus an opt-in hysteresis band.
pub struct MotorDetector {
    classifier: MotorClassifier,
    hysteresis_amps: f32,
    running: bool,
}

impl MotorDetector {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            classifier: MotorClassifier::new(config.motor_threshold_amps),
            hysteresis_amps: config.motor_hysteresis_amps.max(0.0),
            running: false,
        }
    }

    /// Apply a new threshold/band; the current running state is kept.
    pub fn reconfigure(&mut self, config: &SystemConfig) {
        self.classifier = MotorClassifier::new(config.motor_threshold_amps);
        self.hysteresis_amps = config.motor_hysteresis_amps.max(0.0);
    }

    /// Evaluate one current reading and return the motor state.
    pub fn update(&mut self, current_amps: f32) -> bool {
        self.running = if self.running && self.hysteresis_amps > 0.0 {
            current_amps > self.classifier.threshold_amps() - self.hysteresis_amps
        } else {
            self.classifier.classify(current_amps)
        };
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
