//! Daily motor run time and load energy.
//!
//! Energy is the apparent-power integral `V·I·dt`; the feed has no
//! power-factor measurement.  Each tick's sample and motor state stand for
//! the whole gap back to the previous tick.
//!
//! Totals reset when the local calendar day changes.  While the wall clock
//! is unsynchronised they keep accumulating.

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Default)]
pub struct UsageTracker {
    runtime_ms: u64,
    energy_wh: f64,
    last_ms: Option<u64>,
    day: Option<u16>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for the interval since the previous call.
    pub fn update(
        &mut self,
        now_ms: u64,
        local_day: Option<u16>,
        motor_running: bool,
        voltage_volts: f32,
        current_amps: f32,
    ) {
        if let Some(day) = local_day {
            if matches!(self.day, Some(prev) if prev != day) {
                log::info!(
                    "Usage: day rollover ({:.2} h, {:.3} kWh)",
                    self.runtime_hours(),
                    self.energy_kwh()
                );
                self.runtime_ms = 0;
                self.energy_wh = 0.0;
            }
            self.day = Some(day);
        }

        let Some(last) = self.last_ms.replace(now_ms) else {
            return;
        };
        let dt_ms = now_ms.saturating_sub(last);
        if motor_running {
            self.runtime_ms += dt_ms;
        }
        let watts = f64::from(voltage_volts) * f64::from(current_amps);
        self.energy_wh += watts * dt_ms as f64 / MS_PER_HOUR;
    }

    /// Motor run time today, in hours.
    pub fn runtime_hours(&self) -> f32 {
        (self.runtime_ms as f64 / MS_PER_HOUR) as f32
    }

    /// Load energy today, in kWh.
    pub fn energy_kwh(&self) -> f32 {
        (self.energy_wh / 1_000.0) as f32
    }
}
