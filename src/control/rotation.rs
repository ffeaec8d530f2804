//! Calendar-month rotation schedule.
//!
//! ```text
//!   month:  1  2  3  4  5  6  7  8  9 10 11 12
//!   meter:  1  2  3  1  2  3  1  2  3  1  2  3     (period = 1)
//!   meter:  1  1  2  2  3  3  1  1  2  2  3  3     (period = 2)
//! ```
//!
//! Pure function of the month; no state.  The month is shifted to zero
//! base before the modulo, so the naive `month % 3 == 0` case (meter 0)
//! cannot occur.

use crate::config::SystemConfig;
use crate::error::ScheduleError;
use crate::meter::MeterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleResolver {
    period_months: u8,
}

impl Default for ScheduleResolver {
    fn default() -> Self {
        Self { period_months: 1 }
    }
}

impl ScheduleResolver {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            period_months: config.rotation_period_months.max(1),
        }
    }

    /// Meter that should carry the load during `month` (1–12).
    pub fn resolve(&self, month: u8) -> Result<MeterId, ScheduleError> {
        if !(1..=12).contains(&month) {
            return Err(ScheduleError::InvalidMonth(month));
        }
        let slot = (month - 1) / self.period_months;
        let idx = usize::from(slot) % MeterId::COUNT;
        MeterId::from_index(idx).ok_or(ScheduleError::InvalidMonth(month))
    }

    pub fn period_months(&self) -> u8 {
        self.period_months
    }
}
