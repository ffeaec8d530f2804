//! Unified error types for the MeterSwitch firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform. All variants are `Copy` so they
//! can be passed through the switch controller without allocation.

use core::fmt;

use crate::meter::MeterId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The rotation schedule was given an impossible calendar input.
    Schedule(ScheduleError),
    /// The relay bank refused a command that would break the interlock.
    /// Always fatal: the caller must leave every relay open and halt.
    Interlock(InterlockViolation),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule(e) => write!(f, "schedule: {e}"),
            Self::Interlock(e) => write!(f, "interlock: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Calendar month outside 1–12.
    InvalidMonth(u8),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMonth(m) => write!(f, "month {m} outside 1-12"),
        }
    }
}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Interlock violations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterlockViolation {
    /// A relay close was requested while another meter is still connected.
    SecondMeterClosed { live: MeterId, requested: MeterId },
    /// A relay close was requested before the all-open gap had lasted
    /// the configured interlock delay.
    GapTooShort { elapsed_ms: u64, required_ms: u64 },
}

impl fmt::Display for InterlockViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecondMeterClosed { live, requested } => {
                write!(f, "meter {requested} requested while meter {live} is live")
            }
            Self::GapTooShort {
                elapsed_ms,
                required_ms,
            } => write!(
                f,
                "all-open gap {elapsed_ms} ms shorter than {required_ms} ms"
            ),
        }
    }
}

impl From<InterlockViolation> for Error {
    fn from(e: InterlockViolation) -> Self {
        Self::Interlock(e)
    }
}

// ---------------------------------------------------------------------------
// Supervisory faults
// ---------------------------------------------------------------------------

/// Conditions the safety supervisor reports.  They are latched in a
/// bitfield so several can be tracked at once.  None of them changes what
/// the switch controller does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Load current above the overload threshold.
    Overcurrent = 0b0000_0001,
    /// Current channel pinned at ADC full scale.
    CurrentSaturated = 0b0000_0010,
    /// Voltage channel pinned at ADC full scale.
    VoltageSaturated = 0b0000_0100,
}

impl SafetyFault {
    pub const ALL: [SafetyFault; 3] = [
        Self::Overcurrent,
        Self::CurrentSaturated,
        Self::VoltageSaturated,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overcurrent => write!(f, "overcurrent"),
            Self::CurrentSaturated => write!(f, "current channel saturated"),
            Self::VoltageSaturated => write!(f, "voltage channel saturated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
