//! Meter identity.
//!
//! The installation has exactly three meters, each behind its own relay.
//! [`MeterId`] is the only way to name one, so an out-of-range meter number
//! can never reach the relay bank.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the three physical meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum MeterId {
    One = 1,
    Two = 2,
    Three = 3,
}

impl MeterId {
    /// Total number of meters, used to size relay arrays.
    pub const COUNT: usize = 3;

    /// Every meter in rotation order.
    pub const ALL: [MeterId; Self::COUNT] = [Self::One, Self::Two, Self::Three];

    /// Meter number as printed on the panel (1–3).
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Zero-based slot in relay arrays.
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

impl TryFrom<u8> for MeterId {
    type Error = InvalidMeter;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(InvalidMeter(other)),
        }
    }
}

impl From<MeterId> for u8 {
    fn from(m: MeterId) -> Self {
        m.number()
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A meter number outside 1–3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMeter(pub u8);

impl fmt::Display for InvalidMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no meter numbered {}", self.0)
    }
}
