//! Commanded relay-bank state with interlock enforcement.
//!
//! [`RelayBank`] mirrors what has been commanded to the three meter relays
//! and refuses any close that would break the interlock:
//!
//! - a second meter while one is already connected, or
//! - any meter before the all-open gap has lasted the interlock delay.
//!
//! A refused close is returned as an [`InterlockViolation`]; nothing is
//! written to the hardware in that case.

use crate::app::ports::RelayPort;
use crate::error::InterlockViolation;
use crate::meter::MeterId;

#[derive(Debug, Default)]
pub struct RelayBank {
    /// The one meter commanded closed, if any.
    closed: Option<MeterId>,
    /// Uptime at which a live meter was last disconnected.  `None` until
    /// the first break, so the very first connect after boot needs no gap.
    broken_at: Option<u64>,
}

impl RelayBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command every relay open.
    pub fn open_all(&mut self, port: &mut impl RelayPort, now_ms: u64) {
        port.open_all();
        if self.closed.take().is_some() {
            self.broken_at = Some(now_ms);
        }
    }

    /// Command `meter` closed, subject to the interlock.
    pub fn close(
        &mut self,
        port: &mut impl RelayPort,
        meter: MeterId,
        now_ms: u64,
        min_gap_ms: u64,
    ) -> Result<(), InterlockViolation> {
        if let Some(live) = self.closed {
            if live == meter {
                return Ok(());
            }
            return Err(InterlockViolation::SecondMeterClosed {
                live,
                requested: meter,
            });
        }
        if let Some(broken_at) = self.broken_at {
            let elapsed_ms = now_ms.saturating_sub(broken_at);
            if elapsed_ms < min_gap_ms {
                return Err(InterlockViolation::GapTooShort {
                    elapsed_ms,
                    required_ms: min_gap_ms,
                });
            }
        }
        port.set_meter(meter, true);
        self.closed = Some(meter);
        Ok(())
    }

    /// Number of relays commanded closed (0 or 1 by construction).
    pub fn closed_count(&self) -> usize {
        usize::from(self.closed.is_some())
    }

    /// Uptime of the most recent break, if any.
    pub fn broken_at(&self) -> Option<u64> {
        self.broken_at
    }
}
