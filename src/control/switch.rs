//! Break-before-make meter switching.
//!
//! ```text
//!                 first target
//!  Disconnected ───────────────────────────────▶ Idle(active)
//!                                                 │      ▲
//!                        target != active         │      │  now - started_at
//!                        ── open all relays ──    │      │  >= interlock delay
//!                                                 ▼      │  ── close `to` ──
//!                                   Switching(from, to, started_at)
//! ```
//!
//! The interlock is a state, not a blocking wait: every tick the
//! controller checks the deadline and returns, so the rest of the control
//! loop keeps running while all relays are held open.  Targets that
//! arrive mid-switch are ignored; the in-flight switch completes first and
//! the next tick re-evaluates.
//!
//! The controller is the only writer of relay commands.  Every command
//! goes through [`RelayBank`], which refuses anything that would put two
//! meters live or shorten the all-open gap.

use log::{error, info};

use crate::app::ports::RelayPort;
use crate::config::SystemConfig;
use crate::error::InterlockViolation;
use crate::meter::MeterId;

use super::relays::RelayBank;

/// Switching state.  Exclusively owned by [`SwitchController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    /// Boot state: every relay open, no meter active.
    Disconnected,
    /// Exactly one relay closed.
    Idle { active: MeterId },
    /// All relays open, waiting out the interlock delay before closing `to`.
    Switching {
        from: MeterId,
        to: MeterId,
        started_at: u64,
    },
}

/// What a single [`SwitchController::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Nothing to do (target matches, or no target available).
    Unchanged,
    /// First connect from `Disconnected`; no interlock wait needed.
    Connected(MeterId),
    /// All relays opened; interlock window started.
    Started { from: MeterId, to: MeterId },
    /// Still inside the interlock window.
    Holding { to: MeterId, remaining_ms: u64 },
    /// Interlock elapsed and `to` was closed.
    Completed { from: MeterId, to: MeterId },
}

pub struct SwitchController {
    state: SwitchState,
    bank: RelayBank,
    interlock_ms: u64,
    /// Shorter delay requested mid-switch, applied once the switch completes.
    pending_interlock_ms: Option<u64>,
}

impl SwitchController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: SwitchState::Disconnected,
            bank: RelayBank::new(),
            interlock_ms: u64::from(config.interlock_delay_ms),
            pending_interlock_ms: None,
        }
    }

    /// Command every relay open and enter `Disconnected`.
    /// Must run before anything else touches the hardware.
    pub fn initialize(&mut self, relays: &mut impl RelayPort, now_ms: u64) {
        self.bank.open_all(relays, now_ms);
        self.state = SwitchState::Disconnected;
        info!("Relays: all open, no meter active");
    }

    /// Advance the state machine toward `target`.
    ///
    /// `None` means "no schedule this tick" (clock unsynced or month
    /// rejected); an in-flight switch still completes.
    pub fn update(
        &mut self,
        target: Option<MeterId>,
        now_ms: u64,
        relays: &mut impl RelayPort,
    ) -> Result<SwitchOutcome, InterlockViolation> {
        match self.state {
            SwitchState::Disconnected => {
                let Some(to) = target else {
                    return Ok(SwitchOutcome::Unchanged);
                };
                self.close_or_trip(relays, to, now_ms)?;
                self.state = SwitchState::Idle { active: to };
                info!("Meter {} connected", to);
                Ok(SwitchOutcome::Connected(to))
            }

            SwitchState::Idle { active } => match target {
                Some(to) if to != active => {
                    self.bank.open_all(relays, now_ms);
                    self.state = SwitchState::Switching {
                        from: active,
                        to,
                        started_at: now_ms,
                    };
                    info!(
                        "Switch {} -> {}: all relays open, holding {} ms",
                        active, to, self.interlock_ms
                    );
                    Ok(SwitchOutcome::Started { from: active, to })
                }
                _ => Ok(SwitchOutcome::Unchanged),
            },

            SwitchState::Switching {
                from,
                to,
                started_at,
            } => {
                let elapsed = now_ms.saturating_sub(started_at);
                if elapsed < self.interlock_ms {
                    return Ok(SwitchOutcome::Holding {
                        to,
                        remaining_ms: self.interlock_ms - elapsed,
                    });
                }
                self.close_or_trip(relays, to, now_ms)?;
                self.state = SwitchState::Idle { active: to };
                if let Some(ms) = self.pending_interlock_ms.take() {
                    self.interlock_ms = ms;
                }
                info!("Switch {} -> {} complete after {} ms", from, to, elapsed);
                Ok(SwitchOutcome::Completed { from, to })
            }
        }
    }

    /// Change the interlock delay.  A longer delay applies at once (it only
    /// extends an in-flight window); a shorter one waits until the
    /// in-flight switch has completed.
    pub fn set_interlock_delay(&mut self, delay_ms: u64) {
        if self.is_switching() && delay_ms < self.interlock_ms {
            self.pending_interlock_ms = Some(delay_ms);
        } else {
            self.interlock_ms = delay_ms;
            self.pending_interlock_ms = None;
        }
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// The connected meter; `None` while disconnected or switching.
    pub fn active_meter(&self) -> Option<MeterId> {
        match self.state {
            SwitchState::Idle { active } => Some(active),
            _ => None,
        }
    }

    pub fn is_switching(&self) -> bool {
        matches!(self.state, SwitchState::Switching { .. })
    }

    pub fn interlock_ms(&self) -> u64 {
        self.interlock_ms
    }

    /// Relays commanded closed right now (0 or 1).
    pub fn closed_relays(&self) -> usize {
        self.bank.closed_count()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Close `to` through the bank.  On refusal, open everything and drop
    /// to `Disconnected` before reporting.
    fn close_or_trip(
        &mut self,
        relays: &mut impl RelayPort,
        to: MeterId,
        now_ms: u64,
    ) -> Result<(), InterlockViolation> {
        if let Err(v) = self.bank.close(relays, to, now_ms, self.interlock_ms) {
            error!("INTERLOCK VIOLATION: {}; opening all relays", v);
            self.bank.open_all(relays, now_ms);
            self.state = SwitchState::Disconnected;
            return Err(v);
        }
        Ok(())
    }
}
