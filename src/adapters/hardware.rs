//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the relay driver and exposes the ADC and the relays through
//! [`AnalogPort`] and [`RelayPort`].  This is the only module in the system
//! that touches actual hardware.  On non-espidf targets, the underlying
//! drivers use cfg-gated simulation stubs.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{AnalogPort, RelayPort};
use crate::drivers::relay::{HwRelayPin, RelayDriver};
use crate::meter::MeterId;
use crate::sensors::{AnalogChannel, adc};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P: OutputPin = HwRelayPin> {
    relays: RelayDriver<P>,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(relays: RelayDriver<P>) -> Self {
        Self { relays }
    }

    pub fn relays(&self) -> &RelayDriver<P> {
        &self.relays
    }
}

// ── AnalogPort implementation ─────────────────────────────────

impl<P: OutputPin> AnalogPort for HardwareAdapter<P> {
    fn read_raw(&mut self, channel: AnalogChannel) -> u16 {
        adc::read_raw(channel)
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl<P: OutputPin> RelayPort for HardwareAdapter<P> {
    fn set_meter(&mut self, meter: MeterId, closed: bool) {
        self.relays.set(meter, closed);
    }

    fn open_all(&mut self) {
        self.relays.open_all();
    }
}
