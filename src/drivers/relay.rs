//! Active-low relay bank driver (3 meter relays + motor contactor).
//!
//! Generic over [`embedded_hal::digital::OutputPin`] so the coil logic can
//! be exercised on host with mock pins.  On the board each pin is an
//! [`HwRelayPin`] writing through `hw_init::gpio_write`.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  It does not know about the interlock;
//! the switch controller is the only caller allowed to close a meter.
//! The motor contactor is opened at construction and never closed.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::drivers::hw_init;
use crate::meter::MeterId;
use crate::pins;

/// One relay output wired to a board GPIO (configured by `hw_init`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwRelayPin(pub i32);

impl ErrorType for HwRelayPin {
    type Error = Infallible;
}

impl OutputPin for HwRelayPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, true);
        Ok(())
    }
}

pub struct RelayDriver<P: OutputPin> {
    meters: [P; MeterId::COUNT],
    motor: P,
    energised: [bool; MeterId::COUNT],
}

impl RelayDriver<HwRelayPin> {
    /// Driver over the board's relay GPIOs.
    pub fn board() -> Self {
        Self::new(
            [
                HwRelayPin(pins::relay_gpio(MeterId::One)),
                HwRelayPin(pins::relay_gpio(MeterId::Two)),
                HwRelayPin(pins::relay_gpio(MeterId::Three)),
            ],
            HwRelayPin(pins::RELAY_MOTOR_GPIO),
        )
    }
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take ownership of the pins and release every coil.
    pub fn new(meters: [P; MeterId::COUNT], motor: P) -> Self {
        let mut driver = Self {
            meters,
            motor,
            energised: [false; MeterId::COUNT],
        };
        driver.open_all();
        driver
    }

    /// Energise (LOW) or release (HIGH) one meter relay.
    pub fn set(&mut self, meter: MeterId, closed: bool) {
        let pin = &mut self.meters[meter.index()];
        let res = if closed { pin.set_low() } else { pin.set_high() };
        if res.is_err() {
            log::error!("Relay {}: pin write failed", meter);
            return;
        }
        self.energised[meter.index()] = closed;
    }

    /// Release every meter relay and the motor contactor.
    pub fn open_all(&mut self) {
        for meter in MeterId::ALL {
            self.set(meter, false);
        }
        self.release_motor();
    }

    pub fn is_closed(&self, meter: MeterId) -> bool {
        self.energised[meter.index()]
    }

    pub fn closed_count(&self) -> usize {
        self.energised.iter().filter(|&&c| c).count()
    }

    fn release_motor(&mut self) {
        if self.motor.set_high().is_err() {
            log::error!("Motor relay: pin write failed");
        }
    }
}
