//! Raw ADC reads for the two transducer channels.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use super::AnalogChannel;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_CURRENT_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_VOLTAGE_ADC: AtomicU16 = AtomicU16::new(0);

/// Inject a raw code for `channel` (host simulation only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_raw(channel: AnalogChannel, raw: u16) {
    sim_cell(channel).store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
fn sim_cell(channel: AnalogChannel) -> &'static AtomicU16 {
    match channel {
        AnalogChannel::Current => &SIM_CURRENT_ADC,
        AnalogChannel::Voltage => &SIM_VOLTAGE_ADC,
    }
}

#[cfg(target_os = "espidf")]
pub fn read_raw(channel: AnalogChannel) -> u16 {
    let ch = match channel {
        AnalogChannel::Current => crate::pins::CURRENT_ADC_CHANNEL,
        AnalogChannel::Voltage => crate::pins::VOLTAGE_ADC_CHANNEL,
    };
    hw_init::adc1_read(ch)
}

#[cfg(not(target_os = "espidf"))]
pub fn read_raw(channel: AnalogChannel) -> u16 {
    sim_cell(channel).load(Ordering::Relaxed)
}
