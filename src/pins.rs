//! GPIO / peripheral pin assignments for the MeterSwitch board (ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

use crate::meter::MeterId;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// SCT-013 current transformer (30 A / 1 V) via burden + bias network.
/// ADC1 channel 6 (GPIO 34, input-only).
pub const CURRENT_ADC_GPIO: i32 = 34;
pub const CURRENT_ADC_CHANNEL: u32 = 6;

/// ZMPT101B mains voltage transformer module.
/// ADC1 channel 7 (GPIO 35, input-only).
pub const VOLTAGE_ADC_GPIO: i32 = 35;
pub const VOLTAGE_ADC_CHANNEL: u32 = 7;

// ---------------------------------------------------------------------------
// Relay outputs: ACTIVE LOW
// ---------------------------------------------------------------------------
//
// LOW  = coil energised = meter connected.
// HIGH = coil released  = meter disconnected.
//
// Inverting this leaves meters permanently live or permanently dead.

pub const RELAY_METER1_GPIO: i32 = 26;
pub const RELAY_METER2_GPIO: i32 = 27;
pub const RELAY_METER3_GPIO: i32 = 14;

/// Motor contactor relay. Never driven by the rotation logic; held open.
pub const RELAY_MOTOR_GPIO: i32 = 13;

/// Every relay output, meters first. Used by the boot-time safe-state write.
pub const ALL_RELAY_GPIOS: [i32; 4] = [
    RELAY_METER1_GPIO,
    RELAY_METER2_GPIO,
    RELAY_METER3_GPIO,
    RELAY_MOTOR_GPIO,
];

/// Relay GPIO for a given meter.
pub const fn relay_gpio(meter: MeterId) -> i32 {
    match meter {
        MeterId::One => RELAY_METER1_GPIO,
        MeterId::Two => RELAY_METER2_GPIO,
        MeterId::Three => RELAY_METER3_GPIO,
    }
}

// ---------------------------------------------------------------------------
// Peripherals owned by collaborators (LCD, SD card, RTC)
// ---------------------------------------------------------------------------

/// I²C bus shared by the 16×2 LCD (0x27) and the DS3231 RTC.
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const LCD_I2C_ADDR: u8 = 0x27;

/// SD card chip-select on VSPI.
pub const SD_CS_GPIO: i32 = 5;
