//! 16×2 character-LCD layout for the status snapshot.
//!
//! ```text
//!   ┌────────────────┐
//!   │V:231 C:5.5     │
//!   │Meter: 2        │
//!   └────────────────┘
//! ```
//!
//! Only the text is produced here; pushing it to the panel is the
//! display adapter's job.

use core::fmt::Write;

use heapless::String;

use crate::telemetry::StatusSnapshot;

/// Characters per LCD row.
pub const LCD_COLS: usize = 16;

/// The two rendered rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLines {
    pub top: String<LCD_COLS>,
    pub bottom: String<LCD_COLS>,
}

impl DisplayLines {
    /// Voltage rounded to whole volts, current to one decimal, meter number
    /// (`-` while no meter is connected).
    pub fn render(snapshot: &StatusSnapshot) -> Self {
        let mut top = String::new();
        let mut bottom = String::new();
        // Calibration limits readings to 5000 V/A, so both rows fit in 16
        // columns.  On overflow the fragment is dropped and the row stays valid.
        let fits = write!(
            top,
            "V:{:.0} C:{:.1}",
            snapshot.voltage_volts, snapshot.current_amps
        );
        debug_assert!(fits.is_ok(), "LCD top row overflow");
        let fits = match snapshot.active_meter {
            Some(m) => write!(bottom, "Meter: {}", m),
            None => write!(bottom, "Meter: -"),
        };
        debug_assert!(fits.is_ok(), "LCD bottom row overflow");
        Self { top, bottom }
    }
}
