//! ESP32 time adapter.
//!
//! Implements [`ClockPort`]: monotonic uptime for every elapsed-time
//! decision, plus the local calendar month (rotation schedule) and day
//! (usage totals).  The UTC offset is set by the service from config.
//!
//! - **`target_os = "espidf"`**: uptime from `esp_timer_get_time()`, wall
//!   clock from `gettimeofday()` (set by SNTP or the RTC collaborator).
//! - **`not(target_os = "espidf")`**: uptime from `std::time::Instant`;
//!   the wall clock is injected with [`Esp32TimeAdapter::set_wall_clock`].

use core::cell::Cell;

use ::time::{OffsetDateTime, UtcOffset};

use crate::app::ports::ClockPort;

/// Anything earlier than 2020-01-01 means the wall clock was never set.
pub const EPOCH_2020: i64 = 1_577_836_800;

/// `None` if the clock is obviously unsynced or the offset is out of range.
fn local_datetime(unix_secs: i64, utc_offset_secs: i32) -> Option<OffsetDateTime> {
    if unix_secs < EPOCH_2020 {
        return None;
    }
    let offset = UtcOffset::from_whole_seconds(utc_offset_secs).ok()?;
    Some(OffsetDateTime::from_unix_timestamp(unix_secs).ok()?.to_offset(offset))
}

/// Local calendar month (1–12) for a Unix timestamp.
pub fn month_from_unix(unix_secs: i64, utc_offset_secs: i32) -> Option<u8> {
    local_datetime(unix_secs, utc_offset_secs).map(|t| u8::from(t.month()))
}

/// Local day of the year (1–366) for a Unix timestamp.
pub fn day_from_unix(unix_secs: i64, utc_offset_secs: i32) -> Option<u16> {
    local_datetime(unix_secs, utc_offset_secs).map(|t| t.ordinal())
}

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    utc_offset_secs: Cell<i32>,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    wall_clock: Cell<Option<i64>>,
}

impl Esp32TimeAdapter {
    pub fn new(utc_offset_secs: i32) -> Self {
        Self {
            utc_offset_secs: Cell::new(utc_offset_secs),
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            wall_clock: Cell::new(None),
        }
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_secs.get()
    }

    /// Wall-clock seconds since the Unix epoch, if the clock has been set.
    #[cfg(target_os = "espidf")]
    pub fn unix_secs(&self) -> Option<i64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: gettimeofday only writes the provided struct.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        Some(i64::from(tv.tv_sec))
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn unix_secs(&self) -> Option<i64> {
        self.wall_clock.get()
    }

    /// Inject a wall-clock reading (host simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn set_wall_clock(&self, unix_secs: Option<i64>) {
        self.wall_clock.set(unix_secs);
    }
}

impl ClockPort for Esp32TimeAdapter {
    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn current_month(&self) -> Option<u8> {
        month_from_unix(self.unix_secs()?, self.utc_offset_secs.get())
    }

    fn local_day(&self) -> Option<u16> {
        day_from_unix(self.unix_secs()?, self.utc_offset_secs.get())
    }

    fn set_utc_offset(&self, utc_offset_secs: i32) {
        if self.utc_offset_secs.replace(utc_offset_secs) != utc_offset_secs {
            log::info!("Clock: UTC offset now {} s", utc_offset_secs);
        }
    }
}
