//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stalls.  The timeout is derived
//! from the loop interval so a slower configured loop does not trip it.
//!
//! The main loop must call `feed()` on every control tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Never arm the TWDT tighter than this.
pub const MIN_TIMEOUT_MS: u32 = 10_000;

/// Watchdog timeout for a given control loop interval.
pub fn timeout_for_interval(control_loop_interval_ms: u32) -> u32 {
    control_loop_interval_ms
        .saturating_mul(5)
        .max(MIN_TIMEOUT_MS)
}

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    log::info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self {
                    timeout_ms,
                    subscribed,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op ({} ms)", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Re-arm for a new control loop interval.  Returns `true` if the
    /// timeout changed.
    pub fn follow_interval(&mut self, control_loop_interval_ms: u32) -> bool {
        let timeout_ms = timeout_for_interval(control_loop_interval_ms);
        if timeout_ms == self.timeout_ms {
            return false;
        }

        #[cfg(target_os = "espidf")]
        {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
            if ret != ESP_OK {
                log::warn!("Watchdog: reconfigure to {} ms failed ({})", timeout_ms, ret);
                return false;
            }
        }

        log::info!("Watchdog: timeout {} -> {} ms", self.timeout_ms, timeout_ms);
        self.timeout_ms = timeout_ms;
        true
    }

    /// Feed the watchdog. Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
