//! MeterSwitch Firmware, main entry point.
//!
//! Hexagonal architecture with a fixed-rate control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32TimeAdapter│
//! │  (Analog+Relay)    (EventSink)    (Config)     (Clock)         │
//! │  SerialOutputs (Display+Telemetry)   SerialConsole (commands)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Sensors · Motor · Safety · Rotation · Switch          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{error, info, warn};

use meterswitch::adapters::console::SerialConsole;
use meterswitch::adapters::hardware::HardwareAdapter;
use meterswitch::adapters::log_sink::LogEventSink;
use meterswitch::adapters::nvs::NvsAdapter;
use meterswitch::adapters::presenters::SerialOutputs;
use meterswitch::adapters::time::Esp32TimeAdapter;
use meterswitch::app::ports::{ClockPort, RelayPort};
use meterswitch::app::service::AppService;
use meterswitch::config::SystemConfig;
use meterswitch::drivers::relay::RelayDriver;
use meterswitch::drivers::{hw_init, watchdog};

fn main() -> Result<()> {
    // ── 1. Relays to the safe state, before anything else ─────
    esp_idf_svc::sys::link_patches();
    let relay_init = hw_init::init_relay_outputs();

    // ── 2. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  MeterSwitch v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    if let Err(e) = relay_init {
        // Relay pins in an unknown state: never run the control loop.
        error!("Relay GPIO init failed: {}; halting", e);
        return Err(e.into());
    }
    hw_init::init_adc()?;

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = nvs
        .as_ref()
        .map_or_else(SystemConfig::default, NvsAdapter::load_or_default);
    info!(
        "Config: period={} month(s), interlock={} ms, loop={} ms",
        config.rotation_period_months, config.interlock_delay_ms, config.control_loop_interval_ms
    );

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(RelayDriver::board());
    let clock = Esp32TimeAdapter::new(config.utc_offset_secs);
    let mut outputs = SerialOutputs::default();
    let mut log_sink = LogEventSink::new();
    let mut watchdog = watchdog::Watchdog::new(watchdog::timeout_for_interval(
        config.control_loop_interval_ms,
    ));
    let console = match SerialConsole::spawn() {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("Console thread failed to start ({}), runtime config disabled", e);
            None
        }
    };

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(config);
    app.start(&mut hw, &clock, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        if let Err(e) = app.tick(&clock, &mut hw, &mut outputs, &mut log_sink) {
            hw.open_all();
            error!("FATAL: {}; all relays open, control loop halted", e);
            if let Some(nvs) = nvs.as_ref() {
                app.force_save_if_dirty(nvs);
            }
            break;
        }

        if let Some(cmd) = console.as_ref().and_then(|c| c.poll(app.config())) {
            app.handle_command(cmd, &clock, &mut log_sink);
        }

        if let Some(nvs) = nvs.as_ref() {
            app.auto_save_if_needed(nvs, clock.uptime_ms());
        }

        // The loop period is live config; the watchdog window follows it.
        let interval_ms = app.loop_interval_ms();
        watchdog.follow_interval(interval_ms);
        watchdog.feed();
        FreeRtos::delay_ms(interval_ms);
    }

    // Halted with every relay open.  Keep feeding the watchdog so the
    // device stays in this state until someone power-cycles it.
    let interval_ms = app.loop_interval_ms();
    loop {
        watchdog.feed();
        FreeRtos::delay_ms(interval_ms);
    }
}
