//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the control pipeline and the live configuration.
//! It exposes a hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, so the whole service runs against mock adapters
//! in host tests.
//!
//! ```text
//!  AnalogPort ──▶ ┌──────────────────────────────┐ ──▶ DisplayPort
//!   ClockPort ──▶ │          AppService           │ ──▶ TelemetryPort
//!   RelayPort ◀── │ sensors · motor · safety ·    │ ──▶ EventSink
//!                 │ rotation · switch · telemetry │
//!                 └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::motor::MotorDetector;
use crate::control::rotation::ScheduleResolver;
use crate::control::switch::{SwitchController, SwitchOutcome, SwitchState};
use crate::control::usage::UsageTracker;
use crate::error::{Result, ScheduleError};
use crate::meter::MeterId;
use crate::safety::SafetySupervisor;
use crate::sensors::{SensorReader, SensorSample};
use crate::telemetry::{StatusSnapshot, TelemetryGate, TelemetryRecord};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    AnalogPort, ClockPort, ConfigError, ConfigPort, DisplayPort, EventSink, RelayPort,
    TelemetryPort,
};

/// Debounce between the last config change and the NVS write.
const AUTO_SAVE_DELAY_MS: u64 = 5_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    sensors: SensorReader,
    motor: MotorDetector,
    schedule: ScheduleResolver,
    switch: SwitchController,
    safety: SafetySupervisor,
    telemetry: TelemetryGate,
    usage: UsageTracker,
    last_sample: SensorSample,
    /// Last rejected calendar input, so a bad month is reported once.
    rejected: Option<ScheduleError>,
    tick_count: u64,
    config_dirty: bool,
    dirty_since_ms: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the relays; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            sensors: SensorReader::new(&config),
            motor: MotorDetector::new(&config),
            schedule: ScheduleResolver::new(&config),
            switch: SwitchController::new(&config),
            safety: SafetySupervisor::new(&config),
            telemetry: TelemetryGate::new(config.telemetry_interval_ms),
            usage: UsageTracker::new(),
            last_sample: SensorSample::default(),
            rejected: None,
            tick_count: 0,
            config_dirty: false,
            dirty_since_ms: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Open every relay and enter the disconnected boot state.
    pub fn start(
        &mut self,
        relays: &mut impl RelayPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        clock.set_utc_offset(self.config.utc_offset_secs);
        self.switch.initialize(relays, clock.uptime_ms());
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started (period {} month(s), interlock {} ms)",
            self.schedule.period_months(),
            self.switch.interlock_ms()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle:
    /// sample → motor → usage → safety → schedule → switch → present → telemetry.
    ///
    /// The `hw` parameter satisfies **both** [`AnalogPort`] and
    /// [`RelayPort`]; this avoids a double mutable borrow while keeping the
    /// port boundary explicit.  Same for `out`.
    ///
    /// An `Err` is always an interlock violation.  By then every relay has
    /// already been commanded open; the caller must stop ticking.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut (impl AnalogPort + RelayPort),
        out: &mut (impl DisplayPort + TelemetryPort),
        sink: &mut impl EventSink,
    ) -> Result<StatusSnapshot> {
        self.tick_count += 1;
        let now = clock.uptime_ms();

        // 1. Sample both channels
        let sample = self.sensors.sample(hw, now);
        self.last_sample = sample;

        // 2. Motor classification
        let was_running = self.motor.is_running();
        let running = self.motor.update(sample.current_amps);
        if running != was_running {
            info!("Motor {}", if running { "started" } else { "stopped" });
            sink.emit(&AppEvent::MotorChanged { running });
        }
        self.usage.update(
            now,
            clock.local_day(),
            running,
            sample.voltage_volts,
            sample.current_amps,
        );

        // 3. Supervision (reporting only)
        let prev_faults = self.safety.faults();
        let faults = self.safety.evaluate(&sample);
        if faults != prev_faults {
            if faults != 0 {
                warn!("Supervisory faults: flags=0b{:08b}", faults);
                sink.emit(&AppEvent::FaultDetected(faults));
            } else {
                sink.emit(&AppEvent::FaultCleared);
            }
        }

        // 4. Which meter should carry the load this month?
        let target = self.resolve_target(clock, sink);

        // 5. Advance the interlock state machine
        match self.switch.update(target, now, hw) {
            Ok(outcome) => self.emit_outcome(outcome, sink),
            Err(violation) => {
                sink.emit(&AppEvent::InterlockFault(violation));
                return Err(violation.into());
            }
        }

        // 6. Present
        let snapshot = self.build_snapshot();
        out.present(&snapshot);

        // 7. Telemetry, gated on elapsed time
        if self.telemetry.is_due(now) {
            self.telemetry.mark(now);
            let record = TelemetryRecord::from(&snapshot);
            match out.publish(&record) {
                Ok(()) => sink.emit(&AppEvent::Telemetry(record)),
                Err(e) => warn!("Telemetry publish failed: {}", e),
            }
        }

        Ok(snapshot)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (serial console, provisioning, etc.).
    ///
    /// The clock is passed in because it consumes the UTC offset.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let now_ms = clock.uptime_ms();
        match cmd {
            AppCommand::UpdateConfig(new_config) => {
                if let Err(e) = new_config.validate() {
                    let reason = match e {
                        ConfigError::ValidationFailed(msg) => msg,
                        _ => "invalid configuration",
                    };
                    warn!("Configuration rejected: {}", reason);
                    sink.emit(&AppEvent::ConfigRejected(reason));
                    return;
                }
                clock.set_utc_offset(new_config.utc_offset_secs);
                self.apply_config(new_config);
                self.mark_config_dirty(now_ms);
                sink.emit(&AppEvent::ConfigUpdated);
                info!("Configuration updated at runtime");
            }
            AppCommand::SaveConfig => {
                self.config_dirty = true;
                self.dirty_since_ms = 0;
                info!("Explicit config save requested (will flush on next auto-save check)");
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the latest sample and switch state.
    pub fn build_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            current_amps: self.last_sample.current_amps,
            voltage_volts: self.last_sample.voltage_volts,
            active_meter: self.switch.active_meter(),
            motor_running: self.motor.is_running(),
            runtime_today_hours: self.usage.runtime_hours(),
            energy_today_kwh: self.usage.energy_kwh(),
        }
    }

    /// The connected meter; `None` while disconnected or switching.
    pub fn active_meter(&self) -> Option<MeterId> {
        self.switch.active_meter()
    }

    pub fn switch_state(&self) -> SwitchState {
        self.switch.state()
    }

    /// Relays commanded closed right now (0 or 1).
    pub fn closed_relays(&self) -> usize {
        self.switch.closed_relays()
    }

    pub fn motor_running(&self) -> bool {
        self.motor.is_running()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current supervisory fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.safety.faults()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Control loop period the caller should pace `tick` at.
    pub fn loop_interval_ms(&self) -> u32 {
        self.config.control_loop_interval_ms
    }

    // ── Internal ──────────────────────────────────────────────

    fn resolve_target(
        &mut self,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Option<MeterId> {
        let month = clock.current_month()?;
        match self.schedule.resolve(month) {
            Ok(meter) => {
                self.rejected = None;
                Some(meter)
            }
            Err(e) => {
                if self.rejected != Some(e) {
                    warn!("Schedule rejected: {}", e);
                    sink.emit(&AppEvent::ScheduleRejected(e));
                    self.rejected = Some(e);
                }
                None
            }
        }
    }

    fn emit_outcome(&self, outcome: SwitchOutcome, sink: &mut impl EventSink) {
        match outcome {
            SwitchOutcome::Connected(meter) => sink.emit(&AppEvent::MeterConnected(meter)),
            SwitchOutcome::Started { from, to } => {
                sink.emit(&AppEvent::SwitchStarted { from, to })
            }
            SwitchOutcome::Completed { from, to } => {
                sink.emit(&AppEvent::SwitchCompleted { from, to })
            }
            SwitchOutcome::Unchanged | SwitchOutcome::Holding { .. } => {}
        }
    }

    fn apply_config(&mut self, config: SystemConfig) {
        self.sensors.reconfigure(&config);
        self.motor.reconfigure(&config);
        self.safety.reconfigure(&config);
        self.schedule = ScheduleResolver::new(&config);
        self.switch
            .set_interlock_delay(u64::from(config.interlock_delay_ms));
        self.telemetry.set_interval(config.telemetry_interval_ms);
        self.config = config;
    }

    // ── Config dirty-flag management ──────────────────────────

    fn mark_config_dirty(&mut self, now_ms: u64) {
        self.config_dirty = true;
        self.dirty_since_ms = now_ms;
    }

    /// Check if auto-save should trigger (5 seconds after last change).
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort, now_ms: u64) -> bool {
        if !self.config_dirty {
            return false;
        }
        if now_ms.saturating_sub(self.dirty_since_ms) < AUTO_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved to NVS");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before halting).
    pub fn force_save_if_dirty(&mut self, storage: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config force-saved before shutdown");
            }
            Err(e) => warn!("Config force-save failed: {}", e),
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
