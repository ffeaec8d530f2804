//! Mock adapters for integration tests.
//!
//! Records every relay call with the simulated time it happened at, so
//! tests can assert on the full command history without touching real
//! GPIO registers.

use std::cell::{Cell, RefCell};

use meterswitch::app::commands::AppCommand;
use meterswitch::app::events::AppEvent;
use meterswitch::app::ports::{
    AnalogPort, ClockPort, ConfigError, ConfigPort, DisplayPort, EventSink, RelayPort,
    TelemetryError, TelemetryPort,
};
use meterswitch::config::SystemConfig;
use meterswitch::meter::MeterId;
use meterswitch::sensors::AnalogChannel;
use meterswitch::telemetry::{StatusSnapshot, TelemetryRecord};

// ── Relay call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCall {
    Set { meter: MeterId, closed: bool },
    OpenAll,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Simulated time stamped onto each call; set by the test per tick.
    pub now: u64,
    pub current_raw: u16,
    pub voltage_raw: u16,
    pub closed: [bool; MeterId::COUNT],
    pub calls: Vec<(u64, RelayCall)>,
    /// Highest number of simultaneously closed meter relays ever seen.
    pub max_closed: usize,
    /// Shortest gap between a meter opening and another closing.
    pub min_gap_ms: Option<u64>,
    opened_at: Option<u64>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            now: 0,
            current_raw: 0,
            // ≈ 231 V with default calibration
            voltage_raw: 1_150,
            closed: [false; MeterId::COUNT],
            calls: Vec::new(),
            max_closed: 0,
            min_gap_ms: None,
            opened_at: None,
        }
    }

    pub fn closed_meters(&self) -> Vec<MeterId> {
        MeterId::ALL
            .into_iter()
            .filter(|m| self.closed[m.index()])
            .collect()
    }

    /// Calls that closed a relay, in order.
    pub fn closes(&self) -> Vec<(u64, MeterId)> {
        self.calls
            .iter()
            .filter_map(|&(t, c)| match c {
                RelayCall::Set { meter, closed: true } => Some((t, meter)),
                _ => None,
            })
            .collect()
    }

    fn record_state(&mut self) {
        let count = self.closed.iter().filter(|&&c| c).count();
        self.max_closed = self.max_closed.max(count);
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogPort for MockHardware {
    fn read_raw(&mut self, channel: AnalogChannel) -> u16 {
        match channel {
            AnalogChannel::Current => self.current_raw,
            AnalogChannel::Voltage => self.voltage_raw,
        }
    }
}

impl RelayPort for MockHardware {
    fn set_meter(&mut self, meter: MeterId, closed: bool) {
        self.calls.push((self.now, RelayCall::Set { meter, closed }));
        let was_closed = self.closed[meter.index()];
        self.closed[meter.index()] = closed;
        if closed && !was_closed {
            if let Some(opened) = self.opened_at.take() {
                let gap = self.now - opened;
                self.min_gap_ms = Some(self.min_gap_ms.map_or(gap, |g| g.min(gap)));
            }
        } else if !closed && was_closed {
            self.opened_at = Some(self.now);
        }
        self.record_state();
    }

    fn open_all(&mut self) {
        self.calls.push((self.now, RelayCall::OpenAll));
        if self.closed.iter().any(|&c| c) {
            self.opened_at = Some(self.now);
        }
        self.closed = [false; MeterId::COUNT];
        self.record_state();
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    pub now: Cell<u64>,
    pub month: Cell<Option<u8>>,
    pub day: Cell<Option<u16>>,
    /// Last offset pushed in by the service.
    pub utc_offset: Cell<Option<i32>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new(month: Option<u8>) -> Self {
        Self {
            now: Cell::new(0),
            month: Cell::new(month),
            day: Cell::new(None),
            utc_offset: Cell::new(None),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn set_month(&self, month: Option<u8>) {
        self.month.set(month);
    }
}

impl ClockPort for MockClock {
    fn uptime_ms(&self) -> u64 {
        self.now.get()
    }

    fn current_month(&self) -> Option<u8> {
        self.month.get()
    }

    fn local_day(&self) -> Option<u16> {
        self.day.get()
    }

    fn set_utc_offset(&self, utc_offset_secs: i32) {
        self.utc_offset.set(Some(utc_offset_secs));
    }
}

// ── Outputs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutputs {
    pub presented: Vec<StatusSnapshot>,
    pub published: Vec<(u64, TelemetryRecord)>,
    pub fail_publish: bool,
    pub attempts: u32,
    /// Time stamped onto each publish; set by the test per tick.
    pub now: u64,
}

impl DisplayPort for MockOutputs {
    fn present(&mut self, snapshot: &StatusSnapshot) {
        self.presented.push(*snapshot);
    }
}

impl TelemetryPort for MockOutputs {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        self.attempts += 1;
        if self.fail_publish {
            return Err(TelemetryError::Offline);
        }
        self.published.push((self.now, record.clone()));
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Config store ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    pub saved: RefCell<Vec<SystemConfig>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        Ok(self
            .saved
            .borrow()
            .last()
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        if self.fail {
            return Err(ConfigError::IoError);
        }
        self.saved.borrow_mut().push(config.clone());
        Ok(())
    }
}

// ── Rig: service + mocks wired together ───────────────────────

pub struct Rig {
    pub app: meterswitch::app::service::AppService,
    pub hw: MockHardware,
    pub clock: MockClock,
    pub out: MockOutputs,
    pub sink: LogSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: SystemConfig, month: Option<u8>) -> Self {
        let mut rig = Self {
            app: meterswitch::app::service::AppService::new(config),
            hw: MockHardware::new(),
            clock: MockClock::new(month),
            out: MockOutputs::default(),
            sink: LogSink::new(),
        };
        rig.app.start(&mut rig.hw, &rig.clock, &mut rig.sink);
        rig
    }

    /// Run one control tick at `now_ms`.
    pub fn tick_at(&mut self, now_ms: u64) -> meterswitch::error::Result<StatusSnapshot> {
        self.clock.set(now_ms);
        self.hw.now = now_ms;
        self.out.now = now_ms;
        self.app
            .tick(&self.clock, &mut self.hw, &mut self.out, &mut self.sink)
    }

    /// Deliver a command at `now_ms`.
    pub fn command_at(&mut self, now_ms: u64, cmd: AppCommand) {
        self.clock.set(now_ms);
        self.app.handle_command(cmd, &self.clock, &mut self.sink);
    }

    /// Tick every `step_ms` from `from_ms` up to and including `to_ms`.
    pub fn run(&mut self, from_ms: u64, to_ms: u64, step_ms: u64) {
        let mut t = from_ms;
        while t <= to_ms {
            self.tick_at(t).expect("tick must not trip the interlock");
            t += step_ms;
        }
    }
}
