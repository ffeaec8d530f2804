//! Runtime reconfiguration and debounced persistence.

use std::sync::mpsc;

use crate::mock_hw::{LogSink, MockHardware, MockNvs, MockOutputs, Rig};

use meterswitch::adapters::console::SerialConsole;
use meterswitch::adapters::time::Esp32TimeAdapter;
use meterswitch::app::commands::AppCommand;
use meterswitch::app::service::AppService;
use meterswitch::app::events::AppEvent;
use meterswitch::app::ports::ConfigPort;
use meterswitch::config::SystemConfig;
use meterswitch::meter::MeterId;

const SECOND: u64 = 1_000;

#[test]
fn update_config_marks_dirty_and_auto_saves() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    let nvs = MockNvs::new();
    assert!(!rig.app.is_config_dirty());

    let cfg = SystemConfig {
        rotation_period_months: 4,
        ..SystemConfig::default()
    };
    rig.command_at(2 * SECOND, AppCommand::UpdateConfig(cfg.clone()));
    assert!(rig.app.is_config_dirty());
    assert!(rig.sink.events.contains(&AppEvent::ConfigUpdated));

    assert!(!rig.app.auto_save_if_needed(&nvs, 6 * SECOND));
    assert!(rig.app.auto_save_if_needed(&nvs, 7 * SECOND));
    assert!(!rig.app.is_config_dirty());
    assert_eq!(nvs.load().unwrap(), cfg);
}

#[test]
fn save_config_flushes_on_next_check() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    let nvs = MockNvs::new();
    rig.command_at(60 * SECOND, AppCommand::SaveConfig);
    assert!(rig.app.auto_save_if_needed(&nvs, 60 * SECOND));
    assert_eq!(nvs.saved.borrow().len(), 1);
}

#[test]
fn failed_save_stays_dirty() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    let nvs = MockNvs {
        fail: true,
        ..MockNvs::default()
    };
    rig.command_at(10 * SECOND, AppCommand::SaveConfig);
    assert!(!rig.app.auto_save_if_needed(&nvs, 20 * SECOND));
    assert!(rig.app.is_config_dirty());
}

#[test]
fn invalid_config_is_rejected_and_not_applied() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    let bad = SystemConfig {
        interlock_delay_ms: 200,
        ..SystemConfig::default()
    };
    rig.command_at(0, AppCommand::UpdateConfig(bad));
    assert_eq!(rig.app.config(), &SystemConfig::default());
    assert!(!rig.app.is_config_dirty());
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ConfigRejected(_))),
        1
    );
}

#[test]
fn period_change_applies_on_next_tick() {
    let mut rig = Rig::new(SystemConfig::default(), Some(4));
    rig.tick_at(0).unwrap();
    // Period 1: April → meter 1
    assert_eq!(rig.app.active_meter(), Some(MeterId::One));

    let cfg = SystemConfig {
        rotation_period_months: 2,
        ..SystemConfig::default()
    };
    rig.command_at(SECOND, AppCommand::UpdateConfig(cfg));
    // Period 2: April → meter 2
    rig.run(SECOND, 7 * SECOND, SECOND);
    assert_eq!(rig.app.active_meter(), Some(MeterId::Two));
}

#[test]
fn shorter_interlock_never_cuts_an_inflight_gap() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.tick_at(0).unwrap();
    rig.clock.set_month(Some(2));
    rig.tick_at(SECOND).unwrap();

    let cfg = SystemConfig {
        interlock_delay_ms: 1_000,
        ..SystemConfig::default()
    };
    rig.command_at(2 * SECOND, AppCommand::UpdateConfig(cfg));

    rig.run(2 * SECOND, 5 * SECOND, SECOND);
    assert!(rig.hw.closed_meters().is_empty(), "old 5 s window still applies");
    rig.tick_at(6 * SECOND).unwrap();
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::Two]);

    // The next switch uses the new, shorter delay.
    rig.clock.set_month(Some(3));
    rig.tick_at(7 * SECOND).unwrap();
    rig.tick_at(8 * SECOND).unwrap();
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::Three]);
    assert_eq!(rig.hw.min_gap_ms, Some(SECOND));
}

#[test]
fn start_hands_configured_offset_to_clock() {
    let rig = Rig::new(SystemConfig::default(), Some(1));
    assert_eq!(rig.clock.utc_offset.get(), Some(19_800));
}

#[test]
fn console_line_drives_service_and_persistence() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    let nvs = MockNvs::new();
    let (tx, rx) = mpsc::sync_channel(4);
    let console = SerialConsole::from_receiver(rx);

    tx.send("set control_loop_interval_ms 2000".into()).unwrap();
    let cmd = console.poll(rig.app.config()).unwrap();
    rig.command_at(SECOND, cmd);
    assert_eq!(rig.app.loop_interval_ms(), 2_000);

    tx.send("set utc_offset_secs 0".into()).unwrap();
    let cmd = console.poll(rig.app.config()).unwrap();
    rig.command_at(2 * SECOND, cmd);
    assert_eq!(rig.clock.utc_offset.get(), Some(0));

    assert!(rig.app.auto_save_if_needed(&nvs, 7 * SECOND));
    let saved = nvs.load().unwrap();
    assert_eq!(saved.control_loop_interval_ms, 2_000);
    assert_eq!(saved.utc_offset_secs, 0);
}

#[test]
fn console_value_out_of_range_is_rejected_by_service() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    let (tx, rx) = mpsc::sync_channel(4);
    let console = SerialConsole::from_receiver(rx);
    tx.send("set control_loop_interval_ms 20".into()).unwrap();
    let cmd = console.poll(rig.app.config()).unwrap();
    rig.command_at(SECOND, cmd);
    assert_eq!(rig.app.loop_interval_ms(), 1_000);
    assert_eq!(rig.clock.utc_offset.get(), Some(19_800));
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ConfigRejected(_))),
        1
    );
}

#[test]
fn utc_offset_change_moves_the_schedule() {
    // 2024-03-31T20:00:00Z: March in UTC, 1 April at +05:30.
    let clock = Esp32TimeAdapter::new(0);
    clock.set_wall_clock(Some(1_711_915_200));
    let mut hw = MockHardware::new();
    let mut out = MockOutputs::default();
    let mut sink = LogSink::new();
    let mut app = AppService::new(SystemConfig {
        utc_offset_secs: 0,
        ..SystemConfig::default()
    });
    app.start(&mut hw, &clock, &mut sink);

    app.tick(&clock, &mut hw, &mut out, &mut sink).unwrap();
    assert_eq!(app.active_meter(), Some(MeterId::Three));

    let ist = SystemConfig::default();
    app.handle_command(AppCommand::UpdateConfig(ist), &clock, &mut sink);
    app.tick(&clock, &mut hw, &mut out, &mut sink).unwrap();
    assert!(sink.events.contains(&AppEvent::SwitchStarted {
        from: MeterId::Three,
        to: MeterId::One
    }));
    assert!(hw.closed_meters().is_empty());
}
