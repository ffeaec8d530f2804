//! Telemetry cadence and record contents through the full tick pipeline.

use crate::mock_hw::Rig;

use meterswitch::app::events::AppEvent;
use meterswitch::config::SystemConfig;
use meterswitch::meter::MeterId;
use meterswitch::telemetry::MotorStatus;

const SECOND: u64 = 1_000;

#[test]
fn first_publish_after_one_full_interval() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.run(0, 5 * SECOND, SECOND);
    assert!(rig.out.published.is_empty(), "5 s is not strictly past 5 s");
    rig.tick_at(6 * SECOND).unwrap();
    assert_eq!(rig.out.published.len(), 1);
    assert_eq!(rig.out.published[0].0, 6 * SECOND);
}

#[test]
fn cadence_follows_elapsed_time() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.run(0, 30 * SECOND, SECOND);
    let times: Vec<u64> = rig.out.published.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![6_000, 12_000, 18_000, 24_000, 30_000]);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))),
        5
    );
}

#[test]
fn failed_publish_waits_for_next_interval() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.out.fail_publish = true;
    rig.run(0, 8 * SECOND, SECOND);
    assert_eq!(rig.out.attempts, 1, "no retry inside the interval");

    rig.out.fail_publish = false;
    rig.run(9 * SECOND, 12 * SECOND, SECOND);
    assert_eq!(rig.out.attempts, 2);
    assert_eq!(rig.out.published.len(), 1);
    assert_eq!(rig.out.published[0].0, 12 * SECOND);
}

#[test]
fn record_reports_null_meter_during_gap() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.run(0, 4 * SECOND, SECOND);
    rig.clock.set_month(Some(2));
    // Switch starts at 5 s; the 6 s publish lands inside the gap.
    rig.run(5 * SECOND, 6 * SECOND, SECOND);

    let (_, record) = rig.out.published.last().unwrap();
    assert_eq!(record.active_meter, None);
    let json = record.to_json().unwrap();
    assert!(json.contains("\"active_meter\":null"), "{json}");
}

#[test]
fn record_carries_meter_and_motor_status() {
    let mut rig = Rig::new(SystemConfig::default(), Some(2));
    rig.hw.current_raw = 300;
    rig.run(0, 6 * SECOND, SECOND);

    let (_, record) = rig.out.published.last().unwrap();
    assert_eq!(record.active_meter, Some(MeterId::Two));
    assert_eq!(record.motor_status, MotorStatus::On);
    assert!(record.current > 7.0 && record.current < 7.5);
    assert!(record.voltage > 231.0 && record.voltage < 232.5);

    let json = record.to_json().unwrap();
    assert!(json.contains("\"active_meter\":2"), "{json}");
    assert!(json.contains("\"motor_status\":\"ON\""), "{json}");
}

#[test]
fn longer_interval_from_config() {
    let config = SystemConfig {
        telemetry_interval_ms: 10_000,
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config, Some(1));
    rig.run(0, 25 * SECOND, SECOND);
    let times: Vec<u64> = rig.out.published.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![11_000, 22_000]);
}

#[test]
fn record_carries_daily_usage_and_resets_on_new_day() {
    let mut rig = Rig::new(SystemConfig::default(), Some(2));
    rig.clock.day.set(Some(120));
    rig.hw.current_raw = 300;
    rig.run(0, 6 * SECOND, SECOND);

    let (_, record) = rig.out.published.last().unwrap();
    // Running from the first tick: 6 s of run time.
    assert!((record.total_runtime_today * 3_600.0 - 6.0).abs() < 0.01);
    assert!(record.energy_kwh > 0.0);
    let json = record.to_json().unwrap();
    assert!(json.contains("\"total_runtime_today\":"), "{json}");
    assert!(json.contains("\"energy_kwh\":"), "{json}");

    rig.clock.day.set(Some(121));
    let snap = rig.tick_at(7 * SECOND).unwrap();
    assert!(snap.runtime_today_hours * 3_600.0 < 1.01);
}
