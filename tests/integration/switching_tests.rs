//! Rotation and break-before-make switching through the full tick pipeline.

use crate::mock_hw::{RelayCall, Rig};

use meterswitch::app::events::AppEvent;
use meterswitch::config::SystemConfig;
use meterswitch::control::switch::SwitchState;
use meterswitch::meter::MeterId;

const SECOND: u64 = 1_000;

#[test]
fn boot_opens_every_relay_before_connecting() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    assert_eq!(rig.hw.calls.first(), Some(&(0, RelayCall::OpenAll)));
    assert_eq!(rig.app.switch_state(), SwitchState::Disconnected);

    let snap = rig.tick_at(SECOND).unwrap();
    assert_eq!(snap.active_meter, Some(MeterId::One));
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::One]);
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::MeterConnected(MeterId::One))
    );
}

#[test]
fn month_change_holds_all_open_for_interlock() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.run(SECOND, 10 * SECOND, SECOND);
    assert_eq!(rig.app.active_meter(), Some(MeterId::One));

    rig.clock.set_month(Some(2));
    let snap = rig.tick_at(11 * SECOND).unwrap();
    assert_eq!(snap.active_meter, None, "no meter reported during the gap");
    assert!(rig.hw.closed_meters().is_empty());

    // 12 s … 15 s: still inside the 5 s window
    for t in 12..=15 {
        let snap = rig.tick_at(t * SECOND).unwrap();
        assert_eq!(snap.active_meter, None);
        assert!(rig.hw.closed_meters().is_empty(), "relay closed early at {t}s");
    }

    let snap = rig.tick_at(16 * SECOND).unwrap();
    assert_eq!(snap.active_meter, Some(MeterId::Two));
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::Two]);
    assert_eq!(rig.hw.min_gap_ms, Some(5 * SECOND));
    assert_eq!(rig.hw.max_closed, 1);
    assert!(rig.sink.events.contains(&AppEvent::SwitchCompleted {
        from: MeterId::One,
        to: MeterId::Two,
    }));
}

#[test]
fn gap_is_measured_in_time_not_ticks() {
    let mut rig = Rig::new(SystemConfig::default(), Some(3));
    rig.tick_at(0).unwrap();
    rig.clock.set_month(Some(4));
    rig.tick_at(100).unwrap();
    // Sparse ticks: the first one past the deadline completes the switch.
    rig.tick_at(5_099).unwrap();
    assert!(rig.hw.closed_meters().is_empty());
    rig.tick_at(9_000).unwrap();
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::One]);
    assert!(rig.hw.min_gap_ms.unwrap() >= 5_000);
}

#[test]
fn target_change_mid_switch_waits_for_completion() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.tick_at(0).unwrap();

    rig.clock.set_month(Some(2));
    rig.tick_at(SECOND).unwrap();
    rig.clock.set_month(Some(3));
    rig.run(2 * SECOND, 5 * SECOND, SECOND);
    assert!(rig.hw.closed_meters().is_empty());

    // The in-flight switch lands on meter 2 first...
    rig.tick_at(6 * SECOND).unwrap();
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::Two]);

    // ...then the next tick starts a fresh break-before-make toward 3.
    rig.tick_at(7 * SECOND).unwrap();
    assert!(rig.hw.closed_meters().is_empty());
    rig.run(8 * SECOND, 12 * SECOND, SECOND);
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::Three]);

    let closes: Vec<MeterId> = rig.hw.closes().into_iter().map(|(_, m)| m).collect();
    assert_eq!(closes, vec![MeterId::One, MeterId::Two, MeterId::Three]);
    assert_eq!(rig.hw.max_closed, 1);
}

#[test]
fn unsynced_clock_connects_nothing() {
    let mut rig = Rig::new(SystemConfig::default(), None);
    rig.run(SECOND, 20 * SECOND, SECOND);
    assert!(rig.hw.closed_meters().is_empty());
    assert_eq!(rig.app.switch_state(), SwitchState::Disconnected);

    rig.clock.set_month(Some(6));
    rig.tick_at(21 * SECOND).unwrap();
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::Three]);
}

#[test]
fn clock_loss_keeps_current_meter() {
    let mut rig = Rig::new(SystemConfig::default(), Some(2));
    rig.tick_at(0).unwrap();
    rig.clock.set_month(None);
    rig.run(SECOND, 10 * SECOND, SECOND);
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::Two]);
}

#[test]
fn invalid_month_does_not_switch() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.tick_at(0).unwrap();
    rig.clock.set_month(Some(0));
    rig.run(SECOND, 10 * SECOND, SECOND);
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::One]);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ScheduleRejected(_))),
        1
    );
}

#[test]
fn two_month_period_rotates_every_other_month() {
    let config = SystemConfig {
        rotation_period_months: 2,
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config, Some(1));
    let mut t = 0;
    let mut seen = Vec::new();
    for month in 1..=12u8 {
        rig.clock.set_month(Some(month));
        // Long enough for any switch to complete.
        for _ in 0..7 {
            rig.tick_at(t).unwrap();
            t += SECOND;
        }
        seen.push(rig.app.active_meter().map(u8::from));
    }
    let expected: Vec<Option<u8>> = [1, 1, 2, 2, 3, 3, 1, 1, 2, 2, 3, 3]
        .into_iter()
        .map(Some)
        .collect();
    assert_eq!(seen, expected);
    assert_eq!(rig.hw.max_closed, 1);
}

#[test]
fn motor_state_follows_current() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.hw.current_raw = 0;
    assert!(!rig.tick_at(0).unwrap().motor_running);

    // ≈ 7.25 A
    rig.hw.current_raw = 300;
    assert!(rig.tick_at(SECOND).unwrap().motor_running);

    rig.hw.current_raw = 10;
    assert!(!rig.tick_at(2 * SECOND).unwrap().motor_running);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::MotorChanged { .. })),
        2
    );
}

#[test]
fn overload_is_reported_not_acted_upon() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.tick_at(0).unwrap();
    // 700 / 4095 * 3.3 * 30 ≈ 16.9 A
    rig.hw.current_raw = 700;
    rig.tick_at(SECOND).unwrap();
    assert_ne!(rig.app.fault_flags(), 0);
    assert_eq!(rig.hw.closed_meters(), vec![MeterId::One]);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::FaultDetected(_))),
        1
    );
}

#[test]
fn every_tick_presents_a_snapshot() {
    let mut rig = Rig::new(SystemConfig::default(), Some(1));
    rig.run(0, 9 * SECOND, SECOND);
    assert_eq!(rig.out.presented.len(), 10);
    assert_eq!(rig.app.tick_count(), 10);
    let last = rig.out.presented.last().unwrap();
    assert!((last.voltage_volts - 231.7).abs() < 0.5);
}
