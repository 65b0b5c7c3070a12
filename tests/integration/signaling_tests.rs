//! Mode, forwarder and sensor-sim signaling through the LED coordinator.

use crate::mock_hw::{make_app, make_app_with};

use mlbeacon::config::{LedMap, SystemConfig};
use mlbeacon::decision::effects::{
    EffectDescriptor, EffectRef, EffectTable, ResultEffect, build_forwarder_effects,
    default_effect_table,
};
use mlbeacon::decision::sample::{AppMode, ClassificationSample, ForwarderState, label};
use mlbeacon::events::Event;

fn zoom_in() -> Event {
    Event::Classification(ClassificationSample::new(Some("zoom_in"), 0.9, 0.0))
}

fn sensor_sim_config() -> SystemConfig {
    SystemConfig {
        display_sensor_sim: true,
        led_map: LedMap {
            ml_state: 0,
            sensor_sim: Some(1),
        },
        ..SystemConfig::default()
    }
}

// ── Data forwarding ───────────────────────────────────────────

#[test]
fn data_forwarding_shows_forwarder_state() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::DataForwarding), &mut hw, &mut sink);
    app.handle_event(
        Event::ForwarderState(ForwarderState::Connected),
        &mut hw,
        &mut sink,
    );
    app.handle_event(
        Event::ForwarderState(ForwarderState::Transmitting),
        &mut hw,
        &mut sink,
    );

    assert_eq!(
        hw.shows(),
        vec![
            (0, EffectRef::Forwarder(ForwarderState::Disconnected)),
            (0, EffectRef::Forwarder(ForwarderState::Connected)),
            (0, EffectRef::Forwarder(ForwarderState::Transmitting)),
        ]
    );
}

#[test]
fn samples_are_dropped_while_forwarding() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::DataForwarding), &mut hw, &mut sink);
    hw.calls.clear();

    for _ in 0..5 {
        app.handle_event(zoom_in(), &mut hw, &mut sink);
    }
    assert!(hw.calls.is_empty());
    assert!(sink.stable_results().is_empty());
}

#[test]
fn forwarder_state_is_remembered_outside_forwarding_mode() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    hw.calls.clear();

    app.handle_event(
        Event::ForwarderState(ForwarderState::Connected),
        &mut hw,
        &mut sink,
    );
    assert!(hw.shows().is_empty());

    app.handle_event(Event::ModeChanged(AppMode::DataForwarding), &mut hw, &mut sink);
    assert_eq!(
        hw.shows(),
        vec![(0, EffectRef::Forwarder(ForwarderState::Connected))]
    );
}

#[test]
fn forwarder_updates_ignored_when_display_disabled() {
    let config = SystemConfig {
        display_data_forwarder: false,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app_with(config, default_effect_table());
    assert_eq!(
        app.coordinator().forwarder_state(),
        ForwarderState::Transmitting
    );

    app.handle_event(Event::ModeChanged(AppMode::DataForwarding), &mut hw, &mut sink);
    app.handle_event(
        Event::ForwarderState(ForwarderState::Connected),
        &mut hw,
        &mut sink,
    );

    // Entering forwarding still shows the seeded state; updates are ignored.
    assert_eq!(
        hw.shows(),
        vec![(0, EffectRef::Forwarder(ForwarderState::Transmitting))]
    );
    assert_eq!(
        app.coordinator().forwarder_state(),
        ForwarderState::Transmitting
    );
}

#[test]
fn unknown_mode_leaves_led_and_drops_samples() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::Other), &mut hw, &mut sink);
    for _ in 0..3 {
        app.handle_event(zoom_in(), &mut hw, &mut sink);
    }
    assert!(hw.calls.is_empty());
    assert_eq!(app.coordinator().mode(), Some(AppMode::Other));
}

// ── Result display switches ───────────────────────────────────

#[test]
fn hidden_results_still_sign_in() {
    let config = SystemConfig {
        display_ml_results: false,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app_with(config, default_effect_table());
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    for _ in 0..3 {
        app.handle_event(zoom_in(), &mut hw, &mut sink);
    }

    // Mode entry still shows the default; results never touch the LED.
    assert_eq!(hw.shows(), vec![(0, EffectRef::Result(EffectTable::DEFAULT))]);
    assert_eq!(sink.stable_results(), vec![Some("zoom_in".to_owned())]);
    assert_eq!(sink.signins(), vec![true, true]);
}

#[test]
fn results_follow_led_map() {
    let config = SystemConfig {
        led_map: LedMap {
            ml_state: 1,
            sensor_sim: None,
        },
        ..SystemConfig::default()
    };
    let mut rows = heapless::Vec::new();
    let _ = rows.push(ResultEffect {
        label: None,
        effect: EffectDescriptor::on((10, 10, 10)),
    });
    let _ = rows.push(ResultEffect {
        label: Some("zoom_in"),
        effect: EffectDescriptor::pulses(2, 50, (255, 0, 0)),
    });
    let table = EffectTable::new(rows, build_forwarder_effects());
    let (mut app, mut hw, mut sink) = make_app_with(config, table);

    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    for _ in 0..3 {
        app.handle_event(zoom_in(), &mut hw, &mut sink);
    }
    assert_eq!(
        hw.shows(),
        vec![(1, EffectRef::Result(0)), (1, EffectRef::Result(1))]
    );

    // An ack from another LED does not release the blocking effect.
    app.handle_event(
        Event::LedReady {
            led_id: 0,
            effect: EffectRef::Result(1),
        },
        &mut hw,
        &mut sink,
    );
    assert!(app.coordinator().is_suspended());

    app.handle_event(
        Event::LedReady {
            led_id: 1,
            effect: EffectRef::Result(1),
        },
        &mut hw,
        &mut sink,
    );
    assert!(!app.coordinator().is_suspended());
}

// ── Sensor simulation channel ─────────────────────────────────

#[test]
fn sensor_sim_label_drives_its_own_led() {
    let (mut app, mut hw, mut sink) = make_app_with(sensor_sim_config(), default_effect_table());

    app.handle_event(
        Event::SensorSim(Some(label("rot_left").unwrap())),
        &mut hw,
        &mut sink,
    );
    app.handle_event(Event::SensorSim(None), &mut hw, &mut sink);

    assert_eq!(
        hw.shows(),
        vec![(1, EffectRef::Result(5)), (1, EffectRef::Result(5))]
    );
}

#[test]
fn sensor_sim_refreshes_with_recognised_result() {
    let (mut app, mut hw, mut sink) = make_app_with(sensor_sim_config(), default_effect_table());
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    app.handle_event(
        Event::SensorSim(Some(label("rot_left").unwrap())),
        &mut hw,
        &mut sink,
    );
    hw.calls.clear();

    for _ in 0..3 {
        app.handle_event(zoom_in(), &mut hw, &mut sink);
    }
    assert_eq!(
        hw.shows(),
        vec![(1, EffectRef::Result(5)), (0, EffectRef::Result(3))]
    );
}

#[test]
fn sensor_sim_without_a_label_yet_shows_nothing() {
    let (mut app, mut hw, mut sink) = make_app_with(sensor_sim_config(), default_effect_table());
    app.handle_event(Event::SensorSim(None), &mut hw, &mut sink);
    assert!(hw.calls.is_empty());
}

#[test]
fn sensor_sim_ignored_when_disabled() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(
        Event::SensorSim(Some(label("rot_left").unwrap())),
        &mut hw,
        &mut sink,
    );
    assert!(hw.calls.is_empty());
}
