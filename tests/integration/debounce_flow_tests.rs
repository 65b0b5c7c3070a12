//! Classification samples → debouncer → LED coordinator, end to end.

use crate::mock_hw::{HwCall, make_app, make_app_with};

use mlbeacon::app::events::AppEvent;
use mlbeacon::config::SystemConfig;
use mlbeacon::decision::coordinator::DisplayState;
use mlbeacon::decision::effects::{
    EffectDescriptor, EffectRef, EffectTable, ResultEffect, build_forwarder_effects,
};
use mlbeacon::decision::sample::{AppMode, ClassificationSample, IDLE_LABEL};
use mlbeacon::events::{Event, Module};

fn sample(label: &str, value: f32, anomaly: f32) -> Event {
    Event::Classification(ClassificationSample::new(Some(label), value, anomaly))
}

/// Result table where `zoom_in` plays a finite, blocking pulse train.
fn blocking_table() -> EffectTable {
    let mut rows = heapless::Vec::new();
    let _ = rows.push(ResultEffect {
        label: None,
        effect: EffectDescriptor::blink2(1000, 2000, (255, 255, 255)),
    });
    let _ = rows.push(ResultEffect {
        label: Some("zoom_in"),
        effect: EffectDescriptor::pulses(3, 100, (255, 0, 0)),
    });
    let _ = rows.push(ResultEffect {
        label: Some("zoom_out"),
        effect: EffectDescriptor::on((0, 0, 255)),
    });
    EffectTable::new(rows, build_forwarder_effects())
}

// ── Scenario 1: confident repeats stabilise once ──────────────

#[test]
fn repeated_confident_label_shows_its_effect_once() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    hw.calls.clear();
    sink.events.clear();

    for _ in 0..3 {
        app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);
    }

    assert_eq!(hw.shows(), vec![(0, EffectRef::Result(3))]);
    assert_eq!(sink.stable_results(), vec![Some("zoom_in".to_owned())]);
    assert_eq!(sink.signins(), vec![true], "non-blocking effect signs in");
    assert_eq!(app.debouncer().state().streak, 0);
    assert_eq!(
        app.coordinator().display_state(),
        DisplayState::Showing(EffectRef::Result(3))
    );
}

#[test]
fn fewer_than_threshold_samples_show_nothing() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    hw.calls.clear();

    app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);
    app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);
    assert!(hw.shows().is_empty());
    assert_eq!(app.debouncer().state().streak, 2);
}

// ── Scenario 2: idle fallback ─────────────────────────────────

#[test]
fn low_confidence_without_anomaly_block_counts_as_idle() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);

    app.handle_event(sample("zoom_out", 0.3, -1.0), &mut hw, &mut sink);

    let state = app.debouncer().state();
    assert_eq!(state.current.as_deref(), Some(IDLE_LABEL));
    assert_eq!(state.streak, 1);
}

#[test]
fn anomaly_overrides_confident_label() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    hw.calls.clear();

    for _ in 0..3 {
        app.handle_event(sample("zoom_in", 0.99, 0.7), &mut hw, &mut sink);
    }
    assert_eq!(hw.shows(), vec![(0, EffectRef::Result(1))]);
    assert_eq!(sink.stable_results(), vec![Some("anomaly".to_owned())]);
}

// ── Mode gating ───────────────────────────────────────────────

#[test]
fn samples_before_model_running_are_dropped() {
    let (mut app, mut hw, mut sink) = make_app();
    for _ in 0..5 {
        app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);
    }
    assert!(hw.calls.is_empty(), "no LED or radio activity: {:?}", hw.calls);
    assert_eq!(app.debouncer().state().streak, 0);
}

#[test]
fn re_entering_model_running_resets_streak() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);
    app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);

    app.handle_event(Event::ModeChanged(AppMode::DataForwarding), &mut hw, &mut sink);
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    hw.calls.clear();

    app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);
    assert!(hw.shows().is_empty());
    assert_eq!(app.debouncer().state().streak, 1);
}

// ── Blocking effects ──────────────────────────────────────────

#[test]
fn blocking_effect_signs_out_until_led_ack() {
    let (mut app, mut hw, mut sink) =
        make_app_with(SystemConfig::default(), blocking_table());
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    sink.events.clear();

    for _ in 0..3 {
        app.handle_event(sample("zoom_in", 0.9, 0.0), &mut hw, &mut sink);
    }
    assert_eq!(sink.signins(), vec![false]);
    assert!(!app.coordinator().accepts_results());

    // Suspended: no debouncing and no LED changes.
    hw.calls.clear();
    for _ in 0..3 {
        app.handle_event(sample("zoom_out", 0.9, 0.0), &mut hw, &mut sink);
    }
    assert!(hw.calls.is_empty());

    app.handle_event(
        Event::LedReady {
            led_id: 0,
            effect: EffectRef::Result(1),
        },
        &mut hw,
        &mut sink,
    );
    assert_eq!(
        hw.calls,
        vec![HwCall::Show {
            led_id: 0,
            effect: EffectRef::Result(EffectTable::DEFAULT)
        }]
    );
    assert_eq!(sink.signins(), vec![false, true]);
    assert!(app.coordinator().accepts_results());
}

#[test]
fn module_ready_signs_in_once() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModuleReady(Module::Main), &mut hw, &mut sink);
    app.handle_event(Event::ModuleReady(Module::Main), &mut hw, &mut sink);

    assert_eq!(sink.signins(), vec![true]);
    assert_eq!(hw.count(|c| *c == HwCall::Enable), 1);
    assert!(matches!(sink.events.first(), Some(AppEvent::Started)));
}
