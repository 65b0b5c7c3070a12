//! Classification samples and radio events → advertising lifecycle.

use embassy_time::Duration;

use crate::mock_hw::{HwCall, MockHardware, RecordingSink, make_app};

use mlbeacon::advertising::lifecycle::AdvPhase;
use mlbeacon::advertising::payload::{encode, initial_payload};
use mlbeacon::app::events::AppEvent;
use mlbeacon::app::service::AppService;
use mlbeacon::decision::sample::{AppMode, ClassificationSample};
use mlbeacon::error::RadioError;
use mlbeacon::events::Event;

fn sample(label: &str) -> Event {
    Event::Classification(
        ClassificationSample::new(Some(label), 0.9, 0.0)
            .with_timings(4, 12, 1),
    )
}

fn running() -> (AppService, MockHardware, RecordingSink) {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_event(Event::ModeChanged(AppMode::ModelRunning), &mut hw, &mut sink);
    (app, hw, sink)
}

fn advertising() -> (AppService, MockHardware, RecordingSink) {
    let (mut app, mut hw, mut sink) = running();
    app.handle_event(Event::RadioReady, &mut hw, &mut sink);
    assert_eq!(app.advertising().phase(), AdvPhase::Active);
    hw.calls.clear();
    sink.events.clear();
    (app, hw, sink)
}

#[test]
fn samples_before_radio_ready_only_schedule_retries() {
    let (mut app, mut hw, mut sink) = running();
    hw.calls.clear();

    app.handle_event(sample("zoom_in"), &mut hw, &mut sink);
    app.handle_event(sample("zoom_out"), &mut hw, &mut sink);

    assert!(hw.radio_calls().is_empty());
    assert_eq!(
        hw.schedules(),
        vec![Duration::from_millis(150), Duration::from_millis(150)]
    );
    assert_eq!(app.advertising().cached(), &encode(Some("zoom_out"), 4, 12, 1)[..]);
}

#[test]
fn radio_ready_replays_initial_payload() {
    let (mut app, mut hw, mut sink) = running();
    hw.calls.clear();
    app.handle_event(Event::RadioReady, &mut hw, &mut sink);

    assert_eq!(hw.calls, vec![HwCall::Start(initial_payload().to_vec())]);
    assert!(sink.events.contains(&AppEvent::AdvertisingStarted {
        len: initial_payload().len()
    }));
}

#[test]
fn radio_ready_replays_latest_cached_payload_and_cancels_retry() {
    let (mut app, mut hw, mut sink) = running();
    app.handle_event(sample("rot_left"), &mut hw, &mut sink);
    hw.calls.clear();

    app.handle_event(Event::RadioReady, &mut hw, &mut sink);
    assert_eq!(
        hw.calls,
        vec![
            HwCall::Start(encode(Some("rot_left"), 4, 12, 1).to_vec()),
            HwCall::Cancel
        ]
    );

    // The retry that was queued before readiness is now stale.
    hw.calls.clear();
    app.handle_event(Event::AdvRetry, &mut hw, &mut sink);
    assert!(hw.calls.is_empty());
}

// ── Scenario 3: busy start, retry succeeds ────────────────────

#[test]
fn busy_start_retries_after_backoff() {
    let (mut app, mut hw, mut sink) = running();
    hw.start_results.push_back(Err(RadioError::Busy));
    hw.calls.clear();

    app.handle_event(Event::RadioReady, &mut hw, &mut sink);
    assert_eq!(app.advertising().phase(), AdvPhase::Idle);
    assert_eq!(hw.schedules(), vec![Duration::from_millis(150)]);

    hw.advance(150);
    app.handle_event(Event::AdvRetry, &mut hw, &mut sink);
    assert_eq!(app.advertising().phase(), AdvPhase::Active);
    assert_eq!(
        app.advertising().last_update(),
        Some(embassy_time::Instant::from_millis(150))
    );
    assert_eq!(hw.count(|c| matches!(c, HwCall::Start(_))), 2);
}

#[test]
fn updates_within_throttle_window_are_coalesced() {
    let (mut app, mut hw, mut sink) = advertising();

    hw.advance(60);
    app.handle_event(sample("zoom_in"), &mut hw, &mut sink);
    hw.advance(10);
    app.handle_event(sample("zoom_out"), &mut hw, &mut sink);
    hw.advance(10);
    app.handle_event(sample("rot_left"), &mut hw, &mut sink);

    assert_eq!(
        hw.calls,
        vec![HwCall::Update(encode(Some("zoom_in"), 4, 12, 1).to_vec())]
    );

    hw.advance(50);
    app.handle_event(sample("rot_right"), &mut hw, &mut sink);
    assert_eq!(hw.count(|c| matches!(c, HwCall::Update(_))), 2);
}

#[test]
fn unsupported_update_restarts_advertising() {
    let (mut app, mut hw, mut sink) = advertising();
    hw.update_results.push_back(Err(RadioError::Unsupported));

    hw.advance(100);
    app.handle_event(sample("move_left"), &mut hw, &mut sink);
    let payload = encode(Some("move_left"), 4, 12, 1).to_vec();
    assert_eq!(
        hw.calls,
        vec![
            HwCall::Update(payload.clone()),
            HwCall::Stop,
            HwCall::Schedule(Duration::from_ticks(0)),
        ]
    );
    assert_eq!(app.advertising().phase(), AdvPhase::Idle);
    assert!(sink.events.contains(&AppEvent::AdvertisingRestart));

    hw.calls.clear();
    app.handle_event(Event::AdvRetry, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![HwCall::Start(payload)]);
    assert_eq!(app.advertising().phase(), AdvPhase::Active);
}

#[test]
fn unexpected_update_failure_is_reported_once() {
    let (mut app, mut hw, mut sink) = advertising();
    hw.update_results.push_back(Err(RadioError::Other(-3)));

    hw.advance(100);
    app.handle_event(sample("idle"), &mut hw, &mut sink);

    assert!(hw.schedules().is_empty(), "not retried");
    assert_eq!(app.advertising().phase(), AdvPhase::Active);
    assert_eq!(
        sink.events,
        vec![AppEvent::RadioFailed(RadioError::Other(-3))]
    );
}

#[test]
fn duplicate_radio_ready_is_ignored() {
    let (mut app, mut hw, mut sink) = advertising();
    app.handle_event(Event::RadioReady, &mut hw, &mut sink);
    assert!(hw.calls.is_empty());
}

#[test]
fn rejected_start_drops_to_idle_and_restarts() {
    let (mut app, mut hw, mut sink) = advertising();

    app.handle_event(Event::AdvStartFailed(RadioError::Busy), &mut hw, &mut sink);
    assert_eq!(app.advertising().phase(), AdvPhase::Idle);
    assert_eq!(
        hw.calls,
        vec![HwCall::Stop, HwCall::Schedule(Duration::from_millis(150))]
    );

    hw.calls.clear();
    hw.advance(150);
    app.handle_event(Event::AdvRetry, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![HwCall::Start(initial_payload().to_vec())]);
    assert_eq!(app.advertising().phase(), AdvPhase::Active);
}

#[test]
fn hard_start_rejection_is_reported() {
    let (mut app, mut hw, mut sink) = advertising();

    app.handle_event(
        Event::AdvStartFailed(RadioError::Unsupported),
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.advertising().phase(), AdvPhase::Idle);
    assert!(hw.schedules().is_empty());
    assert_eq!(
        sink.events,
        vec![AppEvent::RadioFailed(RadioError::Unsupported)]
    );

    // The next sample starts advertising again.
    app.handle_event(sample("zoom_in"), &mut hw, &mut sink);
    assert_eq!(app.advertising().phase(), AdvPhase::Active);
}
