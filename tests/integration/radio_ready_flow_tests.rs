//! Radio readiness through the real event queue.
//!
//! The queue and the readiness latch are process-wide statics.  This is
//! the only test in the binary that touches them, so everything lives in
//! one function.

use crate::mock_hw::{HwCall, make_app};

use mlbeacon::advertising::lifecycle::AdvPhase;
use mlbeacon::advertising::payload::initial_payload;
use mlbeacon::advertising::ready::signal_radio_ready;
use mlbeacon::events::{Event, drain_events, push_event, queue_is_empty};

#[test]
fn radio_ready_survives_full_queue_and_starts_once() {
    let (mut app, mut hw, mut sink) = make_app();
    drain_events(|_| {});

    // Fill the queue so the first report is dropped.
    while push_event(Event::AdvRetry) {}
    signal_radio_ready();
    drain_events(|e| app.handle_event(e, &mut hw, &mut sink));
    assert_eq!(app.advertising().phase(), AdvPhase::NotReady);
    assert_eq!(hw.count(|c| matches!(c, HwCall::Start(_))), 0);

    // The next report gets through.
    signal_radio_ready();
    signal_radio_ready();
    drain_events(|e| app.handle_event(e, &mut hw, &mut sink));
    assert_eq!(app.advertising().phase(), AdvPhase::Active);
    assert_eq!(
        hw.calls
            .iter()
            .filter(|c| matches!(c, HwCall::Start(_)))
            .collect::<Vec<_>>(),
        vec![&HwCall::Start(initial_payload().to_vec())]
    );

    // Latched: later reports enqueue nothing.
    signal_radio_ready();
    assert!(queue_is_empty());
    drain_events(|e| app.handle_event(e, &mut hw, &mut sink));
    assert_eq!(hw.count(|c| matches!(c, HwCall::Start(_))), 1);
}
