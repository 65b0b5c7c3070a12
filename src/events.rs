//! Inbound event queue.
//!
//! Events are produced by:
//! - the classifier task (samples, sensor-sim labels)
//! - the host application (mode and forwarder state changes, module ready)
//! - the LED driver (effect finished)
//! - the radio stack callback and the retry timer
//!
//! They are consumed by the main loop, one at a time, in FIFO order.
//! Only the main loop mutates application state.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Classifier  │────▶│              │     │              │
//! │ LED driver  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Radio cb    │────▶│   (Channel)  │     │  (consumer)  │
//! │ Retry timer │────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::decision::effects::EffectRef;
use crate::decision::sample::{AppMode, ClassificationSample, ForwarderState, Label};
use crate::error::RadioError;

/// Maximum number of pending events.
const EVENT_QUEUE_CAP: usize = 32;

/// Modules that announce readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Main,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // ── Classifier ────────────────────────────────────────
    /// One inference result.
    Classification(ClassificationSample),
    /// Simulated sensor signal label; `None` re-sends the last effect.
    SensorSim(Option<Label>),

    // ── Host application ──────────────────────────────────
    ModeChanged(AppMode),
    ForwarderState(ForwarderState),
    ModuleReady(Module),

    // ── Drivers ───────────────────────────────────────────
    /// A finite effect finished playing.
    LedReady { led_id: u8, effect: EffectRef },
    /// Radio stack is up.  Enqueued once by the readiness latch.
    RadioReady,
    /// Advertising retry timer expired.
    AdvRetry,
    /// The stack rejected an advertising start after accepting the request.
    AdvStartFailed(RadioError),
}

static EVENT_QUEUE: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP> = Channel::new();

/// Push an event into the queue.
/// Safe to call from any task or timer callback.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    EVENT_QUEUE.try_send(event).is_ok()
}

/// Pop the next event from the queue.
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    EVENT_QUEUE.try_receive().ok()
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

pub fn queue_is_empty() -> bool {
    EVENT_QUEUE.is_empty()
}

/// Number of pending events.
pub fn queue_len() -> usize {
    EVENT_QUEUE.len()
}
