//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (LED driver, radio stack, retry timer, clock, event
//! sinks) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the decision layer never touches
//! hardware directly.
//!
//! Every port call is synchronous and returns immediately; outcomes the
//! hardware reports later (effect finished, radio ready, timer fired)
//! come back as [`Event`](crate::events::Event)s through the queue.

use embassy_time::{Duration, Instant};

use crate::decision::effects::EffectRef;
use crate::error::RadioError;

// ───────────────────────────────────────────────────────────────
// LED port (driven adapter: domain → LED driver)
// ───────────────────────────────────────────────────────────────

/// Write-side port for LED effect playback.
pub trait LedPort {
    /// Start playing `effect` on physical LED `led_id`, replacing whatever
    /// was playing.  The driver acknowledges completion of finite effects
    /// with [`Event::LedReady`](crate::events::Event::LedReady).
    fn show(&mut self, led_id: u8, effect: EffectRef);
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain → advertising stack)
// ───────────────────────────────────────────────────────────────

/// Legacy advertising control.  `payload` is the 16-bit service data
/// (at most 31 bytes); the adapter frames it into advertising data.
pub trait RadioPort {
    /// Bring the stack up.  Readiness is reported asynchronously through
    /// [`signal_radio_ready`](crate::advertising::ready::signal_radio_ready).
    fn enable(&mut self) -> Result<(), RadioError>;

    /// Start advertising with `payload`.
    fn start(&mut self, payload: &[u8]) -> Result<(), RadioError>;

    /// Replace the advertising data while advertising.
    fn update(&mut self, payload: &[u8]) -> Result<(), RadioError>;

    /// Stop advertising.
    fn stop(&mut self) -> Result<(), RadioError>;
}

// ───────────────────────────────────────────────────────────────
// Retry timer port
// ───────────────────────────────────────────────────────────────

/// Single one-shot timer.  Expiry is delivered as
/// [`Event::AdvRetry`](crate::events::Event::AdvRetry).
pub trait RetryTimerPort {
    /// Arm the timer; an already-armed timer is re-armed, never stacked.
    fn schedule(&mut self, delay: Duration);

    /// Disarm the timer.  No-op if not armed.
    fn cancel(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Monotonic time since boot.
    fn now(&self) -> Instant;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → upstream / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Sign-in notifications reach the classifier this
/// way; adapters also log them.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
