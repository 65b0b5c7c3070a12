//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: forward sign-in state to the
//! classifier, log to serial, and so on.

use crate::decision::effects::EffectRef;
use crate::decision::sample::{AppMode, Label};
use crate::error::RadioError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Upstream classifier should keep producing results (`true`) or pause.
    SignIn(bool),

    /// The debouncer produced a stable result.
    StableResult(Option<Label>),

    /// An effect was handed to the LED driver.
    EffectDisplayed { led_id: u8, effect: EffectRef },

    /// The operating mode changed.
    ModeChanged(AppMode),

    /// Advertising started with a payload of `len` bytes.
    AdvertisingStarted { len: usize },

    /// In-place update unsupported; advertising is being restarted.
    AdvertisingRestart,

    /// A non-transient radio failure, reported once and dropped.
    RadioFailed(RadioError),

    /// The application service finished initialisation.
    Started,
}
