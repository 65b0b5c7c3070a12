//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A classifier-facing adapter would implement the same trait to act on
//! sign-in changes.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SignIn(state) => {
                info!("SIGNIN | {}", if *state { "in" } else { "out" });
            }
            AppEvent::StableResult(label) => {
                info!("RESULT | {}", label.as_deref().unwrap_or("<none>"));
            }
            AppEvent::EffectDisplayed { led_id, effect } => {
                info!("LED | led={} effect={:?}", led_id, effect);
            }
            AppEvent::ModeChanged(mode) => {
                info!("MODE | {:?}", mode);
            }
            AppEvent::AdvertisingStarted { len } => {
                info!("ADV | started, {} bytes", len);
            }
            AppEvent::AdvertisingRestart => {
                info!("ADV | restarting");
            }
            AppEvent::RadioFailed(e) => {
                warn!("ADV | radio failure: {}", e);
            }
            AppEvent::Started => {
                info!("START | ready for events");
            }
        }
    }
}
