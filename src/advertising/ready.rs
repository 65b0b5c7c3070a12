//! Radio readiness latch.
//!
//! The stack can report readiness from its own callback task, from the
//! boot path, or both.  The first caller flips the latch and enqueues a
//! single [`Event::RadioReady`]; everyone after that is a no-op.  If the
//! event cannot be queued the latch is reopened so a later report gets
//! through.  The replay itself happens on the main loop.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::events::{Event, push_event};

pub struct RadioReadiness {
    ready: AtomicBool,
}

impl RadioReadiness {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Flip not-ready → ready.  Returns `true` only for the caller that won.
    pub fn mark_ready(&self) -> bool {
        self.ready
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Flip the latch and hand [`Event::RadioReady`] to `push`.  A rejected
    /// push reopens the latch.  Returns `true` if the event was queued.
    pub fn signal(&self, push: impl FnOnce(Event) -> bool) -> bool {
        if !self.mark_ready() {
            debug!("Radio already marked ready");
            return false;
        }
        if !push(Event::RadioReady) {
            self.ready.store(false, Ordering::Release);
            warn!("Event queue full, radio-ready event dropped");
            return false;
        }
        true
    }
}

impl Default for RadioReadiness {
    fn default() -> Self {
        Self::new()
    }
}

static RADIO_READINESS: RadioReadiness = RadioReadiness::new();

/// Report that the radio stack is up.  Safe from any context.
pub fn signal_radio_ready() {
    let _ = RADIO_READINESS.signal(push_event);
}
