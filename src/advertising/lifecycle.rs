//! Advertising lifecycle.
//!
//! ```text
//!              radio ready                start ok
//!   NotReady ─────────────▶ Idle ─────────────────────▶ Active
//!      │                     │ ▲                          │
//!      │ request:            │ │ busy: retry +150 ms      │ update ok / throttled
//!      │ cache, retry        │ │                          │ busy: retry +150 ms
//!      ▼                     └─┘ update unsupported:  ◀───┘
//!   (no radio calls)           stop, retry immediately
//! ```
//!
//! A start the stack rejects after the fact (asynchronous completion)
//! drops Active back to Idle through [`AdvertisingLifecycle::on_start_failed`].
//!
//! Every entry point (`request`, retry expiry, radio ready) funnels into
//! [`AdvertisingLifecycle::drive`] with the cached payload, so a retry is
//! exactly a replay of the last request.

use embassy_time::{Duration, Instant};
use log::{debug, error, info, warn};

use crate::app::ports::{RadioPort, RetryTimerPort};
use crate::config::{RETRY_BACKOFF, UPDATE_THROTTLE};
use crate::error::RadioError;

use super::payload::{Payload, initial_payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvPhase {
    /// Stack not up yet; nothing reaches the radio.
    NotReady,
    /// Ready, not advertising.
    Idle,
    /// Advertising; data changes go through in-place updates.
    Active,
}

/// What one pass through the lifecycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvOutcome {
    /// Radio not ready; retry scheduled.
    Deferred,
    Started,
    Updated,
    /// Inside the update window; request coalesced.
    Throttled,
    /// Transient failure; retry scheduled.
    RetryScheduled,
    /// Update unsupported; advertising stopped and an immediate retry queued.
    Restarting,
    /// Non-transient failure, reported and dropped.
    Failed(RadioError),
    /// Stale retry or duplicate ready signal.
    Ignored,
}

pub struct AdvertisingLifecycle {
    phase: AdvPhase,
    last_update: Option<Instant>,
    cached: Payload,
    retry_pending: bool,
}

impl AdvertisingLifecycle {
    pub fn new() -> Self {
        Self {
            phase: AdvPhase::NotReady,
            last_update: None,
            cached: initial_payload(),
            retry_pending: false,
        }
    }

    pub fn phase(&self) -> AdvPhase {
        self.phase
    }

    pub fn cached(&self) -> &[u8] {
        &self.cached
    }

    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Advertise `payload`, replacing the cached bytes.
    pub fn request(
        &mut self,
        payload: &[u8],
        now: Instant,
        hw: &mut (impl RadioPort + RetryTimerPort),
    ) -> AdvOutcome {
        self.cached.clear();
        let n = payload.len().min(self.cached.capacity());
        let _ = self.cached.extend_from_slice(&payload[..n]);
        self.drive(now, hw)
    }

    /// Retry timer expired.
    pub fn on_retry(&mut self, now: Instant, hw: &mut (impl RadioPort + RetryTimerPort)) -> AdvOutcome {
        if !self.retry_pending {
            debug!("Stale advertising retry ignored");
            return AdvOutcome::Ignored;
        }
        self.retry_pending = false;
        debug!("Retrying advertising");
        self.drive(now, hw)
    }

    /// Radio stack came up.  Replays the cached payload once.
    pub fn on_radio_ready(
        &mut self,
        now: Instant,
        hw: &mut (impl RadioPort + RetryTimerPort),
    ) -> AdvOutcome {
        if self.phase != AdvPhase::NotReady {
            return AdvOutcome::Ignored;
        }
        self.phase = AdvPhase::Idle;
        self.drive(now, hw)
    }

    /// The stack reported that a start it had accepted did not take.
    pub fn on_start_failed(
        &mut self,
        err: RadioError,
        hw: &mut (impl RadioPort + RetryTimerPort),
    ) -> AdvOutcome {
        if self.phase != AdvPhase::Active {
            debug!("Late advertising start failure ignored: {}", err);
            return AdvOutcome::Ignored;
        }
        self.phase = AdvPhase::Idle;
        if let Err(e) = hw.stop() {
            warn!("Advertising stop failed: {}", e);
        }
        if err.is_transient() {
            warn!("Advertising start rejected: {}, retrying", err);
            self.schedule_retry(RETRY_BACKOFF, hw);
            AdvOutcome::RetryScheduled
        } else {
            error!("Advertising start rejected: {}", err);
            AdvOutcome::Failed(err)
        }
    }

    fn drive(&mut self, now: Instant, hw: &mut (impl RadioPort + RetryTimerPort)) -> AdvOutcome {
        match self.phase {
            AdvPhase::NotReady => {
                self.schedule_retry(RETRY_BACKOFF, hw);
                AdvOutcome::Deferred
            }
            AdvPhase::Idle => self.start(now, hw),
            AdvPhase::Active => self.update(now, hw),
        }
    }

    fn start(&mut self, now: Instant, hw: &mut (impl RadioPort + RetryTimerPort)) -> AdvOutcome {
        match hw.start(&self.cached) {
            Ok(()) => {
                self.cancel_retry(hw);
                self.phase = AdvPhase::Active;
                self.last_update = Some(now);
                info!("Advertising started ({} bytes)", self.cached.len());
                AdvOutcome::Started
            }
            Err(e) if e.is_transient() => {
                warn!("Advertising start failed: {}, retrying", e);
                self.schedule_retry(RETRY_BACKOFF, hw);
                AdvOutcome::RetryScheduled
            }
            Err(e) => {
                error!("Advertising start failed: {}", e);
                AdvOutcome::Failed(e)
            }
        }
    }

    fn update(&mut self, now: Instant, hw: &mut (impl RadioPort + RetryTimerPort)) -> AdvOutcome {
        let throttled = self
            .last_update
            .is_some_and(|last| now.saturating_duration_since(last) < UPDATE_THROTTLE);
        if throttled {
            return AdvOutcome::Throttled;
        }

        match hw.update(&self.cached) {
            Ok(()) => {
                self.cancel_retry(hw);
                self.last_update = Some(now);
                AdvOutcome::Updated
            }
            Err(RadioError::Unsupported) => {
                warn!("Advertising data update unsupported, restarting advertising");
                if let Err(e) = hw.stop() {
                    warn!("Advertising stop failed: {}", e);
                }
                self.phase = AdvPhase::Idle;
                self.schedule_retry(Duration::from_ticks(0), hw);
                AdvOutcome::Restarting
            }
            Err(e) if e.is_transient() => {
                debug!("Advertising update failed: {}, retrying", e);
                self.schedule_retry(RETRY_BACKOFF, hw);
                AdvOutcome::RetryScheduled
            }
            Err(e) => {
                error!("Advertising update failed: {}", e);
                AdvOutcome::Failed(e)
            }
        }
    }

    fn schedule_retry(&mut self, delay: Duration, timer: &mut impl RetryTimerPort) {
        timer.schedule(delay);
        self.retry_pending = true;
    }

    fn cancel_retry(&mut self, timer: &mut impl RetryTimerPort) {
        if self.retry_pending {
            timer.cancel();
            self.retry_pending = false;
        }
    }
}

impl Default for AdvertisingLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
