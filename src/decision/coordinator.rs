//! LED / signaling coordinator.
//!
//! Owns what the ML-state LED shows and whether the classifier is signed
//! in.  One instance drives the ML-state channel and, optionally, the
//! sensor-simulation channel.
//!
//! ```text
//!            stable result (non-blocking)      stable result (blocking)
//!   Idle ───────────────────────────▶ Showing ──────────────────────▶ Blocking
//!                                       ▲  ▲                            │
//!                                       │  └─────── LED ack for ────────┘
//!                                       │           blocking effect
//!                                       │           (forced default refresh,
//!                                       │            sign-in)
//!                         mode → ModelRunning (forced default refresh)
//! ```
//!
//! While blocking, the classifier is signed out and callers must not feed
//! new results ([`LedCoordinator::accepts_results`] gates this).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LedPort};
use crate::config::{LedMap, SystemConfig};

use super::effects::{EffectRef, EffectTable};
use super::sample::{ANOMALY_LABEL, AppMode, ForwarderState};

/// Observable state of the ML-state channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Showing(EffectRef),
    Blocking(EffectRef),
}

pub struct LedCoordinator {
    led_map: LedMap,
    display_ml_results: bool,
    display_sensor_sim: bool,
    display_data_forwarder: bool,
    mode: Option<AppMode>,
    forwarder_state: ForwarderState,
    /// Result effect currently on the ML-state LED.
    result_effect: Option<usize>,
    /// Set while a blocking effect plays; cleared by its acknowledgment.
    blocking: Option<EffectRef>,
    /// Last effect resolved for the sensor-sim channel.
    sim_effect: Option<usize>,
}

impl LedCoordinator {
    pub fn new(config: &SystemConfig) -> Self {
        let forwarder_state = if config.display_data_forwarder {
            ForwarderState::Disconnected
        } else {
            ForwarderState::Transmitting
        };
        Self {
            led_map: config.led_map,
            display_ml_results: config.display_ml_results,
            display_sensor_sim: config.display_sensor_sim,
            display_data_forwarder: config.display_data_forwarder,
            mode: None,
            forwarder_state,
            result_effect: None,
            blocking: None,
            sim_effect: None,
        }
    }

    pub fn mode(&self) -> Option<AppMode> {
        self.mode
    }

    pub fn forwarder_state(&self) -> ForwarderState {
        self.forwarder_state
    }

    pub fn is_suspended(&self) -> bool {
        self.blocking.is_some()
    }

    /// `true` when classification results may be processed.
    pub fn accepts_results(&self) -> bool {
        self.mode == Some(AppMode::ModelRunning) && self.blocking.is_none()
    }

    pub fn display_state(&self) -> DisplayState {
        match (self.blocking, self.result_effect) {
            (Some(effect), _) => DisplayState::Blocking(effect),
            (None, Some(i)) => DisplayState::Showing(EffectRef::Result(i)),
            (None, None) => DisplayState::Idle,
        }
    }

    // ── Classification results ────────────────────────────────

    /// Show the effect for a stable label.
    pub fn on_stable_result(
        &mut self,
        label: Option<&str>,
        table: &EffectTable,
        led: &mut impl LedPort,
        sink: &mut impl EventSink,
    ) {
        if !self.accepts_results() {
            // Gated by the caller; reaching here means a result slipped
            // through while suspended.
            warn!("Dropping stable result while results are suspended");
            return;
        }
        if !self.display_ml_results {
            self.set_signin(true, sink);
            return;
        }
        self.display_result(label, false, table, led, sink);
    }

    /// Driver finished playing `effect` on `led_id`.
    pub fn on_led_ready(
        &mut self,
        led_id: u8,
        effect: EffectRef,
        table: &EffectTable,
        led: &mut impl LedPort,
        sink: &mut impl EventSink,
    ) {
        if led_id == self.led_map.ml_state
            && self.mode == Some(AppMode::ModelRunning)
            && self.blocking == Some(effect)
        {
            self.display_result(None, true, table, led, sink);
        }
    }

    fn display_result(
        &mut self,
        label: Option<&str>,
        force: bool,
        table: &EffectTable,
        led: &mut impl LedPort,
        sink: &mut impl EventSink,
    ) {
        let new_effect = table.resolve(label);

        if self.result_effect == Some(new_effect) && !force {
            return;
        }

        if !force {
            match label {
                Some(ANOMALY_LABEL) => info!("Anomaly detected"),
                Some(l) if new_effect == EffectTable::DEFAULT => {
                    info!("No LED effect for label: {}", l);
                }
                Some(l) => info!("Displaying LED effect for label: {}", l),
                None => info!("Displaying default LED effect"),
            }
        }

        // Keep the simulated-signal LED in step with a recognised result.
        if self.display_sensor_sim && new_effect != EffectTable::DEFAULT {
            self.show_sensor_sim(table, led);
        }

        self.result_effect = Some(new_effect);
        let effect = EffectRef::Result(new_effect);
        self.show(self.led_map.ml_state, effect, led, sink);

        if table.is_blocking(effect) {
            self.blocking = Some(effect);
            self.set_signin(false, sink);
        } else {
            self.blocking = None;
            self.set_signin(true, sink);
        }
    }

    // ── Mode and forwarder state ──────────────────────────────

    /// Apply a mode change.  The caller clears the debouncer when entering
    /// model-running mode.
    pub fn on_mode_changed(
        &mut self,
        mode: AppMode,
        table: &EffectTable,
        led: &mut impl LedPort,
        sink: &mut impl EventSink,
    ) {
        self.mode = Some(mode);
        sink.emit(&AppEvent::ModeChanged(mode));

        match mode {
            AppMode::ModelRunning => self.display_result(None, true, table, led, sink),
            AppMode::DataForwarding => self.show_forwarder(led, sink),
            AppMode::Other => warn!("Unsupported application mode, LED left unchanged"),
        }
    }

    /// Ignored when the forwarder display is off; the stored state then
    /// stays at its seeded value.
    pub fn on_forwarder_state(
        &mut self,
        state: ForwarderState,
        led: &mut impl LedPort,
        sink: &mut impl EventSink,
    ) {
        if !self.display_data_forwarder {
            return;
        }
        self.forwarder_state = state;
        if self.mode == Some(AppMode::DataForwarding) {
            self.show_forwarder(led, sink);
        }
    }

    fn show_forwarder(&mut self, led: &mut impl LedPort, sink: &mut impl EventSink) {
        let effect = EffectRef::Forwarder(self.forwarder_state);
        self.show(self.led_map.ml_state, effect, led, sink);
    }

    // ── Sensor simulation channel ─────────────────────────────

    /// A new simulated-signal label.  `None` re-sends the last effect.
    pub fn on_sensor_sim(
        &mut self,
        label: Option<&str>,
        table: &EffectTable,
        led: &mut impl LedPort,
    ) {
        if !self.display_sensor_sim {
            return;
        }
        if let Some(l) = label {
            let effect = table.resolve(Some(l));
            if effect == EffectTable::DEFAULT {
                warn!("No LED effect for sensor_sim label {}", l);
            }
            self.sim_effect = Some(effect);
        }
        self.show_sensor_sim(table, led);
    }

    fn show_sensor_sim(&self, table: &EffectTable, led: &mut impl LedPort) {
        let (Some(led_id), Some(i)) = (self.led_map.sensor_sim, self.sim_effect) else {
            return;
        };
        let effect = EffectRef::Result(i);
        if table.is_blocking(effect) {
            warn!("Blocking effect not allowed on sensor_sim LED, skipped");
            return;
        }
        led.show(led_id, effect);
    }

    // ── Output helpers ────────────────────────────────────────

    fn show(&self, led_id: u8, effect: EffectRef, led: &mut impl LedPort, sink: &mut impl EventSink) {
        led.show(led_id, effect);
        sink.emit(&AppEvent::EffectDisplayed { led_id, effect });
    }

    /// Tell the classifier whether to keep producing results.
    pub fn set_signin(&self, state: bool, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::SignIn(state));
        info!(
            "Currently {} result event",
            if state { "signed in" } else { "signed off from" }
        );
    }
}
