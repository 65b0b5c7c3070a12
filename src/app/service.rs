//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the debouncer, the LED coordinator, and the
//! advertising lifecycle.  It consumes one [`Event`] at a time; all I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!   Event queue ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                   │         AppService          │
//!   LedPort     ◀── │  Debouncer · LedCoordinator │
//!   RadioPort   ◀── │  AdvertisingLifecycle       │
//!   RetryTimer  ◀── └─────────────────────────────┘
//! ```

use log::{debug, error, info, warn};

use crate::advertising::lifecycle::{AdvOutcome, AdvPhase, AdvertisingLifecycle};
use crate::advertising::payload::encode;
use crate::config::SystemConfig;
use crate::decision::coordinator::LedCoordinator;
use crate::decision::debouncer::Debouncer;
use crate::decision::effects::EffectTable;
use crate::decision::sample::{AppMode, ClassificationSample};
use crate::error::ConfigError;
use crate::events::{Event, Module};

use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, LedPort, RadioPort, RetryTimerPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    effects: EffectTable,
    debouncer: Debouncer,
    leds: LedCoordinator,
    adv: AdvertisingLifecycle,
    main_ready: bool,
}

impl AppService {
    /// Construct the service, checking the configuration and effect table.
    ///
    /// An invalid configuration is a programmer error; the caller must not
    /// serve any event after this fails.
    pub fn new(config: SystemConfig, effects: EffectTable) -> Result<Self, ConfigError> {
        config.validate()?;
        effects.validate()?;

        Ok(Self {
            debouncer: Debouncer::from_config(&config),
            leds: LedCoordinator::new(&config),
            adv: AdvertisingLifecycle::new(),
            main_ready: false,
            config,
            effects,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started (streak {} · {} result effects)",
            self.debouncer.streak_threshold(),
            self.effects.len()
        );
    }

    // ── Event dispatch ────────────────────────────────────────

    /// Handle one inbound event to completion.
    ///
    /// `hw` satisfies every driven port at once; this avoids multiple
    /// mutable borrows while keeping the port boundary explicit.
    pub fn handle_event(
        &mut self,
        event: Event,
        hw: &mut (impl LedPort + RadioPort + RetryTimerPort + ClockPort),
        sink: &mut impl EventSink,
    ) {
        match event {
            Event::Classification(sample) => self.on_classification(&sample, hw, sink),
            Event::SensorSim(label) => {
                self.leds.on_sensor_sim(label.as_deref(), &self.effects, hw);
            }
            Event::ModeChanged(mode) => {
                if mode == AppMode::ModelRunning {
                    self.debouncer.reset();
                }
                self.leds.on_mode_changed(mode, &self.effects, hw, sink);
            }
            Event::ForwarderState(state) => self.leds.on_forwarder_state(state, hw, sink),
            Event::ModuleReady(Module::Main) => self.on_main_ready(hw, sink),
            Event::ModuleReady(other) => debug!("Module ready: {:?}", other),
            Event::LedReady { led_id, effect } => {
                self.leds.on_led_ready(led_id, effect, &self.effects, hw, sink);
            }
            Event::RadioReady => {
                info!("Radio stack ready");
                let outcome = self.adv.on_radio_ready(hw.now(), hw);
                self.report(outcome, sink);
            }
            Event::AdvRetry => {
                let outcome = self.adv.on_retry(hw.now(), hw);
                self.report(outcome, sink);
            }
            Event::AdvStartFailed(err) => {
                let outcome = self.adv.on_start_failed(err, hw);
                self.report(outcome, sink);
            }
        }
    }

    fn on_classification(
        &mut self,
        sample: &ClassificationSample,
        hw: &mut (impl LedPort + RadioPort + RetryTimerPort + ClockPort),
        sink: &mut impl EventSink,
    ) {
        if !self.leds.accepts_results() {
            debug!("Classification result dropped (mode {:?})", self.leds.mode());
            return;
        }

        if let Some(stable) = self.debouncer.observe(sample) {
            info!("Stable result: {}", stable.label.as_deref().unwrap_or("<none>"));
            sink.emit(&AppEvent::StableResult(stable.label.clone()));
            self.leds
                .on_stable_result(stable.label.as_deref(), &self.effects, hw, sink);
        }

        let payload = encode(
            sample.label.as_deref(),
            sample.dsp_time,
            sample.classification_time,
            sample.anomaly_time,
        );
        let outcome = self.adv.request(&payload, hw.now(), hw);
        self.report(outcome, sink);
    }

    fn on_main_ready(&mut self, hw: &mut impl RadioPort, sink: &mut impl EventSink) {
        if self.main_ready {
            warn!("Main module ready received twice, ignored");
            return;
        }
        self.main_ready = true;
        self.leds.set_signin(true, sink);

        if self.adv.phase() == AdvPhase::NotReady {
            if let Err(e) = hw.enable() {
                error!("Radio enable failed: {}", e);
                sink.emit(&AppEvent::RadioFailed(e));
            }
        }
    }

    fn report(&self, outcome: AdvOutcome, sink: &mut impl EventSink) {
        match outcome {
            AdvOutcome::Started => sink.emit(&AppEvent::AdvertisingStarted {
                len: self.adv.cached().len(),
            }),
            AdvOutcome::Restarting => sink.emit(&AppEvent::AdvertisingRestart),
            AdvOutcome::Failed(e) => sink.emit(&AppEvent::RadioFailed(e)),
            _ => {}
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn effects(&self) -> &EffectTable {
        &self.effects
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn coordinator(&self) -> &LedCoordinator {
        &self.leds
    }

    pub fn advertising(&self) -> &AdvertisingLifecycle {
        &self.adv
    }
}
