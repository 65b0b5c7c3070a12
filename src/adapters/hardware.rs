//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the BLE advertiser, the retry timer, the clock, and one effect
//! player + RGB output per physical LED, exposing them through
//! [`LedPort`], [`RadioPort`], [`RetryTimerPort`] and [`ClockPort`].
//! This is the only module in the system that touches actual hardware.
//! On non-espidf targets, the underlying drivers use cfg-gated
//! simulation stubs.

use embassy_time::{Duration, Instant};
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ClockPort, LedPort, RadioPort, RetryTimerPort};
use crate::decision::effects::{EffectRef, EffectTable};
use crate::drivers::led_player::LedEffectPlayer;
use crate::drivers::status_led::StatusLed;
use crate::error::RadioError;

use super::ble::BleAdvertiser;
use super::retry_timer::RetryTimer;
use super::time::Esp32TimeAdapter;

/// Physical LEDs on the largest supported board.
pub const MAX_LEDS: usize = 2;

struct LedChannel<P: SetDutyCycle> {
    player: LedEffectPlayer,
    output: StatusLed<P>,
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P: SetDutyCycle> {
    effects: EffectTable,
    leds: heapless::Vec<LedChannel<P>, MAX_LEDS>,
    ble: BleAdvertiser,
    timer: RetryTimer,
    clock: Esp32TimeAdapter,
}

impl<P: SetDutyCycle> HardwareAdapter<P> {
    /// `leds` are indexed by physical LED id.
    pub fn new(
        effects: EffectTable,
        leds: impl IntoIterator<Item = StatusLed<P>>,
        ble: BleAdvertiser,
        timer: RetryTimer,
        clock: Esp32TimeAdapter,
    ) -> Self {
        let mut channels = heapless::Vec::new();
        for output in leds {
            if channels
                .push(LedChannel {
                    player: LedEffectPlayer::new(),
                    output,
                })
                .is_err()
            {
                warn!("More than {} LEDs supplied, extra ignored", MAX_LEDS);
                break;
            }
        }
        Self {
            effects,
            leds: channels,
            ble,
            timer,
            clock,
        }
    }

    /// Advance every LED by `delta` and write the resulting colours.
    /// Returns the finite effects that finished.
    pub fn tick_leds(&mut self, delta: Duration) -> heapless::Vec<(u8, EffectRef), MAX_LEDS> {
        let delta_ms = u32::try_from(delta.as_millis()).unwrap_or(u32::MAX);
        let mut finished = heapless::Vec::new();
        for (id, ch) in self.leds.iter_mut().enumerate() {
            let (colour, done) = ch.player.tick(delta_ms);
            if ch.output.set_colour(colour).is_err() {
                warn!("LED {}: PWM write failed", id);
            }
            if let Some(effect) = done {
                // `id` < MAX_LEDS, both fit.
                let _ = finished.push((id as u8, effect));
            }
        }
        finished
    }

    pub fn ble(&self) -> &BleAdvertiser {
        &self.ble
    }
}

// ── LedPort implementation ────────────────────────────────────

impl<P: SetDutyCycle> LedPort for HardwareAdapter<P> {
    fn show(&mut self, led_id: u8, effect: EffectRef) {
        let Some(ch) = self.leds.get_mut(usize::from(led_id)) else {
            warn!("No LED with id {}", led_id);
            return;
        };
        match self.effects.get(effect) {
            Some(descriptor) => ch.player.start(effect, descriptor),
            None => warn!("Unknown effect {:?}", effect),
        }
    }
}

// ── RadioPort implementation ──────────────────────────────────

impl<P: SetDutyCycle> RadioPort for HardwareAdapter<P> {
    fn enable(&mut self) -> Result<(), RadioError> {
        self.ble.enable()
    }

    fn start(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        self.ble.start(payload)
    }

    fn update(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        self.ble.update(payload)
    }

    fn stop(&mut self) -> Result<(), RadioError> {
        self.ble.stop()
    }
}

// ── RetryTimerPort / ClockPort implementation ─────────────────

impl<P: SetDutyCycle> RetryTimerPort for HardwareAdapter<P> {
    fn schedule(&mut self, delay: Duration) {
        self.timer.schedule(delay);
    }

    fn cancel(&mut self) {
        self.timer.cancel();
    }
}

impl<P: SetDutyCycle> ClockPort for HardwareAdapter<P> {
    fn now(&self) -> Instant {
        self.clock.now()
    }
}
