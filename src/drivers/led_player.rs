//! LED effect player.
//!
//! Plays one [`EffectDescriptor`] on one LED.  The main loop calls
//! `tick()` with the elapsed time and feeds the returned colour to the
//! [`StatusLed`](super::status_led::StatusLed).
//!
//! Each step fades from the previous colour to the step colour in
//! `substep_count` increments, holding each for `substep_time_ms`:
//!
//! ```text
//!   colour
//!     ▲          ┌──── step.color
//!     │       ┌──┘
//!     │    ┌──┘
//!     │ ───┘ previous
//!     └──────────────────▶ t
//!       │ substep_time_ms │
//! ```
//!
//! Looping effects wrap to the first step.  Finite effects hold their
//! last colour and report completion exactly once.

use crate::decision::effects::{COLOUR_OFF, EffectDescriptor, EffectRef, Rgb};

struct Playing {
    effect_ref: EffectRef,
    effect: EffectDescriptor,
    step: usize,
    elapsed_ms: u32,
    from: Rgb,
}

/// Effect player for a single LED. Stack-allocated, no heap.
pub struct LedEffectPlayer {
    colour: Rgb,
    playing: Option<Playing>,
}

impl LedEffectPlayer {
    pub fn new() -> Self {
        Self {
            colour: COLOUR_OFF,
            playing: None,
        }
    }

    /// Replace whatever is playing.  An effect without steps turns the LED off.
    pub fn start(&mut self, effect_ref: EffectRef, effect: &EffectDescriptor) {
        if effect.steps.is_empty() {
            self.colour = COLOUR_OFF;
            self.playing = None;
            return;
        }
        self.playing = Some(Playing {
            effect_ref,
            effect: effect.clone(),
            step: 0,
            elapsed_ms: 0,
            from: self.colour,
        });
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    pub fn colour(&self) -> Rgb {
        self.colour
    }

    /// Advance by `delta_ms`.  Returns the colour to show and, when a
    /// finite effect just finished, its reference.
    pub fn tick(&mut self, delta_ms: u32) -> (Rgb, Option<EffectRef>) {
        let Some(play) = self.playing.as_mut() else {
            return (self.colour, None);
        };
        play.elapsed_ms = play.elapsed_ms.saturating_add(delta_ms);

        // Bounded by one pass over the steps per zero-length cycle.
        let mut zero_length_steps = 0;
        loop {
            let step = play.effect.steps[play.step];
            let count = u32::from(step.substep_count.max(1));
            let substep_ms = u32::from(step.substep_time_ms);
            let step_ms = count * substep_ms;

            if play.elapsed_ms < step_ms {
                let k = (play.elapsed_ms / substep_ms + 1).min(count);
                self.colour = lerp(play.from, step.color, k, count);
                return (self.colour, None);
            }

            // Step complete.
            play.elapsed_ms -= step_ms;
            play.from = step.color;
            self.colour = step.color;
            zero_length_steps = if step_ms == 0 { zero_length_steps + 1 } else { 0 };

            if play.step + 1 < play.effect.steps.len() {
                play.step += 1;
                continue;
            }

            if play.effect.loop_forever && zero_length_steps < play.effect.steps.len() {
                play.step = 0;
                continue;
            }

            let finished = (!play.effect.loop_forever).then_some(play.effect_ref);
            self.playing = None;
            return (self.colour, finished);
        }
    }
}

impl Default for LedEffectPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// `from + (to - from) * k / n`, per channel.
fn lerp(from: Rgb, to: Rgb, k: u32, n: u32) -> Rgb {
    let ch = |a: u8, b: u8| -> u8 {
        let (a, b) = (i32::from(a), i32::from(b));
        (a + (b - a) * k as i32 / n as i32) as u8
    };
    (ch(from.0, to.0), ch(from.1, to.1), ch(from.2, to.2))
}
