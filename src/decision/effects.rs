//! LED effect descriptors, the label → effect table, and its resolver.
//!
//! Effects are lists of colour steps.  A step fades from the previous
//! colour to `color` over `substep_count` substeps of `substep_time_ms`.
//! An effect that runs a finite multi-step sequence is *blocking*: new
//! results are suspended until the LED driver reports it finished.
//!
//! ## Default result effects
//!
//! | Index | Label        | Effect                      |
//! |-------|--------------|-----------------------------|
//! | 0     | —            | blink 1000/2000 ms, white   |
//! | 1     | `anomaly`    | solid magenta               |
//! | 2     | `idle`       | solid white                 |
//! | 3     | `zoom_in`    | solid red                   |
//! | 4     | `zoom_out`   | solid blue                  |
//! | 5     | `rot_left`   | solid green                 |
//! | 6     | `rot_right`  | solid purple                |
//! | 7     | `move_left`  | solid grey                  |
//! | 8     | `move_right` | solid light green           |

use crate::error::ConfigError;

use super::sample::{ANOMALY_LABEL, ForwarderState};

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

pub const COLOUR_OFF: Rgb = (0, 0, 0);

/// Maximum steps in one effect.
pub const MAX_EFFECT_STEPS: usize = 8;

/// Maximum entries in the result effect table.
pub const MAX_RESULT_EFFECTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectStep {
    pub color: Rgb,
    pub substep_count: u16,
    pub substep_time_ms: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDescriptor {
    pub steps: heapless::Vec<EffectStep, MAX_EFFECT_STEPS>,
    pub loop_forever: bool,
}

impl EffectDescriptor {
    fn from_steps(steps: &[EffectStep], loop_forever: bool) -> Self {
        let mut v = heapless::Vec::new();
        for step in steps.iter().take(MAX_EFFECT_STEPS) {
            let _ = v.push(*step);
        }
        Self {
            steps: v,
            loop_forever,
        }
    }

    /// Solid colour, shown once and held.
    pub fn on(color: Rgb) -> Self {
        Self::from_steps(
            &[EffectStep {
                color,
                substep_count: 1,
                substep_time_ms: 0,
            }],
            false,
        )
    }

    /// Symmetric on/off blink, forever.
    pub fn blink(period_ms: u16, color: Rgb) -> Self {
        Self::blink2(period_ms, period_ms, color)
    }

    /// Asymmetric on/off blink, forever.
    pub fn blink2(on_ms: u16, off_ms: u16, color: Rgb) -> Self {
        Self::from_steps(
            &[
                EffectStep {
                    color,
                    substep_count: 1,
                    substep_time_ms: on_ms,
                },
                EffectStep {
                    color: COLOUR_OFF,
                    substep_count: 1,
                    substep_time_ms: off_ms,
                },
            ],
            true,
        )
    }

    /// `count` on/off flashes, then stop.  Blocking when the sequence has
    /// more than one step.
    pub fn pulses(count: u8, period_ms: u16, color: Rgb) -> Self {
        let mut steps = heapless::Vec::<EffectStep, MAX_EFFECT_STEPS>::new();
        for _ in 0..count {
            let _ = steps.push(EffectStep {
                color,
                substep_count: 1,
                substep_time_ms: period_ms,
            });
            let _ = steps.push(EffectStep {
                color: COLOUR_OFF,
                substep_count: 1,
                substep_time_ms: period_ms,
            });
        }
        Self {
            steps,
            loop_forever: false,
        }
    }

    /// A blocking effect must play to completion before results resume.
    pub fn is_blocking(&self) -> bool {
        !self.loop_forever && self.steps.len() > 1
    }

    pub fn is_valid(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// Identity of an effect handed to the LED driver and echoed back in its
/// completion acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectRef {
    /// Index into the result effect table.
    Result(usize),
    /// Data forwarder state effect.
    Forwarder(ForwarderState),
}

/// One row of the result table.
#[derive(Debug, Clone)]
pub struct ResultEffect {
    pub label: Option<&'static str>,
    pub effect: EffectDescriptor,
}

/// Effects shown on the ML-state LED: index 0 is the default.
#[derive(Clone)]
pub struct EffectTable {
    results: heapless::Vec<ResultEffect, MAX_RESULT_EFFECTS>,
    forwarder: [EffectDescriptor; ForwarderState::COUNT],
}

impl EffectTable {
    pub const DEFAULT: usize = 0;

    pub fn new(
        results: heapless::Vec<ResultEffect, MAX_RESULT_EFFECTS>,
        forwarder: [EffectDescriptor; ForwarderState::COUNT],
    ) -> Self {
        Self { results, forwarder }
    }

    /// Check the table invariants.  Called once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let default = self.results.first().ok_or(ConfigError::NoDefaultEffect)?;
        if default.label.is_some() {
            return Err(ConfigError::DefaultEffectLabelled);
        }
        if default.effect.is_blocking() {
            return Err(ConfigError::DefaultEffectBlocking);
        }
        if !default.effect.is_valid() {
            return Err(ConfigError::EmptyEffect(Self::DEFAULT));
        }

        let mut anomaly_count = 0;
        for (i, entry) in self.results.iter().enumerate().skip(1) {
            let label = entry.label.ok_or(ConfigError::MissingLabel(i))?;
            if !entry.effect.is_valid() {
                return Err(ConfigError::EmptyEffect(i));
            }
            if label == ANOMALY_LABEL {
                anomaly_count += 1;
            }
        }
        if anomaly_count > 1 {
            return Err(ConfigError::DuplicateAnomalyLabel);
        }

        for (i, effect) in self.forwarder.iter().enumerate() {
            if !effect.is_valid() {
                return Err(ConfigError::EmptyEffect(i));
            }
        }
        Ok(())
    }

    /// Effect index for `label`; unmatched and missing labels map to the default.
    pub fn resolve(&self, label: Option<&str>) -> usize {
        let Some(label) = label else {
            return Self::DEFAULT;
        };
        self.results
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, entry)| entry.label == Some(label))
            .map_or(Self::DEFAULT, |(i, _)| i)
    }

    pub fn get(&self, effect: EffectRef) -> Option<&EffectDescriptor> {
        match effect {
            EffectRef::Result(i) => self.results.get(i).map(|e| &e.effect),
            EffectRef::Forwarder(state) => Some(&self.forwarder[state as usize]),
        }
    }

    pub fn is_blocking(&self, effect: EffectRef) -> bool {
        self.get(effect).is_some_and(EffectDescriptor::is_blocking)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Table builders
// ═══════════════════════════════════════════════════════════════

/// Build the label → effect table.  Called once at startup.
pub fn build_result_effects() -> heapless::Vec<ResultEffect, MAX_RESULT_EFFECTS> {
    let rows: [(Option<&'static str>, EffectDescriptor); 9] = [
        (None, EffectDescriptor::blink2(1000, 2000, (255, 255, 255))),
        (Some(ANOMALY_LABEL), EffectDescriptor::on((255, 0, 255))),
        (Some("idle"), EffectDescriptor::on((255, 255, 255))),
        (Some("zoom_in"), EffectDescriptor::on((255, 0, 0))),
        (Some("zoom_out"), EffectDescriptor::on((0, 0, 255))),
        (Some("rot_left"), EffectDescriptor::on((0, 255, 0))),
        (Some("rot_right"), EffectDescriptor::on((127, 0, 127))),
        (Some("move_left"), EffectDescriptor::on((127, 127, 127))),
        (Some("move_right"), EffectDescriptor::on((127, 255, 127))),
    ];

    let mut table = heapless::Vec::new();
    for (label, effect) in rows {
        let _ = table.push(ResultEffect { label, effect });
    }
    table
}

/// Build the forwarder-state effects, indexed by [`ForwarderState`].
pub fn build_forwarder_effects() -> [EffectDescriptor; ForwarderState::COUNT] {
    [
        EffectDescriptor::blink(2000, (255, 0, 0)),
        EffectDescriptor::blink(500, (255, 0, 0)),
        EffectDescriptor::blink(50, (255, 0, 0)),
    ]
}

/// The stock table: [`build_result_effects`] + [`build_forwarder_effects`].
pub fn default_effect_table() -> EffectTable {
    EffectTable::new(build_result_effects(), build_forwarder_effects())
}
