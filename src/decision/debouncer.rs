//! Result debouncer.
//!
//! Turns the raw per-inference stream into *stable* labels: a label is
//! reported only after `streak_threshold` consecutive accepted samples
//! agree on it.
//!
//! ```text
//!  sample ──▶ acceptance rule ──▶ candidate ──[same as current?]──▶ streak += 1
//!                  │                              │ no
//!               rejected                     current = candidate
//!             (no change)                    streak = 0, then += 1
//!
//!  streak == threshold ──▶ emit StableResult, clear prediction
//! ```
//!
//! Acceptance, in priority order:
//!
//! 1. anomaly available and above threshold → `ANOMALY_LABEL`
//! 2. confidence ≥ value threshold → the sample's own label
//! 3. no anomaly score at all → `IDLE_LABEL`
//! 4. otherwise the sample is rejected and leaves the state untouched

use crate::config::SystemConfig;

use super::sample::{ANOMALY_LABEL, ClassificationSample, IDLE_LABEL, Label};

/// Candidate label and its run length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionState {
    pub current: Option<Label>,
    pub streak: u16,
}

/// A label that survived the full streak.
#[derive(Debug, Clone, PartialEq)]
pub struct StableResult {
    pub label: Option<Label>,
}

/// Per-sample outcome of the acceptance rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(Option<Label>),
    Rejected,
}

pub struct Debouncer {
    anomaly_threshold: f32,
    value_threshold: f32,
    streak_threshold: u16,
    state: PredictionState,
}

impl Debouncer {
    /// `streak_threshold` must be non-zero; [`SystemConfig::validate`]
    /// guarantees this for configured instances.
    pub fn new(anomaly_threshold: f32, value_threshold: f32, streak_threshold: u16) -> Self {
        debug_assert!(streak_threshold > 0);
        Self {
            anomaly_threshold,
            value_threshold,
            streak_threshold: streak_threshold.max(1),
            state: PredictionState::default(),
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            config.anomaly_threshold,
            config.value_threshold,
            config.prediction_streak_threshold,
        )
    }

    /// Apply the acceptance rule without touching the streak.
    pub fn classify(&self, sample: &ClassificationSample) -> Verdict {
        let anomaly_available = sample.anomaly_available();

        if anomaly_available && sample.anomaly > self.anomaly_threshold {
            Verdict::Accepted(Some(fixed_label(ANOMALY_LABEL)))
        } else if sample.value >= self.value_threshold {
            Verdict::Accepted(sample.label.clone())
        } else if !anomaly_available {
            Verdict::Accepted(Some(fixed_label(IDLE_LABEL)))
        } else {
            Verdict::Rejected
        }
    }

    /// Feed one sample. Returns the stable label when the streak completes.
    pub fn observe(&mut self, sample: &ClassificationSample) -> Option<StableResult> {
        let Verdict::Accepted(candidate) = self.classify(sample) else {
            return None;
        };

        if candidate != self.state.current {
            self.state.current = candidate;
            self.state.streak = 0;
        }
        self.state.streak += 1;

        if self.state.streak >= self.streak_threshold {
            let label = self.state.current.take();
            self.state.streak = 0;
            return Some(StableResult { label });
        }

        None
    }

    /// Forget the candidate, e.g. when model-running mode is re-entered.
    pub fn reset(&mut self) {
        self.state = PredictionState::default();
    }

    pub fn state(&self) -> &PredictionState {
        &self.state
    }

    pub fn streak_threshold(&self) -> u16 {
        self.streak_threshold
    }
}

fn fixed_label(text: &'static str) -> Label {
    let mut l = Label::new();
    // Reserved labels are far shorter than LABEL_CAP.
    let _ = l.push_str(text);
    l
}
