//! Inbound data model: classifier samples, operating mode, forwarder state.

use crate::error::Error;

/// Maximum label length accepted from the classifier.
pub const LABEL_CAP: usize = 32;

/// Owned classifier label. Compared by value.
pub type Label = heapless::String<LABEL_CAP>;

/// Reserved label selected when the anomaly score exceeds its threshold.
pub const ANOMALY_LABEL: &str = "anomaly";

/// Label selected for low-confidence samples without an anomaly score.
pub const IDLE_LABEL: &str = "idle";

/// Build a [`Label`] from text, failing if it does not fit.
pub fn label(text: &str) -> Result<Label, Error> {
    let mut l = Label::new();
    l.push_str(text).map_err(|_| Error::LabelTooLong)?;
    Ok(l)
}

/// Build a [`Label`] from text, cutting it at the last whole character
/// that fits.
pub fn truncated_label(text: &str) -> Label {
    let mut l = Label::new();
    for c in text.chars() {
        if l.push(c).is_err() {
            break;
        }
    }
    l
}

/// One inference cycle's output, consumed once by the decision layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationSample {
    pub label: Option<Label>,
    /// Confidence of `label`, typically 0.0–1.0.
    pub value: f32,
    /// Anomaly score; negative means the model has no anomaly block.
    pub anomaly: f32,
    pub dsp_time: u32,
    pub classification_time: u32,
    pub anomaly_time: u32,
}

impl ClassificationSample {
    /// Sample with zeroed timing fields.  Labels longer than
    /// [`LABEL_CAP`] are truncated.
    pub fn new(label: Option<&str>, value: f32, anomaly: f32) -> Self {
        Self {
            label: label.map(truncated_label),
            value,
            anomaly,
            dsp_time: 0,
            classification_time: 0,
            anomaly_time: 0,
        }
    }

    /// Attach the three latency measurements carried into the beacon payload.
    pub fn with_timings(mut self, dsp: u32, classification: u32, anomaly: u32) -> Self {
        self.dsp_time = dsp;
        self.classification_time = classification;
        self.anomaly_time = anomaly;
        self
    }

    /// `true` when the model reported an anomaly score.
    pub fn anomaly_available(&self) -> bool {
        self.anomaly >= 0.0
    }
}

/// Application operating mode, set externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    ModelRunning,
    DataForwarding,
    /// Any mode this module has no display for.
    Other,
}

/// Connection state of the data forwarder, shown while forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ForwarderState {
    Disconnected = 0,
    Connected = 1,
    Transmitting = 2,
}

impl ForwarderState {
    pub const COUNT: usize = 3;
}
