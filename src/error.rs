//! Unified error types for the MlBeacon firmware.
//!
//! A single `Error` enum that every subsystem converts into. All variants
//! are `Copy` so they pass through the event loop and log sink without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Static configuration is invalid. Fatal at startup.
    Config(ConfigError),
    /// The radio stack rejected a request.
    Radio(RadioError),
    /// A classifier label does not fit the fixed label buffer.
    LabelTooLong,
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::LabelTooLong => write!(f, "label exceeds buffer capacity"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Violations of the static configuration invariants.
///
/// These are programmer errors: they are checked once before the first
/// event is served and are never produced by runtime conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The prediction streak threshold must be at least 1.
    StreakThresholdZero,
    /// A confidence or anomaly threshold is negative or not finite.
    ThresholdOutOfRange(&'static str),
    /// The result effect table has no default entry.
    NoDefaultEffect,
    /// The default entry (index 0) carries a label.
    DefaultEffectLabelled,
    /// The default effect would suspend results while it plays.
    DefaultEffectBlocking,
    /// A non-default entry has no label.
    MissingLabel(usize),
    /// An entry has an empty step list.
    EmptyEffect(usize),
    /// More than one entry carries the anomaly label.
    DuplicateAnomalyLabel,
    /// The two logical LED channels map to the same physical LED.
    LedChannelConflict,
    /// JSON override could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreakThresholdZero => write!(f, "prediction streak threshold must be > 0"),
            Self::ThresholdOutOfRange(which) => write!(f, "{which} threshold out of range"),
            Self::NoDefaultEffect => write!(f, "result effect table is empty"),
            Self::DefaultEffectLabelled => write!(f, "default effect must not have a label"),
            Self::DefaultEffectBlocking => write!(f, "default effect must not be blocking"),
            Self::MissingLabel(i) => write!(f, "effect entry {i} has no label"),
            Self::EmptyEffect(i) => write!(f, "effect entry {i} has no steps"),
            Self::DuplicateAnomalyLabel => write!(f, "anomaly label used more than once"),
            Self::LedChannelConflict => write!(f, "LED channels must map to distinct LEDs"),
            Self::Malformed => write!(f, "malformed configuration"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

/// Outcome classes reported synchronously by the advertising stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Stack busy or asked us to try again. Expected to clear on its own.
    Busy,
    /// In-place advertising data update is not supported.
    Unsupported,
    /// Anything else, carrying the raw stack error code.
    Other(i32),
}

impl RadioError {
    /// Transient errors are retried with the fixed backoff.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Busy)
    }
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "stack busy"),
            Self::Unsupported => write!(f, "operation not supported"),
            Self::Other(code) => write!(f, "stack error {code}"),
        }
    }
}

impl core::error::Error for RadioError {}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
