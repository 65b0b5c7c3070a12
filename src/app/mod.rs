//! Application core: pure domain logic, zero I/O.
//!
//! Event dispatch for the beacon: debouncing, LED signaling, and the
//! advertising lifecycle.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
