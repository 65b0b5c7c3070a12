//! BLE beacon: payload encoding, lifecycle state machine, readiness latch.

pub mod lifecycle;
pub mod payload;
pub mod ready;
