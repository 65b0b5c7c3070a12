//! MlBeacon firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod advertising;
pub mod app;
pub mod config;
pub mod decision;
pub mod error;
pub mod events;

// Platform adapters and drivers; the ESP-IDF implementations are guarded
// by cfg attributes inside, host builds get simulation stubs.
pub mod adapters;
pub mod drivers;
