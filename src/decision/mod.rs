//! Decision layer: pure logic between classifier output and LED / radio.
//!
//! Nothing here touches hardware; side effects go through the
//! [`ports`](crate::app::ports).

pub mod coordinator;
pub mod debouncer;
pub mod effects;
pub mod sample;
