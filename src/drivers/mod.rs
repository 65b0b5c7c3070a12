//! LED drivers: effect playback and PWM output.

pub mod led_player;
pub mod status_led;
