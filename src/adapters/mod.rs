//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `ble`          | RadioPort          | Bluedroid GAP            |
//! | `hardware`     | LedPort            | LEDC PWM (RGB LEDs)      |
//! |                | RadioPort          | `ble`                    |
//! |                | RetryTimerPort     | `retry_timer`            |
//! |                | ClockPort          | `time`                   |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `retry_timer`  | RetryTimerPort     | ESP one-shot timer       |
//! | `time`         | ClockPort          | ESP32 system timer       |

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod retry_timer;
pub mod time;
