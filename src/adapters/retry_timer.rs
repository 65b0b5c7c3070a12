//! Advertising retry timer.
//!
//! Implements [`RetryTimerPort`] with a single one-shot timer.  Re-arming
//! replaces the pending expiry, so at most one retry is ever in flight.
//!
//! - **`target_os = "espidf"`**: one `esp_timer` whose callback runs in
//!   the ESP timer task and pushes [`Event::AdvRetry`].  A zero delay
//!   pushes the event directly.
//! - **`not(target_os = "espidf")`**: a polled deadline; the caller checks
//!   [`RetryTimer::poll`] each loop iteration.

use embassy_time::Duration;

use crate::app::ports::RetryTimerPort;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::events::{Event, push_event};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn retry_cb(_arg: *mut core::ffi::c_void) {
    if !push_event(Event::AdvRetry) {
        log::warn!("retry_timer: event queue full, retry dropped");
    }
}

pub struct RetryTimer {
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    #[cfg(not(target_os = "espidf"))]
    deadline: Option<std::time::Instant>,
}

impl RetryTimer {
    /// Create the timer, disarmed.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, crate::error::Error> {
        let args = esp_timer_create_args_t {
            callback: Some(retry_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"adv_retry".as_ptr(),
            skip_unhandled_events: true,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: `args` outlives the call; the callback only pushes to the
        // event queue.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK {
            log::error!("retry_timer: create failed (rc={})", ret);
            return Err(crate::error::Error::Init("retry timer"));
        }
        Ok(Self { handle })
    }

    /// Create the timer, disarmed.
    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, crate::error::Error> {
        Ok(Self { deadline: None })
    }

    #[cfg(target_os = "espidf")]
    fn disarm(&mut self) {
        // SAFETY: `handle` is valid for the lifetime of `self`.  Stopping an
        // idle timer returns ESP_ERR_INVALID_STATE, which is fine.
        unsafe {
            esp_timer_stop(self.handle);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn disarm(&mut self) {
        self.deadline = None;
    }

    /// `true` while a retry is armed.
    #[cfg(not(target_os = "espidf"))]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` once when the deadline has passed, disarming the timer.
    #[cfg(not(target_os = "espidf"))]
    pub fn poll(&mut self) -> bool {
        match self.deadline {
            Some(d) if std::time::Instant::now() >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for RetryTimer {
    fn drop(&mut self) {
        self.disarm();
        // SAFETY: the timer is stopped; nothing references the handle after this.
        unsafe {
            esp_timer_delete(self.handle);
        }
    }
}

impl RetryTimerPort for RetryTimer {
    #[cfg(target_os = "espidf")]
    fn schedule(&mut self, delay: Duration) {
        self.disarm();
        if delay.as_ticks() == 0 {
            if !push_event(Event::AdvRetry) {
                log::warn!("retry_timer: event queue full, retry dropped");
            }
            return;
        }
        // SAFETY: `handle` is valid and the timer was stopped above.
        let ret = unsafe { esp_timer_start_once(self.handle, delay.as_micros()) };
        if ret != ESP_OK {
            log::error!("retry_timer: start failed (rc={})", ret);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn schedule(&mut self, delay: Duration) {
        let delay = std::time::Duration::from_micros(delay.as_micros());
        self.deadline = Some(std::time::Instant::now() + delay);
    }

    fn cancel(&mut self) {
        self.disarm();
    }
}
