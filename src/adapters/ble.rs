//! BLE beacon adapter.
//!
//! Implements [`RadioPort`] with legacy, non-connectable advertising of the
//! beacon service data.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GAP via `esp_idf_svc::sys`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Advertising data
//!
//! | AD type              | Content                       |
//! |----------------------|-------------------------------|
//! | Flags                | `0x06` (LE General, no BR/EDR)|
//! | Complete 16-bit UUID | `0xFEAA`                      |
//! | Service Data 16      | beacon payload                |
//!
//! ## Status mapping
//!
//! | ESP-IDF status          | [`RadioError`]  |
//! |-------------------------|-----------------|
//! | `ESP_ERR_INVALID_STATE` | `Busy`          |
//! | `ESP_ERR_NO_MEM`        | `Busy`          |
//! | `ESP_ERR_NOT_SUPPORTED` | `Unsupported`   |
//! | anything else non-zero  | `Other(code)`   |
//!
//! The asynchronous start completion carries a Bluetooth status instead;
//! `BUSY` and `NOMEM` map to `Busy`, `UNSUPPORTED` to `Unsupported`.  A
//! failed start is reported as [`Event::AdvStartFailed`].
//!
//! [`Event::AdvStartFailed`]: crate::events::Event::AdvStartFailed

use log::info;

use crate::advertising::payload::{Payload, frame_advertisement};
use crate::app::ports::RadioPort;
use crate::error::RadioError;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

const ESP_OK: i32 = 0;
const ESP_ERR_NO_MEM: i32 = 0x101;
const ESP_ERR_INVALID_STATE: i32 = 0x103;
const ESP_ERR_NOT_SUPPORTED: i32 = 0x106;

// `esp_bt_status_t`
const BT_STATUS_SUCCESS: u32 = 0;
const BT_STATUS_NOMEM: u32 = 3;
const BT_STATUS_BUSY: u32 = 4;
const BT_STATUS_UNSUPPORTED: u32 = 6;

/// 50 ms in 0.625 ms units.
#[cfg(target_os = "espidf")]
const ADV_INTERVAL_UNITS: u16 =
    (crate::config::ADV_INTERVAL.as_micros() / 625) as u16;

/// Map a raw stack status onto the outcome classes the lifecycle handles.
pub fn classify_status(code: i32) -> Result<(), RadioError> {
    match code {
        ESP_OK => Ok(()),
        ESP_ERR_INVALID_STATE | ESP_ERR_NO_MEM => Err(RadioError::Busy),
        ESP_ERR_NOT_SUPPORTED => Err(RadioError::Unsupported),
        other => Err(RadioError::Other(other)),
    }
}

/// Map a GAP completion status.
pub fn classify_bt_status(status: u32) -> Result<(), RadioError> {
    match status {
        BT_STATUS_SUCCESS => Ok(()),
        BT_STATUS_BUSY | BT_STATUS_NOMEM => Err(RadioError::Busy),
        BT_STATUS_UNSUPPORTED => Err(RadioError::Unsupported),
        other => Err(RadioError::Other(other as i32)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Off,
    Ready,
    Advertising,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF GAP callback state
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  Raw advertising data is applied asynchronously; the start
// request rides along until the stack confirms the data.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_START_PENDING: AtomicBool = AtomicBool::new(false);

#[cfg(target_os = "espidf")]
fn adv_params() -> esp_idf_svc::sys::esp_ble_adv_params_t {
    use esp_idf_svc::sys::*;
    esp_ble_adv_params_t {
        adv_int_min: ADV_INTERVAL_UNITS,
        adv_int_max: ADV_INTERVAL_UNITS,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_NONCONN_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        // SAFETY: remaining fields are plain data; zero is a valid default.
        ..unsafe { core::mem::zeroed() }
    }
}

#[cfg(target_os = "espidf")]
fn report_start_failure(err: RadioError) {
    use crate::events::{Event, push_event};
    if !push_event(Event::AdvStartFailed(err)) {
        log::warn!("Event queue full, advertising start failure dropped");
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_RAW_SET_COMPLETE_EVT => {
            if BLE_START_PENDING.swap(false, AtomicOrdering::AcqRel) {
                let mut params = adv_params();
                let ret = unsafe { esp_ble_gap_start_advertising(&mut params) };
                if let Err(e) = classify_status(ret) {
                    log::error!("BLE GAP: start advertising failed ({})", ret);
                    report_start_failure(e);
                }
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            let status = unsafe { (*param).adv_start_cmpl.status };
            match classify_bt_status(status as u32) {
                Ok(()) => log::info!("BLE GAP: advertising started"),
                Err(e) => {
                    log::warn!("BLE GAP: advertising start failed (status={})", status);
                    report_start_failure(e);
                }
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdvertiser {
    state: BleState,
    /// Last raw advertising data handed to the stack.
    adv_data: Payload,
    #[cfg(all(test, not(target_os = "espidf")))]
    enable_fault: Option<RadioError>,
}

impl BleAdvertiser {
    pub fn new() -> Self {
        Self {
            state: BleState::Off,
            adv_data: Payload::new(),
            #[cfg(all(test, not(target_os = "espidf")))]
            enable_fault: None,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    /// Raw advertising data last configured.
    pub fn adv_data(&self) -> &[u8] {
        &self.adv_data
    }

    // ── Platform-specific ─────────────────────────────────────

    /// Bring the controller and Bluedroid up, skipping the stages a
    /// previous, partially failed attempt already completed.
    #[cfg(target_os = "espidf")]
    fn platform_enable(&mut self) -> Result<(), RadioError> {
        use esp_idf_svc::sys::*;
        unsafe {
            if esp_bt_controller_get_status()
                == esp_bt_controller_status_t_ESP_BT_CONTROLLER_STATUS_IDLE
            {
                // Release classic BT memory (BLE-only mode saves ~30 KB).
                esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);
                let mut bt_cfg = esp_bt_controller_config_t::default();
                classify_status(esp_bt_controller_init(&mut bt_cfg))?;
            }
            if esp_bt_controller_get_status()
                == esp_bt_controller_status_t_ESP_BT_CONTROLLER_STATUS_INITED
            {
                classify_status(esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE))?;
            }
            if esp_bluedroid_get_status() == esp_bluedroid_status_t_ESP_BLUEDROID_STATUS_UNINITIALIZED {
                classify_status(esp_bluedroid_init())?;
            }
            if esp_bluedroid_get_status() == esp_bluedroid_status_t_ESP_BLUEDROID_STATUS_INITIALIZED {
                classify_status(esp_bluedroid_enable())?;
            }
            classify_status(esp_ble_gap_register_callback(Some(ble_gap_event_handler)))?;
        }
        info!("BLE(espidf): Bluedroid stack initialised");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_enable(&mut self) -> Result<(), RadioError> {
        #[cfg(test)]
        if let Some(e) = self.enable_fault.take() {
            return Err(e);
        }
        info!("BLE(sim): stack enabled");
        Ok(())
    }

    /// Make the next simulated enable fail with `err`.
    #[cfg(all(test, not(target_os = "espidf")))]
    fn fail_next_enable(&mut self, err: RadioError) {
        self.enable_fault = Some(err);
    }

    #[cfg(target_os = "espidf")]
    fn platform_configure(&mut self, start: bool) -> Result<(), RadioError> {
        use esp_idf_svc::sys::*;
        BLE_START_PENDING.store(start, AtomicOrdering::Release);
        let ret = unsafe {
            esp_ble_gap_config_adv_data_raw(
                self.adv_data.as_ptr() as *mut u8,
                self.adv_data.len() as u32,
            )
        };
        if ret != ESP_OK {
            BLE_START_PENDING.store(false, AtomicOrdering::Release);
        }
        classify_status(ret)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_configure(&mut self, start: bool) -> Result<(), RadioError> {
        if start {
            info!("BLE(sim): advertising {} bytes", self.adv_data.len());
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) -> Result<(), RadioError> {
        classify_status(unsafe { esp_idf_svc::sys::esp_ble_gap_stop_advertising() })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) -> Result<(), RadioError> {
        info!("BLE(sim): advertising stopped");
        Ok(())
    }
}

impl Default for BleAdvertiser {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// RadioPort implementation
// ───────────────────────────────────────────────────────────────

impl RadioPort for BleAdvertiser {
    fn enable(&mut self) -> Result<(), RadioError> {
        if matches!(self.state, BleState::Ready | BleState::Advertising) {
            return Ok(());
        }
        match self.platform_enable() {
            Ok(()) => {
                self.state = BleState::Ready;
                #[cfg(target_os = "espidf")]
                crate::advertising::ready::signal_radio_ready();
                Ok(())
            }
            Err(e) => {
                self.state = BleState::Failed;
                Err(e)
            }
        }
    }

    fn start(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        if self.state != BleState::Ready {
            return Err(RadioError::Busy);
        }
        self.adv_data = frame_advertisement(payload);
        self.platform_configure(true)?;
        self.state = BleState::Advertising;
        Ok(())
    }

    fn update(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        if self.state != BleState::Advertising {
            return Err(RadioError::Busy);
        }
        self.adv_data = frame_advertisement(payload);
        self.platform_configure(false)
    }

    fn stop(&mut self) -> Result<(), RadioError> {
        if self.state != BleState::Advertising {
            return Ok(());
        }
        // The stack may already have dropped a start it rejected.
        let stopped = self.platform_stop();
        self.state = BleState::Ready;
        stopped
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
