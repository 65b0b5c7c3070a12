//! MlBeacon firmware entry point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                        LogEventSink           │
//! │  (Led + Radio + RetryTimer + Clock)     (EventSink)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Debouncer · LedCoordinator · AdvertisingLifecycle     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Event queue (classifier, LED driver, radio, retry timer)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use embassy_time::Duration;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use log::{info, warn};

use mlbeacon::adapters::ble::BleAdvertiser;
use mlbeacon::adapters::hardware::HardwareAdapter;
use mlbeacon::adapters::log_sink::LogEventSink;
use mlbeacon::adapters::retry_timer::RetryTimer;
use mlbeacon::adapters::time::Esp32TimeAdapter;
use mlbeacon::app::ports::RadioPort;
use mlbeacon::app::service::AppService;
use mlbeacon::config::SystemConfig;
use mlbeacon::decision::effects::default_effect_table;
use mlbeacon::decision::sample::AppMode;
use mlbeacon::drivers::status_led::StatusLed;
use mlbeacon::events::{self, Event, Module, push_event};

/// Main loop period; also the LED animation step.
const LOOP_PERIOD_MS: u32 = 10;

fn load_config() -> Result<SystemConfig> {
    match option_env!("MLBEACON_CONFIG_JSON") {
        Some(json) => {
            let config = SystemConfig::from_json(json)?;
            info!("Config: build-time override applied");
            Ok(config)
        }
        None => Ok(SystemConfig::default()),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  MlBeacon v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (fatal if invalid) ───────────────────
    let config = load_config()?;
    let effects = default_effect_table();
    let mut app = AppService::new(config.clone(), effects.clone())?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let ledc_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default().frequency(5.kHz().into()),
    )?;
    let status_led = StatusLed::new(
        LedcDriver::new(peripherals.ledc.channel0, &ledc_timer, peripherals.pins.gpio4)?,
        LedcDriver::new(peripherals.ledc.channel1, &ledc_timer, peripherals.pins.gpio5)?,
        LedcDriver::new(peripherals.ledc.channel2, &ledc_timer, peripherals.pins.gpio6)?,
    );

    let mut hw = HardwareAdapter::new(
        effects,
        [status_led],
        BleAdvertiser::new(),
        RetryTimer::new()?,
        Esp32TimeAdapter::new(),
    );
    let mut log_sink = LogEventSink::new();

    app.start(&mut log_sink);

    // ── 4. Radio bring-up ─────────────────────────────────────
    // Readiness is latched; the ModuleReady path converges here too.
    if let Err(e) = hw.enable() {
        warn!("BLE enable at boot failed ({}), waiting for module ready", e);
    }

    push_event(Event::ModuleReady(Module::Main));
    push_event(Event::ModeChanged(AppMode::ModelRunning));

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    let step = Duration::from_millis(u64::from(LOOP_PERIOD_MS));
    loop {
        for (led_id, effect) in hw.tick_leds(step) {
            if !push_event(Event::LedReady { led_id, effect }) {
                warn!("Event queue full, LED ack dropped");
            }
        }

        events::drain_events(|event| app.handle_event(event, &mut hw, &mut log_sink));

        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
