//! WakeBell Firmware — Main Entry Point
//!
//! Hexagonal architecture with timer-driven execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter      LogEventSink      WifiAdapter          │
//! │  (Sensor+Actuator)    (EventSink)       (bring-up)           │
//! │  HTTP server (/time /alarm /temp /servo)                     │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │            AppService (request path)               │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  SharedClock ◀── hw_timer tick (1 Hz) ──▶ servo intent       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use wakebell::adapters::hardware::HardwareAdapter;
use wakebell::adapters::log_sink::LogEventSink;
#[cfg(target_os = "espidf")]
use wakebell::adapters::wifi::WifiAdapter;
use wakebell::app::events::AppEvent;
use wakebell::app::ports::EventSink;
use wakebell::app::service::AppService;
use wakebell::clock::SharedClock;
use wakebell::config::SystemConfig;
use wakebell::drivers::servo::ServoDriver;
use wakebell::drivers::{hw_init, hw_timer};
use wakebell::events::{self, Event};
use wakebell::pins;
use wakebell::sensors::thermistor::{DividerCalibration, ThermistorSensor};
use wakebell::server::ServerState;

/// The one clock instance, shared between the timer callback and the
/// request handlers through its internal critical section.
static CLOCK: SharedClock = SharedClock::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WakeBell v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals(config.default_vref_mv) {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Clock tick + telemetry timers ──────────────────────
    hw_timer::start_timers(
        &CLOCK,
        config.clock_tick_period_ms,
        config.telemetry_interval_secs,
    );

    // ── 4. Construct adapters and the app service ─────────────
    let thermistor = ThermistorSensor::new(
        pins::THERMISTOR_ADC_GPIO,
        DividerCalibration::from_config(&config),
        config.adc_sample_count,
    );
    let hw = HardwareAdapter::new(thermistor, ServoDriver::new());
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(&CLOCK);
    app.start(&mut sink);

    let state = Arc::new(Mutex::new(ServerState { app, hw, sink }));

    // ── 5. WiFi + HTTP control surface ────────────────────────
    // Failure here degrades to a standalone clock: ticks, alarm, and servo
    // keep running without the network surface.
    #[cfg(target_os = "espidf")]
    let (_wifi, _server) = start_network(&config, state.clone());

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        // Simulate the timer interrupts via sleep on non-espidf targets.
        // On real hardware the esp_timer callbacks drive the clock.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(Duration::from_millis(u64::from(config.clock_tick_period_ms)));
            hw_timer::run_tick(&CLOCK);
        }
        #[cfg(target_os = "espidf")]
        std::thread::sleep(Duration::from_millis(50));

        events::drain_events(|event| match event {
            Event::AlarmFired => {
                if let Ok(mut st) = state.lock() {
                    let st = &mut *st;
                    let t = st.app.current_time();
                    st.sink.emit(&AppEvent::AlarmFired(t));
                }
            }
            Event::TelemetryTick => {
                if let Ok(mut st) = state.lock() {
                    let st = &mut *st;
                    let t = st.app.build_telemetry(&mut st.hw);
                    st.sink.emit(&AppEvent::Telemetry(t));
                }
            }
        });
    }
}

/// Bring up WiFi and the HTTP server; either failure leaves the clock
/// running headless.
#[cfg(target_os = "espidf")]
fn start_network(
    config: &SystemConfig,
    state: Arc<Mutex<ServerState<'static>>>,
) -> (
    Option<WifiAdapter>,
    Option<esp_idf_svc::http::server::EspHttpServer<'static>>,
) {
    let wifi = (|| -> Result<WifiAdapter> {
        let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
        let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
        let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take().ok();
        WifiAdapter::connect(
            peripherals.modem,
            sysloop,
            nvs,
            &config.wifi_ssid,
            &config.wifi_password,
        )
    })();

    match wifi {
        Ok(w) => match wakebell::server::start(config.http_port, state) {
            Ok(s) => (Some(w), Some(s)),
            Err(e) => {
                warn!("server: start failed ({e}) — continuing headless");
                (Some(w), None)
            }
        },
        Err(e) => {
            warn!("WiFi: {e} — continuing without the control surface");
            (None, None)
        }
    }
}
