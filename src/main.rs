//! Weather Station Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single event-driven main loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     LmicRadio        LogEventSink             │
//! │  (SensorPort)        (RadioPort)      (EventSink)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          TransmissionController (pure logic)           │    │
//! │  │  CycleFsm · variant alternation · failure counter      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EVENTS queue ◀── LMIC onEvent / send job (inside run_once)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::task;
use log::{error, info};

use weatherstation::adapters::hardware::HardwareAdapter;
use weatherstation::adapters::lmic::LmicRadio;
use weatherstation::adapters::log_sink::LogEventSink;
use weatherstation::adapters::time::Esp32TimeAdapter;
use weatherstation::app::ports::RadioPort;
use weatherstation::app::radio::RadioEvent;
use weatherstation::app::service::TransmissionController;
use weatherstation::config::StationConfig;
use weatherstation::diagnostics::{self, RuntimeMetrics};
use weatherstation::drivers::{hw_init, watchdog::Watchdog};
use weatherstation::events::{self, Event, push_event};
use weatherstation::pins;
use weatherstation::sensors::SensorHub;
use weatherstation::sensors::dht11::Dht11;
use weatherstation::sensors::ultrasonic::HcSr04;

/// Two FreeRTOS ticks at the default 100 Hz.
const MAC_SPIN_WINDOW_MS: u32 = 20;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    diagnostics::install_panic_handler();

    info!("╔══════════════════════════════════════╗");
    info!("║  Weather Station v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = StationConfig::default();
    config.validate()?;

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}, halting", e);
        halt();
    }
    if let Err(e) = hw_init::init_isr_service() {
        // Without ISRs wind speed and rainfall read 0; keep reporting
        // the other quantities.
        error!("ISR service init failed: {}, pulse sensors disabled", e);
    }

    let peripherals = Peripherals::take()?;
    let clock = Esp32TimeAdapter::new();

    let dht_pin = PinDriver::input_output_od(peripherals.pins.gpio16)?;
    let dht = Dht11::new(dht_pin, Ets, clock);

    let trig = PinDriver::output(peripherals.pins.gpio4)?;
    let echo = PinDriver::input(peripherals.pins.gpio2)?;
    let ranger = HcSr04::new(trig, echo, Ets, clock, config.echo_timeout_us);

    info!(
        "Sensors: DHT11 GPIO{}, HC-SR04 trig GPIO{} echo GPIO{}",
        pins::DHT_GPIO,
        pins::ULTRASONIC_TRIG_GPIO,
        pins::ULTRASONIC_ECHO_GPIO
    );
    let mut hw = HardwareAdapter::new(SensorHub::new(dht, ranger, &config));
    let mut log_sink = LogEventSink::new();

    // ── 4. LoRaWAN MAC ────────────────────────────────────────
    let mut radio = match LmicRadio::init() {
        Ok(r) => r,
        Err(e) => {
            error!("LMIC init failed: {}, halting", e);
            halt();
        }
    };
    if let Err(e) = radio.initialize_session(&config.radio) {
        error!("LoRaWAN session setup failed: {}, halting", e);
        halt();
    }

    // ── 5. Controller ─────────────────────────────────────────
    let mut controller = TransmissionController::new(&config);
    controller.start(&mut log_sink);
    push_event(Event::SendTimerFired);

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        radio.run_once();

        let mut fatal = None;
        let mut completed = false;
        events::drain_events(|event| {
            if fatal.is_some() {
                return;
            }
            if matches!(event, Event::Radio(RadioEvent::TxCompleted { .. })) {
                completed = true;
            }
            if let Err(e) = controller.handle(event, &mut hw, &mut radio, &mut log_sink) {
                if e.is_fatal() {
                    fatal = Some(e);
                } else {
                    error!("Cycle error: {}", e);
                }
            }
        });

        if let Some(e) = fatal {
            error!("Unrecoverable error: {}", e);
            diagnostics::restart_after(config.fatal_restart_delay_ms);
        }

        if completed {
            let metrics = RuntimeMetrics::collect(clock.uptime_secs(), &controller.stats());
            info!("DIAG | {}", metrics.to_log_line());
        }

        watchdog.feed();

        // Spin while a MAC job is close so RX windows open on time.
        // Otherwise sleep a tick so the idle task runs.
        if radio.job_due_within(MAC_SPIN_WINDOW_MS) {
            task::do_yield();
        } else {
            FreeRtos::delay_ms(1);
        }
    }
}

/// Park the main task.  The watchdog is not yet subscribed, so the device
/// stays up with the failure on the console.
fn halt() -> ! {
    loop {
        FreeRtos::delay_ms(1000);
    }
}
