//! GPIO / peripheral pin assignments for the station board (ESP32 + SX1276).
//!
//! Single source of truth for the Rust side.  The radio pins are mirrored
//! in `components/lmic_glue/lmic_glue.cpp`, which hands them to the MAC HAL;
//! the test below keeps the two in step.  The DHT11 and HC-SR04 lines are
//! taken as typed peripherals in `main.rs` and must match these numbers.

// ---------------------------------------------------------------------------
// SX1276 radio (SPI)
// ---------------------------------------------------------------------------

pub const RADIO_RESET_GPIO: i32 = 14;
pub const RADIO_MOSI_GPIO: i32 = 27;
pub const RADIO_MISO_GPIO: i32 = 19;
pub const RADIO_SCLK_GPIO: i32 = 5;
/// Chip select.
pub const RADIO_NSS_GPIO: i32 = 18;
pub const RADIO_DIO0_GPIO: i32 = 26;
/// 35 on board revision 2.
pub const RADIO_DIO1_GPIO: i32 = 33;
/// 34 on board revision 2.
pub const RADIO_DIO2_GPIO: i32 = 32;

// ---------------------------------------------------------------------------
// Pulse sensors (interrupt-driven, pull-up inputs)
// ---------------------------------------------------------------------------

/// Anemometer reed switch, one pulse per rotation, rising edge.
pub const WIND_SPEED_GPIO: i32 = 12;
/// Rain-gauge tipping bucket, one pulse per tip, falling edge.
pub const RAIN_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Polled sensors
// ---------------------------------------------------------------------------

/// Wind vane resistor ladder on ADC1 channel 0 (GPIO 36 / SENSOR_VP).
pub const WIND_DIRECTION_ADC_GPIO: i32 = 36;
/// DHT11 single-wire data line.
pub const DHT_GPIO: i32 = 16;
/// HC-SR04 trigger output.
pub const ULTRASONIC_TRIG_GPIO: i32 = 4;
/// HC-SR04 echo input.
pub const ULTRASONIC_ECHO_GPIO: i32 = 2;
