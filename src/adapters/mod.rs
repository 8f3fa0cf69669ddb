//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                       |
//! |------------|-------------|-----------------------------------|
//! | `hardware` | SensorPort  | DHT11, HC-SR04, vane ADC, pulses  |
//! | `lmic`     | RadioPort   | MCCI LMIC via the C glue component|
//! | `log_sink` | EventSink   | Serial log output                 |
//! | `time`     | MicrosClock | ESP32 high-resolution timer       |

pub mod hardware;
#[cfg(target_os = "espidf")]
pub mod lmic;
pub mod log_sink;
pub mod time;
