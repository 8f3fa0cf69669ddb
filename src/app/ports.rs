//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TransmissionController (domain)
//! ```
//!
//! Driven adapters (sensors, radio MAC, event sinks) implement these
//! traits.  The [`TransmissionController`](super::service::TransmissionController)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use embassy_time::Duration;

use crate::config::RadioSettings;
use crate::error::RadioError;
use crate::sensors::wind::WindDirection;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One query per derived quantity.  Every call blocks until the reading
/// is complete; pulse-derived quantities drain their counter.
pub trait SensorPort {
    /// Mean air temperature (°C).  NaN if the transducer failed.
    fn temperature(&mut self) -> f32;

    /// Mean relative humidity (%).  NaN if the transducer failed.
    fn humidity(&mut self) -> f32;

    /// Rainfall since the last call (mm, truncated).
    fn rainfall(&mut self) -> u32;

    /// Wind speed since the last call (km/h).
    fn wind_speed(&mut self) -> f32;

    fn wind_direction(&mut self) -> WindDirection;

    /// Mean ultrasonic distance (cm).
    fn distance(&mut self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain ↔ LoRaWAN MAC)
// ───────────────────────────────────────────────────────────────

/// The LoRaWAN MAC seen from the controller: enqueue, status, reset and a
/// one-shot timer.  Events travel the other way through the event queue.
pub trait RadioPort {
    /// Establish the session and channel plan.  Fails on zeroed credentials.
    fn initialize_session(&mut self, settings: &RadioSettings) -> Result<(), RadioError>;

    /// Whether a transmission is still queued or in progress.
    fn is_tx_pending(&self) -> bool;

    /// Hand one uplink to the MAC.
    fn enqueue_uplink(&mut self, port: u8, payload: &[u8], confirmed: bool)
    -> Result<(), RadioError>;

    /// Clear MAC and session state, including channel negotiation.
    fn reset_session(&mut self);

    /// Arm the cooperative one-shot timer that starts the next cycle.
    fn schedule_callback(&mut self, delay: Duration);

    /// MAC clock in milliseconds, used to timestamp events.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
