//! Application core: pure domain logic, zero I/O.
//!
//! The transmission-cycle controller lives in [`service`].  It talks to
//! sensors, the LoRaWAN MAC and the console only through the **port
//! traits** in [`ports`], so the whole cycle runs in host tests against
//! mocks.

pub mod events;
pub mod ports;
pub mod radio;
pub mod service;
