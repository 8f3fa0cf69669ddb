//! Unified error types for the weather station firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the main
//! loop can decide in one place whether a failure is logged and absorbed
//! or ends in a device restart.  All variants are `Copy` so they pass
//! through the controller and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A transducer could not be read.
    Sensor(SensorError),
    /// The record encoder could not produce a record.
    Encode(EncodeError),
    /// The radio MAC collaborator rejected a request.
    Radio(RadioError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Compiled-in configuration is invalid.
    Config(&'static str),
}

impl Error {
    /// Whether the failure is unrecoverable without a device restart.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Encode(_) | Self::Radio(RadioError::SessionNotProvisioned)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Encode(e) => write!(f, "encode: {e}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The transducer did not answer within its protocol window.
    Timeout,
    /// A DHT frame arrived with a bad checksum.
    Checksum,
    /// GPIO read or write returned an error.
    Gpio,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "transducer timeout"),
            Self::Checksum => write!(f, "frame checksum mismatch"),
            Self::Gpio => write!(f, "GPIO access failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Encoder errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The encoded record does not fit the fixed record buffer.
    CapacityExceeded { needed: usize, capacity: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { needed, capacity } => {
                write!(f, "record needs {needed} bytes, buffer holds {capacity}")
            }
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// A transmission is already pending in the MAC.
    TxPending,
    /// Session keys or device address are still zeroed.
    SessionNotProvisioned,
    /// Payload exceeds what the MAC accepts in one frame.
    PayloadTooLarge,
    /// The MAC refused the request with a stack-specific code.
    Rejected(i32),
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TxPending => write!(f, "transmission already pending"),
            Self::SessionNotProvisioned => write!(f, "session credentials not provisioned"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::Rejected(rc) => write!(f, "MAC rejected request (rc={rc})"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
