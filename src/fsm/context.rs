//! Data owned by the transmission cycle: which record kind goes next, the
//! sampled quantities of the current cycle, and the failure/retry state.
//!
//! Everything here lives in the main flow.  Nothing is shared with
//! interrupt context; the pulse counters are the only ISR-visible state.

use serde::{Deserialize, Serialize};

use crate::sensors::wind::WindDirection;

// ---------------------------------------------------------------------------
// Record kind
// ---------------------------------------------------------------------------

/// The two record kinds the station alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Humidity, temperature, rainfall.
    Weather,
    /// Distance (water level proxy), wind speed, wind direction.
    Flow,
}

impl Variant {
    /// The kind that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Weather => Self::Flow,
            Self::Flow => Self::Weather,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Flow => "flow",
        }
    }
}

// ---------------------------------------------------------------------------
// Sample sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    /// Relative humidity (%).
    pub humidity: f32,
    /// Air temperature (°C).
    pub temperature: f32,
    /// Rainfall since the previous weather cycle (mm, truncated).
    pub rainfall: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSample {
    /// Ultrasonic distance (cm, integer mean).
    pub distance: u32,
    /// Wind speed since the previous flow cycle (km/h).
    pub wind_speed: f32,
    pub wind_direction: WindDirection,
}

/// The quantities sampled by one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleSet {
    Weather(WeatherSample),
    Flow(FlowSample),
}

impl SampleSet {
    pub fn variant(&self) -> Variant {
        match self {
            Self::Weather(_) => Variant::Weather,
            Self::Flow(_) => Variant::Flow,
        }
    }
}

// ---------------------------------------------------------------------------
// TransmissionState
// ---------------------------------------------------------------------------

/// Outcome of recording one qualifying link failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureVerdict {
    /// Below threshold; carries the new count.
    Counted(u8),
    /// Threshold reached; the counter has been cleared and the session
    /// must be reset.
    ResetRequired,
}

/// Retry and alternation state owned by the controller.
#[derive(Debug, Clone)]
pub struct TransmissionState {
    /// Kind the next cycle will sample.
    active_variant: Variant,
    consecutive_failures: u8,
    max_failures: u8,
    /// A record has been handed to the radio and not yet completed.
    in_flight: bool,
}

impl TransmissionState {
    /// The first cycle after boot sends a weather record.
    pub fn new(max_failures: u8) -> Self {
        Self {
            active_variant: Variant::Weather,
            consecutive_failures: 0,
            max_failures: max_failures.max(1),
            in_flight: false,
        }
    }

    /// Claim the variant for a new cycle and flip to the other one.
    /// The flip is unconditional: a dropped cycle still consumes its turn.
    pub fn begin_cycle(&mut self) -> Variant {
        let current = self.active_variant;
        self.active_variant = current.next();
        current
    }

    /// Variant the next cycle will use.
    pub fn upcoming_variant(&self) -> Variant {
        self.active_variant
    }

    pub fn record_failure(&mut self) -> FailureVerdict {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.max_failures {
            self.consecutive_failures = 0;
            FailureVerdict::ResetRequired
        } else {
            FailureVerdict::Counted(self.consecutive_failures)
        }
    }

    /// A transmission completed: the failure streak is over.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.in_flight = false;
    }

    pub fn consecutive_failures(&self) -> u8 {
        self.consecutive_failures
    }

    pub fn max_failures(&self) -> u8 {
        self.max_failures
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }
}
