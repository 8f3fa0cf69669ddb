//! Anemometer (pulse count) and wind vane (resistor ladder on ADC1).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the vane is read from ADC1_CH0 via the oneshot API
//! (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::fmt;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use serde::{Deserialize, Serialize};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::sensors::pulse::WIND_PULSES;

#[cfg(not(target_os = "espidf"))]
static SIM_VANE_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_vane_adc(raw: u16) {
    SIM_VANE_ADC.store(raw, Ordering::Relaxed);
}

const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;

/// Compass heading reported by the vane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    North,
    East,
    South,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    /// No reference voltage within the match threshold.
    Unknown,
}

impl WindDirection {
    /// Numeric code carried in the flow record.
    pub const fn code(self) -> i8 {
        match self {
            Self::North => 1,
            Self::East => 2,
            Self::South => 3,
            Self::West => 4,
            Self::NorthEast => 5,
            Self::NorthWest => 6,
            Self::SouthEast => 7,
            Self::SouthWest => 8,
            Self::Unknown => -1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
            Self::NorthEast => "NE",
            Self::NorthWest => "NW",
            Self::SouthEast => "SE",
            Self::SouthWest => "SW",
            Self::Unknown => "?",
        }
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vane output voltage for each heading.  Searched in this order; on a
/// tie the earlier entry wins.
pub const VANE_REFERENCE: [(WindDirection, f32); 8] = [
    (WindDirection::North, 3.208),
    (WindDirection::NorthEast, 2.349),
    (WindDirection::East, 1.665),
    (WindDirection::SouthEast, 2.283),
    (WindDirection::South, 2.637),
    (WindDirection::SouthWest, 1.928),
    (WindDirection::West, 0.891),
    (WindDirection::NorthWest, 1.619),
];

/// 12-bit ADC count to volts (0..=3.3 V).
pub fn adc_to_volts(raw: u16) -> f32 {
    f32::from(raw) * V_REF / ADC_MAX
}

/// Nearest reference heading to `volts`.  Only entries strictly closer
/// than `threshold` qualify; otherwise [`WindDirection::Unknown`].
pub fn nearest_direction(volts: f32, threshold: f32) -> WindDirection {
    let mut best = WindDirection::Unknown;
    let mut best_diff = threshold;
    for &(dir, reference) in &VANE_REFERENCE {
        let diff = (volts - reference).abs();
        if diff < best_diff {
            best_diff = diff;
            best = dir;
        }
    }
    best
}

/// Resistor-ladder wind vane.
pub struct WindVane {
    threshold_v: f32,
    _adc_gpio: i32,
}

impl WindVane {
    pub fn new(adc_gpio: i32, threshold_v: f32) -> Self {
        Self {
            threshold_v,
            _adc_gpio: adc_gpio,
        }
    }

    pub fn direction(&self) -> WindDirection {
        let volts = adc_to_volts(self.read_adc());
        nearest_direction(volts, self.threshold_v)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_VANE)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_VANE_ADC.load(Ordering::Relaxed)
    }
}

/// Cup anemometer: one reed-switch pulse per rotation.
pub struct Anemometer {
    kmh_per_pulse: f32,
}

impl Anemometer {
    pub fn new(kmh_per_pulse: f32) -> Self {
        Self { kmh_per_pulse }
    }

    /// Wind speed from the pulses accumulated since the last call (km/h).
    /// Drains the counter.
    pub fn speed(&self) -> f32 {
        self.to_kmh(WIND_PULSES.take())
    }

    pub fn to_kmh(&self, pulses: u32) -> f32 {
        pulses as f32 * self.kmh_per_pulse
    }
}
