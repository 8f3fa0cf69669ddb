//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sampler and answers one query per derived quantity.
//! All queries block and must not be called from interrupt context; the
//! pulse-counter ISRs in [`pulse`] are the only code that runs there.

pub mod climate;
pub mod dht11;
pub mod pulse;
pub mod rain;
pub mod ultrasonic;
pub mod wind;

use climate::{ClimateSensor, HumitureSource};
use rain::RainGauge;
use ultrasonic::{DistanceSensor, EchoRanger};
use wind::{Anemometer, WindDirection, WindVane};

use crate::config::StationConfig;
use crate::pins;

/// Free-running microsecond clock used to time bit-banged protocols.
pub trait MicrosClock {
    fn now_us(&self) -> u64;
}

/// Aggregates all sampler front-ends.
pub struct SensorHub<P, R> {
    pub climate: ClimateSensor<P>,
    pub distance: DistanceSensor<R>,
    pub anemometer: Anemometer,
    pub vane: WindVane,
    pub rain: RainGauge,
}

impl<P: HumitureSource, R: EchoRanger> SensorHub<P, R> {
    /// Construct a hub.  The source and ranger are built in main where
    /// peripheral ownership is established.
    pub fn new(source: P, ranger: R, config: &StationConfig) -> Self {
        Self {
            climate: ClimateSensor::new(source, config.samples_per_reading),
            distance: DistanceSensor::new(ranger, config.samples_per_reading),
            anemometer: Anemometer::new(config.wind_kmh_per_pulse),
            vane: WindVane::new(pins::WIND_DIRECTION_ADC_GPIO, config.vane_match_threshold_v),
            rain: RainGauge::new(config.rain_mm_per_pulse),
        }
    }

    pub fn temperature(&mut self) -> f32 {
        self.climate.temperature()
    }

    pub fn humidity(&mut self) -> f32 {
        self.climate.humidity()
    }

    pub fn rainfall(&mut self) -> u32 {
        self.rain.rainfall()
    }

    pub fn wind_speed(&mut self) -> f32 {
        self.anemometer.speed()
    }

    pub fn wind_direction(&mut self) -> WindDirection {
        self.vane.direction()
    }

    pub fn distance(&mut self) -> u32 {
        self.distance.distance()
    }
}
