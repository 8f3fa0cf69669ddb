//! Hardware adapter: bridges the real samplers to the [`SensorPort`] trait.
//!
//! Owns the [`SensorHub`].  This is the only module in the system that
//! touches transducers; on non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use log::debug;

use crate::app::ports::SensorPort;
use crate::sensors::SensorHub;
use crate::sensors::climate::HumitureSource;
use crate::sensors::ultrasonic::EchoRanger;
use crate::sensors::wind::WindDirection;

/// Concrete adapter that exposes the sensor hub behind the port trait.
pub struct HardwareAdapter<P, R> {
    hub: SensorHub<P, R>,
}

impl<P: HumitureSource, R: EchoRanger> HardwareAdapter<P, R> {
    pub fn new(hub: SensorHub<P, R>) -> Self {
        Self { hub }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: HumitureSource, R: EchoRanger> SensorPort for HardwareAdapter<P, R> {
    fn temperature(&mut self) -> f32 {
        let t = self.hub.temperature();
        debug!("sample | temperature={:.2}", t);
        t
    }

    fn humidity(&mut self) -> f32 {
        let h = self.hub.humidity();
        debug!("sample | humidity={:.2}", h);
        h
    }

    fn rainfall(&mut self) -> u32 {
        let r = self.hub.rainfall();
        debug!("sample | rainfall={} mm", r);
        r
    }

    fn wind_speed(&mut self) -> f32 {
        let v = self.hub.wind_speed();
        debug!("sample | wind_speed={:.2} km/h", v);
        v
    }

    fn wind_direction(&mut self) -> WindDirection {
        let d = self.hub.wind_direction();
        debug!("sample | wind_direction={} ({})", d, d.code());
        d
    }

    fn distance(&mut self) -> u32 {
        let d = self.hub.distance();
        debug!("sample | distance={} cm", d);
        d
    }
}
