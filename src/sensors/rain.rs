//! Tipping-bucket rain gauge.

use crate::sensors::pulse::RAIN_PULSES;

pub struct RainGauge {
    mm_per_pulse: f32,
}

impl RainGauge {
    pub fn new(mm_per_pulse: f32) -> Self {
        Self { mm_per_pulse }
    }

    /// Rainfall since the last call, whole millimetres (truncated).
    /// Drains the tip counter.
    pub fn rainfall(&self) -> u32 {
        self.to_mm(RAIN_PULSES.take())
    }

    pub fn to_mm(&self, tips: u32) -> u32 {
        (tips as f32 * self.mm_per_pulse) as u32
    }
}
