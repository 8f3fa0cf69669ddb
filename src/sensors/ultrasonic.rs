//! HC-SR04 ultrasonic ranger, used as the water-level proxy.
//!
//! One measurement is a 10 us trigger pulse followed by timing the width
//! of the echo pulse.  Distance in cm is `echo_us * 0.034 / 2` (speed of
//! sound ~0.034 cm/us, halved for the round trip).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::MicrosClock;

/// Speed of sound in cm per microsecond.
const SOUND_CM_PER_US: f32 = 0.034;

/// Something that fires a ping and reports the echo width.
pub trait EchoRanger {
    /// Echo pulse width in microseconds, 0 when no echo arrived in time.
    fn echo_us(&mut self) -> u32;
}

/// Convert one echo duration to whole centimetres (truncated).
pub fn echo_to_cm(echo_us: u32) -> u32 {
    (echo_us as f32 * SOUND_CM_PER_US / 2.0) as u32
}

/// Averages `samples` full round trips into an integer distance.
pub struct DistanceSensor<R> {
    ranger: R,
    samples: u16,
}

impl<R: EchoRanger> DistanceSensor<R> {
    pub fn new(ranger: R, samples: u16) -> Self {
        Self {
            ranger,
            samples: samples.max(1),
        }
    }

    /// Integer mean distance in cm.  Timed-out pings count as 0 cm.
    pub fn distance(&mut self) -> u32 {
        let mut sum: u64 = 0;
        for _ in 0..self.samples {
            sum += u64::from(echo_to_cm(self.ranger.echo_us()));
        }
        (sum / u64::from(self.samples)) as u32
    }

    pub fn ranger_mut(&mut self) -> &mut R {
        &mut self.ranger
    }
}

/// HC-SR04 over `embedded-hal` pins.
pub struct HcSr04<T, E, D, C> {
    trig: T,
    echo: E,
    delay: D,
    clock: C,
    timeout_us: u32,
}

impl<T, E, D, C> HcSr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: MicrosClock,
{
    pub fn new(trig: T, echo: E, delay: D, clock: C, timeout_us: u32) -> Self {
        Self {
            trig,
            echo,
            delay,
            clock,
            timeout_us,
        }
    }

    fn trigger(&mut self) -> bool {
        let ok = self.trig.set_low().is_ok();
        self.delay.delay_us(5);
        let ok = ok && self.trig.set_high().is_ok();
        self.delay.delay_us(10);
        ok && self.trig.set_low().is_ok()
    }

    /// Width of the next high pulse on the echo line, bounded by the timeout
    /// measured from the call.
    fn pulse_high_us(&mut self) -> u32 {
        let start = self.clock.now_us();
        let deadline = start + u64::from(self.timeout_us);

        // Wait for the rising edge.
        let rise = loop {
            let now = self.clock.now_us();
            match self.echo.is_high() {
                Ok(true) => break now,
                Ok(false) if now < deadline => continue,
                _ => return 0,
            }
        };

        // Time the high phase.
        loop {
            let now = self.clock.now_us();
            match self.echo.is_high() {
                Ok(false) => return now.saturating_sub(rise) as u32,
                Ok(true) if now < deadline => continue,
                _ => return 0,
            }
        }
    }
}

impl<T, E, D, C> EchoRanger for HcSr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: MicrosClock,
{
    fn echo_us(&mut self) -> u32 {
        if !self.trigger() {
            log::debug!("HC-SR04 trigger write failed");
            return 0;
        }
        self.pulse_high_us()
    }
}
