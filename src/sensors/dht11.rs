//! DHT11 single-wire temperature / humidity transducer.
//!
//! Bit-banged over one open-drain GPIO through the `embedded-hal` 1.0
//! digital traits.  A transaction is:
//!
//! ```text
//!   host: low >= 18 ms, release (high 40 us)
//!   sensor: low 80 us, high 80 us, then 40 bits
//!   bit:  low 50 us, high 26-28 us (0) or 70 us (1)
//! ```
//!
//! The part must not be polled more often than every 2 s; reads inside
//! that window return the cached outcome.  Failed reads yield NaN.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::MicrosClock;
use super::climate::HumitureSource;
use crate::error::SensorError;

/// Minimum interval between two bus transactions.
pub const MIN_READ_INTERVAL_US: u64 = 2_000_000;

/// Longest any single level may persist before the read is abandoned.
const LEVEL_TIMEOUT_US: u64 = 100;

/// High time separating a `1` bit from a `0` bit.
const ONE_BIT_THRESHOLD_US: u64 = 40;

/// One decoded DHT11 frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dht11Reading {
    pub humidity: f32,
    pub temperature: f32,
}

/// Decode the five raw frame bytes `[hum_int, hum_dec, temp_int, temp_dec, sum]`.
pub fn decode_frame(frame: [u8; 5]) -> Result<Dht11Reading, SensorError> {
    let sum = frame[..4]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = f32::from(frame[0]) + f32::from(frame[1]) * 0.1;
    let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x7F) * 0.1;
    let temperature = if frame[3] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    Ok(Dht11Reading {
        humidity,
        temperature,
    })
}

/// DHT11 driver with a 2 s result cache.
pub struct Dht11<P, D, C> {
    pin: P,
    delay: D,
    clock: C,
    last_read_us: Option<u64>,
    last: Result<Dht11Reading, SensorError>,
    bus_reads: u32,
}

impl<P, D, C> Dht11<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: MicrosClock,
{
    pub fn new(pin: P, delay: D, clock: C) -> Self {
        Self {
            pin,
            delay,
            clock,
            last_read_us: None,
            last: Err(SensorError::Timeout),
            bus_reads: 0,
        }
    }

    /// Latest reading, hitting the bus only when the cache has expired.
    pub fn read(&mut self) -> Result<Dht11Reading, SensorError> {
        let now = self.clock.now_us();
        let fresh = self
            .last_read_us
            .is_some_and(|t| now.saturating_sub(t) < MIN_READ_INTERVAL_US);
        if !fresh {
            self.last = self.transact();
            self.last_read_us = Some(self.clock.now_us());
            self.bus_reads = self.bus_reads.wrapping_add(1);
            if let Err(e) = self.last {
                log::debug!("DHT11 read failed: {}", e);
            }
        }
        self.last
    }

    /// Number of bus transactions performed so far.
    pub fn bus_reads(&self) -> u32 {
        self.bus_reads
    }

    fn transact(&mut self) -> Result<Dht11Reading, SensorError> {
        // Start signal.
        self.pin.set_high().map_err(|_| SensorError::Gpio)?;
        self.delay.delay_ms(1);
        self.pin.set_low().map_err(|_| SensorError::Gpio)?;
        self.delay.delay_ms(20);
        self.pin.set_high().map_err(|_| SensorError::Gpio)?;
        self.delay.delay_us(40);

        // Response: 80 us low, 80 us high.
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_while(false)?;
            let high_us = self.wait_while(true)?;
            if high_us > ONE_BIT_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }

        decode_frame(frame)
    }

    /// Spin while the line sits at `level`; returns how long it stayed.
    fn wait_while(&mut self, level: bool) -> Result<u64, SensorError> {
        let start = self.clock.now_us();
        loop {
            let high = self.pin.is_high().map_err(|_| SensorError::Gpio)?;
            let elapsed = self.clock.now_us().saturating_sub(start);
            if high != level {
                return Ok(elapsed);
            }
            if elapsed > LEVEL_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
    }
}

impl<P, D, C> HumitureSource for Dht11<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: MicrosClock,
{
    fn read_temperature(&mut self) -> f32 {
        self.read().map_or(f32::NAN, |r| r.temperature)
    }

    fn read_humidity(&mut self) -> f32 {
        self.read().map_or(f32::NAN, |r| r.humidity)
    }
}
