//! Air temperature and relative humidity, averaged over repeated reads.
//!
//! The source is queried `samples` times per call and the arithmetic mean
//! is returned.  A failed read yields NaN from the source and is averaged
//! in as-is, so one bad frame turns the whole result into NaN.  That is
//! the accepted behaviour: the record then carries `nan` and the next
//! cycle samples afresh.

/// A combined temperature/humidity transducer (DHT11 on the station).
///
/// Both reads return NaN when the transducer could not be read.
pub trait HumitureSource {
    /// Degrees Celsius.
    fn read_temperature(&mut self) -> f32;
    /// Relative humidity, percent.
    fn read_humidity(&mut self) -> f32;
}

/// Averaging front-end over a [`HumitureSource`].
pub struct ClimateSensor<P> {
    source: P,
    samples: u16,
}

impl<P: HumitureSource> ClimateSensor<P> {
    pub fn new(source: P, samples: u16) -> Self {
        Self {
            source,
            samples: samples.max(1),
        }
    }

    /// Mean temperature over `samples` reads (°C).
    pub fn temperature(&mut self) -> f32 {
        let source = &mut self.source;
        mean_of(self.samples, || source.read_temperature())
    }

    /// Mean relative humidity over `samples` reads (%).
    pub fn humidity(&mut self) -> f32 {
        let source = &mut self.source;
        mean_of(self.samples, || source.read_humidity())
    }

    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }
}

fn mean_of(samples: u16, mut read: impl FnMut() -> f32) -> f32 {
    let mut sum = 0.0_f32;
    for _ in 0..samples {
        sum += read();
    }
    sum / f32::from(samples)
}
