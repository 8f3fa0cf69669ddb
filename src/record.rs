//! Record encoder: compact fixed-schema text records.
//!
//! ```text
//!   Weather: {"umi":<humidity .1>,"temp":<temperature .1>,"chu":<rainfall>}
//!   Flow:    {"dist":<distance>,"velo":<wind speed .1>,"dir":<direction code>}
//! ```
//!
//! Records are built into a fixed-capacity stack buffer.  The encoded
//! length is computed first with a counting writer; a record that would
//! not fit is an [`EncodeError::CapacityExceeded`], which the controller
//! treats as fatal.
//!
//! One-decimal values round half away from zero (55.25 -> 55.3).  The
//! standard `{:.1}` formatter rounds half to even on the exact binary
//! value, so the digits are produced from an explicitly rounded integer.

use core::fmt::{self, Write};

use heapless::String;

use crate::error::EncodeError;
use crate::fsm::context::{FlowSample, SampleSet, WeatherSample};

/// Largest record the buffer holds.  Both schemas stay well under this for
/// any reading a real transducer can produce.
pub const RECORD_CAPACITY: usize = 64;

/// An encoded record, owned by the cycle that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    text: String<RECORD_CAPACITY>,
}

impl Record {
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// One-decimal formatting
// ---------------------------------------------------------------------------

/// Displays an `f32` with exactly one decimal, rounding half away from zero.
#[derive(Debug, Clone, Copy)]
pub struct OneDecimal(pub f32);

impl fmt::Display for OneDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            return f.write_str("nan");
        }
        if v.is_infinite() {
            return f.write_str(if v < 0.0 { "-inf" } else { "inf" });
        }
        // Widen before scaling so the decimal the sensor produced survives.
        let tenths = (f64::from(v) * 10.0).round();
        if tenths.abs() >= 1e15 {
            return write!(f, "{v:.1}");
        }
        let tenths = tenths as i64;
        // A negative reading that rounds to zero keeps its sign ("-0.0").
        let sign = if v.is_sign_negative() { "-" } else { "" };
        let abs = tenths.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// `fmt::Write` sink that only counts bytes.
struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

fn write_weather(w: &mut impl Write, s: &WeatherSample) -> fmt::Result {
    write!(
        w,
        "{{\"umi\":{},\"temp\":{},\"chu\":{}}}",
        OneDecimal(s.humidity),
        OneDecimal(s.temperature),
        s.rainfall
    )
}

fn write_flow(w: &mut impl Write, s: &FlowSample) -> fmt::Result {
    write!(
        w,
        "{{\"dist\":{},\"velo\":{},\"dir\":{}}}",
        s.distance,
        OneDecimal(s.wind_speed),
        s.wind_direction.code()
    )
}

fn write_sample(w: &mut impl Write, sample: &SampleSet) -> fmt::Result {
    match sample {
        SampleSet::Weather(s) => write_weather(w, s),
        SampleSet::Flow(s) => write_flow(w, s),
    }
}

/// Byte length `encode` will produce for `sample`.
pub fn encoded_len(sample: &SampleSet) -> usize {
    let mut counter = ByteCounter(0);
    // ByteCounter never fails.
    let _ = write_sample(&mut counter, sample);
    counter.0
}

/// Serialise one sample set into a record.
pub fn encode(sample: &SampleSet) -> Result<Record, EncodeError> {
    let needed = encoded_len(sample);
    if needed > RECORD_CAPACITY {
        return Err(EncodeError::CapacityExceeded {
            needed,
            capacity: RECORD_CAPACITY,
        });
    }

    let mut text = String::new();
    write_sample(&mut text, sample).map_err(|_| EncodeError::CapacityExceeded {
        needed,
        capacity: RECORD_CAPACITY,
    })?;
    debug_assert_eq!(text.len(), needed);
    Ok(Record { text })
}
