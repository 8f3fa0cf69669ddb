//! Interrupt-driven pulse accumulators for the anemometer and rain gauge.
//!
//! Each GPIO ISR does nothing but `fetch_add(1)` on an `AtomicU32`.  The
//! sampler drains a counter with `swap(0)`, which reads and clears in a
//! single atomic step: a pulse that lands during the read-clear is either
//! part of the returned count or left for the next interval, never lost.
//!
//! The counters wrap at `u32::MAX`.  At a few pulses per second that is
//! decades of uninterrupted accumulation, so no bound check is made.

use core::sync::atomic::{AtomicU32, Ordering};

/// A pulse count shared between one ISR (producer) and the main flow.
#[derive(Debug)]
pub struct PulseCounter {
    count: AtomicU32,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Record one pulse.  ISR-safe: lock-free, no allocation.
    #[inline]
    pub fn record(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Atomically read the accumulated pulses and reset to zero.
    /// Main-flow only.
    pub fn take(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Current count without clearing it.
    pub fn peek(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Anemometer rotations since the last wind-speed read.
/// `static` because ESP-IDF ISR callbacks cannot capture state.
pub static WIND_PULSES: PulseCounter = PulseCounter::new();

/// Rain-bucket tips since the last rainfall read.
pub static RAIN_PULSES: PulseCounter = PulseCounter::new();

/// Called from the anemometer GPIO ISR on each rising edge.
pub fn wind_isr_handler() {
    WIND_PULSES.record();
}

/// Called from the rain-gauge GPIO ISR on each falling edge.
pub fn rain_isr_handler() {
    RAIN_PULSES.record();
}
