//! Outbound application events.
//!
//! The [`TransmissionController`](super::service::TransmissionController)
//! emits these through the [`EventSink`](super::ports::EventSink) port.
//! On the device they all end up on the serial console.

use crate::fsm::context::Variant;
use crate::record::Record;

use super::radio::RadioEvent;

/// Running totals kept by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles_started: u32,
    pub records_queued: u32,
    pub records_dropped: u32,
    pub transmissions_completed: u32,
    pub link_failures: u32,
    pub session_resets: u32,
}

/// Why a cycle ended without handing a record to the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The MAC still had a transmission pending.
    TxPending,
    /// The MAC refused the uplink.
    Rejected,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller has started; the first cycle will use `first`.
    Started { first: Variant },

    /// A cycle began sampling.
    CycleStarted { cycle: u32, variant: Variant },

    /// A record was encoded (the console copy of the uplink payload).
    RecordEncoded { variant: Variant, record: Record },

    /// The record was handed to the radio.
    UplinkQueued { variant: Variant, port: u8, len: usize },

    /// The record was discarded.
    UplinkDropped { variant: Variant, reason: DropReason },

    /// A radio event arrived, stamped with the MAC clock.
    Radio { at_ms: u64, event: RadioEvent },

    /// A join / re-join / time-sync failure was counted.
    LinkFailure { consecutive: u8, threshold: u8 },

    /// The failure threshold was reached and the session was reset.
    SessionReset { total_resets: u32 },

    /// The next cycle has been scheduled.
    NextCycleScheduled { delay_secs: u32 },

    /// A transmission finished; carries the totals so far.
    Stats(CycleStats),

    /// The cycle hit an unrecoverable error; a restart follows.
    Fatal(crate::error::Error),
}
