//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART console in production).  The encoded record line is the
//! exact uplink payload.

use log::{error, info, warn};

use crate::app::events::{AppEvent, DropReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { first } => {
                info!("START | first_record={}", first.name());
            }
            AppEvent::CycleStarted { cycle, variant } => {
                info!("CYCLE | #{} variant={}", cycle, variant.name());
            }
            AppEvent::RecordEncoded { variant, record } => {
                info!("RECORD | {} | {}", variant.name(), record);
            }
            AppEvent::UplinkQueued { variant, port, len } => {
                info!(
                    "UPLINK | {} record queued (port {}, {} bytes)",
                    variant.name(),
                    port,
                    len
                );
            }
            AppEvent::UplinkDropped { variant, reason } => match reason {
                DropReason::TxPending => {
                    warn!("UPLINK | OP_TXRXPEND, {} record dropped", variant.name());
                }
                DropReason::Rejected => {
                    warn!("UPLINK | MAC rejected {} record", variant.name());
                }
            },
            AppEvent::Radio { at_ms, event } => {
                info!("{}: {}", at_ms, event);
            }
            AppEvent::LinkFailure {
                consecutive,
                threshold,
            } => {
                warn!("LINK | failure {}/{}", consecutive, threshold);
            }
            AppEvent::SessionReset { total_resets } => {
                warn!(
                    "LINK | failure threshold reached, session reset (#{})",
                    total_resets
                );
            }
            AppEvent::NextCycleScheduled { delay_secs } => {
                info!("SCHED | next cycle in {} s", delay_secs);
            }
            AppEvent::Stats(s) => {
                info!(
                    "STATS | cycles={} queued={} dropped={} completed={} link_failures={} resets={}",
                    s.cycles_started,
                    s.records_queued,
                    s.records_dropped,
                    s.transmissions_completed,
                    s.link_failures,
                    s.session_resets
                );
            }
            AppEvent::Fatal(e) => {
                error!("FATAL | {}", e);
            }
        }
    }
}
