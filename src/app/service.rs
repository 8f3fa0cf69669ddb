//! Transmission cycle controller: the hexagonal core.
//!
//! [`TransmissionController`] owns the cycle phase tracker and the
//! retry/alternation state.  All I/O flows through port traits injected at
//! call sites, so the whole controller runs against mock adapters on the
//! host.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │    TransmissionController     │
//!  RadioPort  ◀──▶│  CycleFsm · TransmissionState │
//!                 └──────────────────────────────┘
//! ```
//!
//! The controller never blocks on the radio.  A cycle runs to the point
//! where the record is handed over, then control goes back to the MAC's
//! cooperative loop until an [`Event`] arrives.

use embassy_time::Duration;
use log::{error, info, warn};

use crate::config::StationConfig;
use crate::error::Error;
use crate::events::Event;
use crate::fsm::context::{
    FailureVerdict, FlowSample, SampleSet, TransmissionState, Variant, WeatherSample,
};
use crate::fsm::{CycleFsm, CyclePhase};
use crate::record;

use super::events::{AppEvent, CycleStats, DropReason};
use super::ports::{EventSink, RadioPort, SensorPort};
use super::radio::RadioEvent;

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The record is with the radio; completion arrives as an event.
    Queued(Variant),
    /// The record was discarded.
    Dropped(Variant, DropReason),
}

// ───────────────────────────────────────────────────────────────
// TransmissionController
// ───────────────────────────────────────────────────────────────

pub struct TransmissionController {
    fsm: CycleFsm,
    state: TransmissionState,
    stats: CycleStats,
    tx_interval_secs: u32,
    uplink_port: u8,
    confirmed: bool,
}

impl TransmissionController {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            fsm: CycleFsm::new(),
            state: TransmissionState::new(config.max_consecutive_failures),
            stats: CycleStats::default(),
            tx_interval_secs: config.tx_interval_secs,
            uplink_port: config.uplink_port,
            confirmed: config.confirmed_uplinks,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start();
        let first = self.state.upcoming_variant();
        sink.emit(&AppEvent::Started { first });
        info!(
            "TransmissionController started: first record {}, interval {} s, threshold {}",
            first.name(),
            self.tx_interval_secs,
            self.state.max_failures()
        );
    }

    // ── Event dispatch ────────────────────────────────────────

    /// Process one queued event.  An `Err` is always fatal.
    pub fn handle(
        &mut self,
        event: Event,
        sensors: &mut impl SensorPort,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        match event {
            Event::SendTimerFired => self.run_cycle(sensors, radio, sink).map(|_| ()),
            Event::Radio(ev) => self.on_radio_event(ev, sensors, radio, sink),
        }
    }

    // ── Send cycle ────────────────────────────────────────────

    /// Sample, encode and enqueue one record of the active variant.
    ///
    /// The variant flips before anything can fail, so a dropped cycle still
    /// consumes its turn.  An encoder failure is returned as `Err` and
    /// leaves the tracker in `Encoding`; the caller restarts the device.
    pub fn run_cycle(
        &mut self,
        sensors: &mut impl SensorPort,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<CycleOutcome, Error> {
        let variant = self.state.begin_cycle();
        self.stats.cycles_started = self.stats.cycles_started.wrapping_add(1);
        sink.emit(&AppEvent::CycleStarted {
            cycle: self.stats.cycles_started,
            variant,
        });

        self.fsm.transition(CyclePhase::Sampling);
        let sample = Self::sample(variant, sensors);

        self.fsm.transition(CyclePhase::Encoding);
        let record = match record::encode(&sample) {
            Ok(r) => r,
            Err(e) => {
                let err = Error::from(e);
                error!("Record encoding failed: {}", err);
                sink.emit(&AppEvent::Fatal(err));
                return Err(err);
            }
        };
        sink.emit(&AppEvent::RecordEncoded {
            variant,
            record: record.clone(),
        });

        self.fsm.transition(CyclePhase::Enqueuing);
        if radio.is_tx_pending() {
            return Ok(self.drop_record(variant, DropReason::TxPending, sink));
        }

        match radio.enqueue_uplink(self.uplink_port, record.as_bytes(), self.confirmed) {
            Ok(()) => {
                self.state.set_in_flight(true);
                self.stats.records_queued = self.stats.records_queued.wrapping_add(1);
                self.fsm.transition(CyclePhase::AwaitingCompletion);
                sink.emit(&AppEvent::UplinkQueued {
                    variant,
                    port: self.uplink_port,
                    len: record.len(),
                });
                Ok(CycleOutcome::Queued(variant))
            }
            Err(e) => {
                warn!("Uplink rejected by MAC: {}", e);
                let outcome = self.drop_record(variant, DropReason::Rejected, sink);
                // No completion will follow, so arm the next cycle here.
                self.schedule_next(radio, sink);
                Ok(outcome)
            }
        }
    }

    fn sample(variant: Variant, sensors: &mut impl SensorPort) -> SampleSet {
        match variant {
            Variant::Weather => {
                let temperature = sensors.temperature();
                let humidity = sensors.humidity();
                let rainfall = sensors.rainfall();
                SampleSet::Weather(WeatherSample {
                    humidity,
                    temperature,
                    rainfall,
                })
            }
            Variant::Flow => {
                let distance = sensors.distance();
                let wind_speed = sensors.wind_speed();
                let wind_direction = sensors.wind_direction();
                SampleSet::Flow(FlowSample {
                    distance,
                    wind_speed,
                    wind_direction,
                })
            }
        }
    }

    fn drop_record(
        &mut self,
        variant: Variant,
        reason: DropReason,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.stats.records_dropped = self.stats.records_dropped.wrapping_add(1);
        self.fsm.transition(self.resting_phase());
        sink.emit(&AppEvent::UplinkDropped { variant, reason });
        CycleOutcome::Dropped(variant, reason)
    }

    // ── Radio events ──────────────────────────────────────────

    fn on_radio_event(
        &mut self,
        event: RadioEvent,
        sensors: &mut impl SensorPort,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        sink.emit(&AppEvent::Radio {
            at_ms: radio.now_ms(),
            event,
        });

        if event.is_link_failure() {
            return self.on_link_failure(sensors, radio, sink);
        }
        if let RadioEvent::TxCompleted { .. } = event {
            self.on_tx_completed(radio, sink);
        }
        Ok(())
    }

    fn on_tx_completed(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        self.fsm.transition(CyclePhase::Success);
        self.state.record_success();
        self.stats.transmissions_completed = self.stats.transmissions_completed.wrapping_add(1);
        self.fsm.transition(CyclePhase::Idle);

        self.schedule_next(radio, sink);
        sink.emit(&AppEvent::Stats(self.stats));
    }

    fn schedule_next(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        radio.schedule_callback(Duration::from_secs(u64::from(self.tx_interval_secs)));
        sink.emit(&AppEvent::NextCycleScheduled {
            delay_secs: self.tx_interval_secs,
        });
    }

    fn on_link_failure(
        &mut self,
        sensors: &mut impl SensorPort,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        let resting = self.resting_phase();
        self.fsm.transition(CyclePhase::Failure);
        self.stats.link_failures = self.stats.link_failures.wrapping_add(1);
        let threshold = self.state.max_failures();

        match self.state.record_failure() {
            FailureVerdict::Counted(consecutive) => {
                sink.emit(&AppEvent::LinkFailure {
                    consecutive,
                    threshold,
                });
                self.fsm.transition(resting);
                Ok(())
            }
            FailureVerdict::ResetRequired => {
                sink.emit(&AppEvent::LinkFailure {
                    consecutive: threshold,
                    threshold,
                });
                radio.reset_session();
                self.state.set_in_flight(false);
                self.stats.session_resets = self.stats.session_resets.wrapping_add(1);
                sink.emit(&AppEvent::SessionReset {
                    total_resets: self.stats.session_resets,
                });
                self.fsm.transition(CyclePhase::Idle);
                self.run_cycle(sensors, radio, sink).map(|_| ())
            }
        }
    }

    /// Where the controller waits between stimuli.
    fn resting_phase(&self) -> CyclePhase {
        if self.state.in_flight() {
            CyclePhase::AwaitingCompletion
        } else {
            CyclePhase::Idle
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> CyclePhase {
        self.fsm.current()
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn consecutive_failures(&self) -> u8 {
        self.state.consecutive_failures()
    }

    pub fn upcoming_variant(&self) -> Variant {
        self.state.upcoming_variant()
    }

    pub fn in_flight(&self) -> bool {
        self.state.in_flight()
    }
}
