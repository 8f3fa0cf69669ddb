//! Multi-event scenarios: link failure escalation, variant alternation over
//! many cycles, and timers that fire while a record is still in flight.

use embassy_time::Duration;
use weatherstation::app::events::{AppEvent, DropReason};
use weatherstation::app::ports::RadioPort;
use weatherstation::app::radio::RadioEvent;
use weatherstation::app::service::{CycleOutcome, TransmissionController};
use weatherstation::config::StationConfig;
use weatherstation::error::{Error, RadioError};
use weatherstation::events::Event;
use weatherstation::fsm::CyclePhase;
use weatherstation::fsm::context::Variant;

use crate::mock_hw::{MockRadio, MockSensors, RecordingSink};

struct Rig {
    ctl: TransmissionController,
    sensors: MockSensors,
    radio: MockRadio,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: &StationConfig) -> Self {
        let mut sink = RecordingSink::new();
        let mut ctl = TransmissionController::new(config);
        ctl.start(&mut sink);
        let mut radio = MockRadio::new();
        radio.pend_on_enqueue = true;
        Self {
            ctl,
            sensors: MockSensors::new(),
            radio,
            sink,
        }
    }

    fn feed(&mut self, event: Event) {
        self.ctl
            .handle(event, &mut self.sensors, &mut self.radio, &mut self.sink)
            .unwrap();
    }

    fn timer(&mut self) {
        self.feed(Event::SendTimerFired);
    }

    fn radio(&mut self, event: RadioEvent) {
        self.feed(Event::Radio(event));
    }

    /// MAC finishes the pending frame and reports completion.
    fn complete(&mut self) {
        self.radio.pending = false;
        self.radio(RadioEvent::TxCompleted {
            ack: false,
            downlink_len: 0,
        });
    }
}

// ── Failure escalation ────────────────────────────────────────

#[test]
fn third_join_failure_resets_session_and_retries_immediately() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.timer();
    assert_eq!(rig.radio.sent().len(), 1);

    rig.radio(RadioEvent::JoinFailed);
    rig.radio(RadioEvent::JoinFailed);
    assert_eq!(rig.ctl.consecutive_failures(), 2);
    assert_eq!(rig.radio.resets(), 0);
    assert_eq!(rig.ctl.phase(), CyclePhase::AwaitingCompletion);

    rig.radio(RadioEvent::JoinFailed);
    assert_eq!(rig.radio.resets(), 1);
    assert_eq!(rig.ctl.consecutive_failures(), 0);
    // The retry went out straight away with the next variant.
    let sent = rig.radio.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].starts_with(r#"{"dist":"#));
    assert_eq!(rig.ctl.phase(), CyclePhase::AwaitingCompletion);

    rig.radio(RadioEvent::JoinFailed);
    rig.radio(RadioEvent::JoinFailed);
    assert_eq!(rig.radio.resets(), 1);
    assert_eq!(rig.ctl.consecutive_failures(), 2);
    assert_eq!(rig.ctl.stats().link_failures, 5);
    assert_eq!(rig.ctl.stats().session_resets, 1);
}

#[test]
fn reset_happens_before_the_retry_send() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.timer();
    for _ in 0..3 {
        rig.radio(RadioEvent::RejoinFailed);
    }

    use crate::mock_hw::RadioCall;
    let reset_at = rig
        .radio
        .calls
        .iter()
        .position(|c| matches!(c, RadioCall::ResetSession))
        .unwrap();
    let last_send = rig
        .radio
        .calls
        .iter()
        .rposition(|c| matches!(c, RadioCall::Enqueue { .. }))
        .unwrap();
    assert!(reset_at < last_send);

    let reset_event = rig
        .sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::SessionReset { total_resets: 1 }))
        .unwrap();
    let retry_cycle = rig
        .sink
        .events
        .iter()
        .rposition(|e| matches!(e, AppEvent::CycleStarted { cycle: 2, .. }))
        .unwrap();
    assert!(reset_event < retry_cycle);
}

#[test]
fn mixed_failure_kinds_share_one_counter() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.radio(RadioEvent::JoinFailed);
    rig.radio(RadioEvent::LostTimeSync);
    assert_eq!(rig.ctl.consecutive_failures(), 2);
    rig.radio(RadioEvent::RejoinFailed);
    assert_eq!(rig.radio.resets(), 1);
}

#[test]
fn failures_while_idle_return_to_idle() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.radio(RadioEvent::LostTimeSync);
    assert_eq!(rig.ctl.phase(), CyclePhase::Idle);
    assert_eq!(rig.ctl.consecutive_failures(), 1);
    assert!(rig.radio.calls.is_empty());
}

#[test]
fn completion_clears_the_failure_streak() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.timer();
    rig.radio(RadioEvent::JoinFailed);
    rig.radio(RadioEvent::JoinFailed);

    rig.complete();
    assert_eq!(rig.ctl.consecutive_failures(), 0);

    rig.radio(RadioEvent::JoinFailed);
    rig.radio(RadioEvent::JoinFailed);
    assert_eq!(rig.radio.resets(), 0);
}

#[test]
fn starting_a_cycle_keeps_the_failure_streak() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.radio(RadioEvent::JoinFailed);
    rig.radio(RadioEvent::JoinFailed);
    rig.timer();
    assert_eq!(rig.ctl.consecutive_failures(), 2);
    rig.radio(RadioEvent::JoinFailed);
    assert_eq!(rig.radio.resets(), 1);
}

#[test]
fn threshold_of_one_resets_on_every_failure() {
    let config = StationConfig {
        max_consecutive_failures: 1,
        ..StationConfig::default()
    };
    let mut rig = Rig::new(&config);
    rig.radio(RadioEvent::JoinFailed);
    rig.radio(RadioEvent::JoinFailed);
    assert_eq!(rig.radio.resets(), 2);
    assert_eq!(rig.radio.sent().len(), 2);
}

// ── Alternation ───────────────────────────────────────────────

#[test]
fn variants_alternate_across_completed_cycles() {
    let mut rig = Rig::new(&StationConfig::default());
    for n in 1..=9u32 {
        rig.timer();
        rig.complete();
        let last = rig.radio.sent().pop().unwrap();
        if n % 2 == 1 {
            assert!(last.starts_with(r#"{"umi":"#), "cycle {n}: {last}");
        } else {
            assert!(last.starts_with(r#"{"dist":"#), "cycle {n}: {last}");
        }
    }
    assert_eq!(rig.radio.scheduled().len(), 9);
}

#[test]
fn dropped_cycles_still_alternate() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.timer(); // weather, queued
    rig.timer(); // flow, dropped: MAC busy
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::UplinkDropped {
            variant: Variant::Flow,
            reason: DropReason::TxPending
        })
    ));
    rig.complete();
    rig.timer(); // weather again
    let sent = rig.radio.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].starts_with(r#"{"umi":"#));
}

// ── In-flight handling ────────────────────────────────────────

#[test]
fn timer_during_flight_leaves_record_in_flight() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.timer();
    let out = rig
        .ctl
        .run_cycle(&mut rig.sensors, &mut rig.radio, &mut rig.sink)
        .unwrap();
    assert_eq!(
        out,
        CycleOutcome::Dropped(Variant::Flow, DropReason::TxPending)
    );
    assert!(rig.ctl.in_flight());
    assert_eq!(rig.ctl.phase(), CyclePhase::AwaitingCompletion);

    rig.complete();
    assert!(!rig.ctl.in_flight());
    assert_eq!(rig.ctl.phase(), CyclePhase::Idle);
}

#[test]
fn rejected_uplink_arms_the_next_cycle() {
    let mut rig = Rig::new(&StationConfig::default());
    rig.radio.reject_with = Some(RadioError::Rejected(-1));
    rig.timer();

    assert!(!rig.ctl.in_flight());
    assert_eq!(rig.ctl.phase(), CyclePhase::Idle);
    assert_eq!(rig.radio.scheduled(), vec![Duration::from_secs(1800)]);
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::NextCycleScheduled { delay_secs: 1800 })
    ));

    // The armed timer fires and the MAC accepts again.
    rig.radio.reject_with = None;
    rig.timer();
    let sent = rig.radio.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with(r#"{"dist":"#));
}

// ── Session setup ─────────────────────────────────────────────

#[test]
fn unprovisioned_session_is_fatal() {
    let mut radio = MockRadio::new();
    let err = radio
        .initialize_session(&StationConfig::default().radio)
        .unwrap_err();
    assert_eq!(err, RadioError::SessionNotProvisioned);
    assert!(Error::from(err).is_fatal());
}
