//! TransmissionController behaviour against mock adapters: sampling order,
//! record content, enqueue outcomes and completion handling.

use embassy_time::Duration;
use weatherstation::app::events::{AppEvent, DropReason};
use weatherstation::app::radio::RadioEvent;
use weatherstation::app::service::{CycleOutcome, TransmissionController};
use weatherstation::config::StationConfig;
use weatherstation::error::{Error, RadioError};
use weatherstation::events::Event;
use weatherstation::fsm::CyclePhase;
use weatherstation::fsm::context::Variant;

use crate::mock_hw::{MockRadio, MockSensors, RadioCall, RecordingSink, SensorQuery};

fn setup() -> (TransmissionController, MockSensors, MockRadio, RecordingSink) {
    let config = StationConfig::default();
    let mut ctl = TransmissionController::new(&config);
    let mut sink = RecordingSink::new();
    ctl.start(&mut sink);
    (ctl, MockSensors::new(), MockRadio::new(), sink)
}

fn complete() -> Event {
    Event::Radio(RadioEvent::TxCompleted {
        ack: false,
        downlink_len: 0,
    })
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_announces_weather_first() {
    let (ctl, _, _, sink) = setup();
    assert_eq!(ctl.phase(), CyclePhase::Idle);
    assert_eq!(ctl.upcoming_variant(), Variant::Weather);
    assert!(matches!(
        sink.events.first(),
        Some(AppEvent::Started {
            first: Variant::Weather
        })
    ));
}

// ── Sampling and encoding ─────────────────────────────────────

#[test]
fn weather_cycle_samples_in_order_and_sends_record() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();

    let out = ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    assert_eq!(out, CycleOutcome::Queued(Variant::Weather));
    assert_eq!(
        sensors.queries(),
        vec![
            SensorQuery::Temperature,
            SensorQuery::Humidity,
            SensorQuery::Rainfall
        ]
    );
    assert_eq!(
        radio.last_call(),
        Some(&RadioCall::Enqueue {
            port: 4,
            payload: r#"{"umi":61.0,"temp":22.5,"chu":4}"#.into(),
            confirmed: false,
        })
    );
    assert_eq!(ctl.phase(), CyclePhase::AwaitingCompletion);
    assert!(ctl.in_flight());
}

#[test]
fn flow_cycle_samples_in_order_and_sends_record() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();
    ctl.handle(complete(), &mut sensors, &mut radio, &mut sink)
        .unwrap();
    sensors.clear_queries();

    let out = ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    assert_eq!(out, CycleOutcome::Queued(Variant::Flow));
    assert_eq!(
        sensors.queries(),
        vec![
            SensorQuery::Distance,
            SensorQuery::WindSpeed,
            SensorQuery::WindDirection
        ]
    );
    assert_eq!(
        radio.sent().last().map(String::as_str),
        Some(r#"{"dist":87,"velo":12.4,"dir":8}"#)
    );
}

#[test]
fn encoded_record_is_emitted_before_enqueue() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    let encoded = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::RecordEncoded { .. }))
        .unwrap();
    let queued = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::UplinkQueued { .. }))
        .unwrap();
    assert!(encoded < queued);
    match &sink.events[encoded] {
        AppEvent::RecordEncoded { record, .. } => {
            assert_eq!(record.as_str(), r#"{"umi":61.0,"temp":22.5,"chu":4}"#);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn failed_humidity_read_is_sent_as_nan() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    sensors.humidity = f32::NAN;

    ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    assert_eq!(radio.sent(), vec![r#"{"umi":nan,"temp":22.5,"chu":4}"#]);
}

#[test]
fn oversized_record_is_fatal() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    sensors.temperature = f32::MAX;

    let err = ctl
        .run_cycle(&mut sensors, &mut radio, &mut sink)
        .unwrap_err();

    assert!(matches!(err, Error::Encode(_)));
    assert!(err.is_fatal());
    assert!(radio.sent().is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Fatal(_))), 1);
}

// ── Enqueue outcomes ──────────────────────────────────────────

#[test]
fn pending_transmission_drops_the_record() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    radio.pending = true;

    let out = ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    assert_eq!(
        out,
        CycleOutcome::Dropped(Variant::Weather, DropReason::TxPending)
    );
    assert!(radio.sent().is_empty());
    assert_eq!(ctl.phase(), CyclePhase::Idle);
    // The dropped cycle still used up its turn.
    assert_eq!(ctl.upcoming_variant(), Variant::Flow);
    assert_eq!(ctl.stats().records_dropped, 1);
}

#[test]
fn rejected_uplink_is_dropped_not_fatal() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    radio.reject_with = Some(RadioError::Rejected(-3));

    let out = ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    assert_eq!(
        out,
        CycleOutcome::Dropped(Variant::Weather, DropReason::Rejected)
    );
    assert!(!ctl.in_flight());
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::UplinkDropped {
                reason: DropReason::Rejected,
                ..
            }
        )),
        1
    );
}

#[test]
fn confirmed_uplinks_follow_config() {
    let config = StationConfig {
        confirmed_uplinks: true,
        uplink_port: 9,
        ..StationConfig::default()
    };
    let mut ctl = TransmissionController::new(&config);
    let (mut sensors, mut radio, mut sink) =
        (MockSensors::new(), MockRadio::new(), RecordingSink::new());
    ctl.start(&mut sink);

    ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    assert!(matches!(
        radio.last_call(),
        Some(RadioCall::Enqueue {
            port: 9,
            confirmed: true,
            ..
        })
    ));
}

// ── Completion ────────────────────────────────────────────────

#[test]
fn completion_schedules_next_cycle_after_interval() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    ctl.run_cycle(&mut sensors, &mut radio, &mut sink).unwrap();

    ctl.handle(complete(), &mut sensors, &mut radio, &mut sink)
        .unwrap();

    assert_eq!(radio.scheduled(), vec![Duration::from_secs(1800)]);
    assert_eq!(ctl.phase(), CyclePhase::Idle);
    assert!(!ctl.in_flight());
    assert_eq!(ctl.stats().transmissions_completed, 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::NextCycleScheduled { delay_secs: 1800 })),
        1
    );
}

#[test]
fn radio_events_are_timestamped_with_mac_clock() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    radio.clock_ms = 123_456;

    ctl.handle(
        Event::Radio(RadioEvent::TxStarted {
            frequency_hz: 915_200_000,
        }),
        &mut sensors,
        &mut radio,
        &mut sink,
    )
    .unwrap();

    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::Radio {
            at_ms: 123_456,
            event: RadioEvent::TxStarted { .. }
        })
    ));
    assert!(radio.calls.is_empty());
}

#[test]
fn informational_events_change_nothing() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    for ev in [
        RadioEvent::Joining,
        RadioEvent::Joined,
        RadioEvent::LinkDead,
        RadioEvent::RxComplete,
        RadioEvent::Unknown(42),
    ] {
        ctl.handle(Event::Radio(ev), &mut sensors, &mut radio, &mut sink)
            .unwrap();
    }
    assert_eq!(ctl.phase(), CyclePhase::Idle);
    assert_eq!(ctl.consecutive_failures(), 0);
    assert!(radio.calls.is_empty());
    assert!(sensors.queries().is_empty());
}

#[test]
fn timer_event_runs_a_cycle() {
    let (mut ctl, mut sensors, mut radio, mut sink) = setup();
    ctl.handle(Event::SendTimerFired, &mut sensors, &mut radio, &mut sink)
        .unwrap();
    assert_eq!(radio.sent().len(), 1);
    assert_eq!(ctl.stats().cycles_started, 1);
}
