//! Mock adapters for integration tests.
//!
//! Records every sensor query and radio call so tests can assert on the
//! full history without a radio or transducers attached.

use std::cell::RefCell;
use std::rc::Rc;

use embassy_time::Duration;
use weatherstation::app::events::AppEvent;
use weatherstation::app::ports::{EventSink, RadioPort, SensorPort};
use weatherstation::config::RadioSettings;
use weatherstation::error::RadioError;
use weatherstation::sensors::wind::WindDirection;

// ── Sensor query record ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorQuery {
    Temperature,
    Humidity,
    Rainfall,
    WindSpeed,
    WindDirection,
    Distance,
}

/// Shared query log so a test can inspect the order a cycle sampled in
/// while the controller holds `&mut` to the sensors.
pub type QueryLog = Rc<RefCell<Vec<SensorQuery>>>;

// ── MockSensors ───────────────────────────────────────────────

pub struct MockSensors {
    pub temperature: f32,
    pub humidity: f32,
    pub rainfall: u32,
    pub wind_speed: f32,
    pub wind_direction: WindDirection,
    pub distance: u32,
    pub log: QueryLog,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn new() -> Self {
        Self {
            temperature: 22.5,
            humidity: 61.0,
            rainfall: 4,
            wind_speed: 12.4,
            wind_direction: WindDirection::SouthWest,
            distance: 87,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn queries(&self) -> Vec<SensorQuery> {
        self.log.borrow().clone()
    }

    pub fn clear_queries(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Default for MockSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockSensors {
    fn temperature(&mut self) -> f32 {
        self.log.borrow_mut().push(SensorQuery::Temperature);
        self.temperature
    }

    fn humidity(&mut self) -> f32 {
        self.log.borrow_mut().push(SensorQuery::Humidity);
        self.humidity
    }

    fn rainfall(&mut self) -> u32 {
        self.log.borrow_mut().push(SensorQuery::Rainfall);
        self.rainfall
    }

    fn wind_speed(&mut self) -> f32 {
        self.log.borrow_mut().push(SensorQuery::WindSpeed);
        self.wind_speed
    }

    fn wind_direction(&mut self) -> WindDirection {
        self.log.borrow_mut().push(SensorQuery::WindDirection);
        self.wind_direction
    }

    fn distance(&mut self) -> u32 {
        self.log.borrow_mut().push(SensorQuery::Distance);
        self.distance
    }
}

// ── Radio call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RadioCall {
    InitializeSession,
    Enqueue {
        port: u8,
        payload: String,
        confirmed: bool,
    },
    ResetSession,
    Schedule(Duration),
}

// ── MockRadio ─────────────────────────────────────────────────

pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    /// Reported by `is_tx_pending()`.
    pub pending: bool,
    /// When set, `enqueue_uplink` fails with this error.
    pub reject_with: Option<RadioError>,
    /// Set `pending` after every accepted uplink, like the real MAC.
    pub pend_on_enqueue: bool,
    pub clock_ms: u64,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            pending: false,
            reject_with: None,
            pend_on_enqueue: false,
            clock_ms: 0,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RadioCall::Enqueue { payload, .. } => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn resets(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RadioCall::ResetSession))
            .count()
    }

    pub fn scheduled(&self) -> Vec<Duration> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RadioCall::Schedule(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn last_call(&self) -> Option<&RadioCall> {
        self.calls.last()
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPort for MockRadio {
    fn initialize_session(&mut self, settings: &RadioSettings) -> Result<(), RadioError> {
        self.calls.push(RadioCall::InitializeSession);
        if settings.is_provisioned() {
            Ok(())
        } else {
            Err(RadioError::SessionNotProvisioned)
        }
    }

    fn is_tx_pending(&self) -> bool {
        self.pending
    }

    fn enqueue_uplink(
        &mut self,
        port: u8,
        payload: &[u8],
        confirmed: bool,
    ) -> Result<(), RadioError> {
        if let Some(e) = self.reject_with {
            return Err(e);
        }
        self.calls.push(RadioCall::Enqueue {
            port,
            payload: String::from_utf8_lossy(payload).into_owned(),
            confirmed,
        });
        if self.pend_on_enqueue {
            self.pending = true;
        }
        Ok(())
    }

    fn reset_session(&mut self) {
        self.calls.push(RadioCall::ResetSession);
        self.pending = false;
    }

    fn schedule_callback(&mut self, delay: Duration) {
        self.calls.push(RadioCall::Schedule(delay));
    }

    fn now_ms(&self) -> u64 {
        self.clock_ms
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
