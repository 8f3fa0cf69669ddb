//! Main-loop event queue.
//!
//! Events are produced by:
//! - the LMIC send job (the one-shot timer armed after each completion)
//! - the LMIC event callback (join, TX start/complete, link state, ...)
//!
//! Both producers run inside the MAC's cooperative run loop; the main loop
//! drains the queue after each `run_once` step and feeds the controller.
//! The pulse-counter ISRs never touch this queue.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Send job     │────▶│  Event Queue │────▶│  Main Loop   │
//! │ onEvent()    │────▶│  (bounded)   │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::radio::RadioEvent;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The reporting-interval timer fired: start a send cycle.
    SendTimerFired,
    /// The MAC reported something.
    Radio(RadioEvent),
}

/// Bounded FIFO of [`Event`]s.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        self.channel.try_send(event).is_ok()
    }

    pub fn pop(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Feed every pending event to `handler` in FIFO order.  Events pushed
    /// by the handler itself are drained in the same call.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The firmware's single queue.  `static` because the MAC callbacks are
/// plain C functions that cannot capture state.
pub static EVENTS: EventQueue = EventQueue::new();

/// Push an event into the global queue.
pub fn push_event(event: Event) -> bool {
    let ok = EVENTS.push(event);
    if !ok {
        log::warn!("Event queue full, dropped {:?}", event);
    }
    ok
}

/// Pop the next event from the global queue.
pub fn pop_event() -> Option<Event> {
    EVENTS.pop()
}

/// Drain the global queue into a callback.
pub fn drain_events(handler: impl FnMut(Event)) {
    EVENTS.drain(handler);
}

pub fn queue_is_empty() -> bool {
    EVENTS.is_empty()
}

pub fn queue_len() -> usize {
    EVENTS.len()
}
