//! Transmission-cycle phase tracker.
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!   Idle ─▶ Sampling ─▶ Encoding ─▶ Enqueuing ─┬─▶ AwaitingCompletion
//!    ▲ ▲                                       │        │        │
//!    │ └──────────────── dropped ──────────────┘        ▼        ▼
//!    │                                               Success   Failure
//!    └───────────────────────────────────────────────────┴────────┘
//! ```
//!
//! The phase does not drive behaviour by itself: the controller in
//! [`crate::app::service`] performs each step and records it here.  The
//! tracker rejects transitions that are not in the table (debug builds
//! assert, release builds log and follow the request) and logs every move.
//! Link failures can arrive while idle, so `Idle -> Failure` is legal.
//! `Failure` and a dropped `Enqueuing` return to `AwaitingCompletion` when
//! a record is still queued, and a timer firing in that phase may start a
//! new cycle (which will then be dropped by the pending check).

pub mod context;

use log::{info, warn};

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CyclePhase {
    Idle = 0,
    Sampling = 1,
    Encoding = 2,
    Enqueuing = 3,
    AwaitingCompletion = 4,
    Success = 5,
    Failure = 6,
}

impl CyclePhase {
    /// Total number of phases, used to size the transition table.
    pub const COUNT: usize = 7;

    /// Convert an index back to a `CyclePhase`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Sampling,
            2 => Self::Encoding,
            3 => Self::Enqueuing,
            4 => Self::AwaitingCompletion,
            5 => Self::Success,
            6 => Self::Failure,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Idle
            }
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Sampling => "Sampling",
            Self::Encoding => "Encoding",
            Self::Enqueuing => "Enqueuing",
            Self::AwaitingCompletion => "AwaitingCompletion",
            Self::Success => "Success",
            Self::Failure => "Failure",
        }
    }

    /// Phases in which the controller waits for an external stimulus.
    pub const fn is_resting(self) -> bool {
        matches!(self, Self::Idle | Self::AwaitingCompletion)
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// `ALLOWED[from][to]`: whether the move is part of the cycle.
const ALLOWED: [[bool; CyclePhase::COUNT]; CyclePhase::COUNT] = {
    use CyclePhase::*;
    let mut t = [[false; CyclePhase::COUNT]; CyclePhase::COUNT];
    t[Idle as usize][Sampling as usize] = true;
    t[Idle as usize][Success as usize] = true;
    t[Idle as usize][Failure as usize] = true;
    t[Sampling as usize][Encoding as usize] = true;
    t[Encoding as usize][Enqueuing as usize] = true;
    t[Enqueuing as usize][AwaitingCompletion as usize] = true;
    t[Enqueuing as usize][Idle as usize] = true;
    t[AwaitingCompletion as usize][Sampling as usize] = true;
    t[AwaitingCompletion as usize][Success as usize] = true;
    t[AwaitingCompletion as usize][Failure as usize] = true;
    t[Success as usize][Idle as usize] = true;
    t[Failure as usize][Idle as usize] = true;
    t[Failure as usize][AwaitingCompletion as usize] = true;
    t
};

/// Whether `from -> to` is a legal cycle step.
pub fn is_allowed(from: CyclePhase, to: CyclePhase) -> bool {
    ALLOWED[from as usize][to as usize]
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub struct CycleFsm {
    current: CyclePhase,
    transitions: u32,
    rejected: u32,
}

impl CycleFsm {
    pub fn new() -> Self {
        Self {
            current: CyclePhase::Idle,
            transitions: 0,
            rejected: 0,
        }
    }

    pub fn start(&self) {
        info!("Cycle FSM starting in phase: {}", self.current.name());
    }

    pub fn current(&self) -> CyclePhase {
        self.current
    }

    /// Move to `next`.  A move to the current phase is a no-op.
    pub fn transition(&mut self, next: CyclePhase) {
        if next == self.current {
            return;
        }
        if !is_allowed(self.current, next) {
            self.rejected = self.rejected.wrapping_add(1);
            debug_assert!(
                false,
                "illegal cycle transition: {} -> {}",
                self.current.name(),
                next.name()
            );
            warn!(
                "Cycle FSM: unexpected transition {} -> {}",
                self.current.name(),
                next.name()
            );
        }

        info!(
            "Cycle FSM transition: {} -> {}",
            self.current.name(),
            next.name()
        );
        self.current = next;
        self.transitions = self.transitions.wrapping_add(1);
    }

    /// Total transitions performed since boot.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Transitions that were not in the table (release builds only).
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

impl Default for CycleFsm {
    fn default() -> Self {
        Self::new()
    }
}
