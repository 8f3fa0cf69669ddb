//! Inbound radio MAC events.
//!
//! The MAC delivers a numeric event code from its own task context; the
//! adapter converts it into a [`RadioEvent`] here and posts it to the
//! main-loop queue.  Codes follow the LMIC `ev_t` enumeration.

use core::fmt;

/// `txrxFlags` bit set when the network acknowledged a confirmed uplink.
pub const TXRX_ACK: u8 = 0x80;

// LMIC `ev_t` values.
const EV_SCAN_TIMEOUT: u8 = 1;
const EV_BEACON_FOUND: u8 = 2;
const EV_BEACON_MISSED: u8 = 3;
const EV_BEACON_TRACKED: u8 = 4;
const EV_JOINING: u8 = 5;
const EV_JOINED: u8 = 6;
const EV_JOIN_FAILED: u8 = 8;
const EV_REJOIN_FAILED: u8 = 9;
const EV_TXCOMPLETE: u8 = 10;
const EV_LOST_TSYNC: u8 = 11;
const EV_RESET: u8 = 12;
const EV_RXCOMPLETE: u8 = 13;
const EV_LINK_DEAD: u8 = 14;
const EV_LINK_ALIVE: u8 = 15;
const EV_TXSTART: u8 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioEvent {
    ScanTimeout,
    BeaconFound,
    BeaconMissed,
    BeaconTracked,
    Joining,
    Joined,
    JoinFailed,
    RejoinFailed,
    LostTimeSync,
    Reset,
    RxComplete,
    LinkDead,
    LinkAlive,
    /// Transmission started on `frequency_hz`.
    TxStarted { frequency_hz: u32 },
    /// Transmission (and its receive windows) finished.
    TxCompleted { ack: bool, downlink_len: u8 },
    /// A code this firmware does not know about.
    Unknown(u8),
}

impl RadioEvent {
    /// Build an event from the raw MAC callback arguments.
    pub fn from_lmic(code: u8, txrx_flags: u8, data_len: u8, frequency_hz: u32) -> Self {
        match code {
            EV_SCAN_TIMEOUT => Self::ScanTimeout,
            EV_BEACON_FOUND => Self::BeaconFound,
            EV_BEACON_MISSED => Self::BeaconMissed,
            EV_BEACON_TRACKED => Self::BeaconTracked,
            EV_JOINING => Self::Joining,
            EV_JOINED => Self::Joined,
            EV_JOIN_FAILED => Self::JoinFailed,
            EV_REJOIN_FAILED => Self::RejoinFailed,
            EV_TXCOMPLETE => Self::TxCompleted {
                ack: txrx_flags & TXRX_ACK != 0,
                downlink_len: data_len,
            },
            EV_LOST_TSYNC => Self::LostTimeSync,
            EV_RESET => Self::Reset,
            EV_RXCOMPLETE => Self::RxComplete,
            EV_LINK_DEAD => Self::LinkDead,
            EV_LINK_ALIVE => Self::LinkAlive,
            EV_TXSTART => Self::TxStarted { frequency_hz },
            other => Self::Unknown(other),
        }
    }

    /// Join failure, re-join failure or loss of time sync: the events that
    /// count toward a forced session reset.
    pub const fn is_link_failure(&self) -> bool {
        matches!(self, Self::JoinFailed | Self::RejoinFailed | Self::LostTimeSync)
    }
}

impl fmt::Display for RadioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanTimeout => f.write_str("EV_SCAN_TIMEOUT"),
            Self::BeaconFound => f.write_str("EV_BEACON_FOUND"),
            Self::BeaconMissed => f.write_str("EV_BEACON_MISSED"),
            Self::BeaconTracked => f.write_str("EV_BEACON_TRACKED"),
            Self::Joining => f.write_str("EV_JOINING"),
            Self::Joined => f.write_str("EV_JOINED"),
            Self::JoinFailed => f.write_str("EV_JOIN_FAILED"),
            Self::RejoinFailed => f.write_str("EV_REJOIN_FAILED"),
            Self::LostTimeSync => f.write_str("EV_LOST_TSYNC"),
            Self::Reset => f.write_str("EV_RESET"),
            Self::RxComplete => f.write_str("EV_RXCOMPLETE"),
            Self::LinkDead => f.write_str("EV_LINK_DEAD"),
            Self::LinkAlive => f.write_str("EV_LINK_ALIVE"),
            Self::TxStarted { frequency_hz } => {
                write!(f, "EV_TXSTART ({} Hz)", frequency_hz)
            }
            Self::TxCompleted { ack, downlink_len } => {
                write!(f, "EV_TXCOMPLETE (includes waiting for RX windows)")?;
                if *ack {
                    write!(f, ", received ack")?;
                }
                if *downlink_len > 0 {
                    write!(f, ", received {} bytes of payload", downlink_len)?;
                }
                Ok(())
            }
            Self::Unknown(code) => write!(f, "Unknown event {}", code),
        }
    }
}
