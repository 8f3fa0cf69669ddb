//! Station configuration parameters
//!
//! Every tunable of the station is compiled in.  `StationConfig::default()`
//! is the single source used by `main`; nothing is reconfigurable at runtime.

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Compiled-in credentials (ABP)
// ---------------------------------------------------------------------------

/// LoRaWAN network id used by the ABP session.
pub const NET_ID: u32 = 0x13;
/// Device address assigned by the network server.
pub const DEV_ADDR: u32 = 0;
/// Network session key, MSB first.
pub const NWK_SKEY: [u8; 16] = [0; 16];
/// Application session key, MSB first.
pub const APP_SKEY: [u8; 16] = [0; 16];

/// LoRaWAN data rates used by this station (AU915 numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataRate {
    /// DR0: SF12 / 125 kHz.
    Sf12,
    /// DR8: SF12 / 500 kHz, the downlink-only rate used for RX2.
    Sf12Downlink,
}

impl DataRate {
    /// Numeric data-rate index as understood by the MAC stack.
    pub const fn index(self) -> u8 {
        match self {
            Self::Sf12 => 0,
            Self::Sf12Downlink => 8,
        }
    }
}

/// Radio session and channel-plan settings handed to the MAC at boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioSettings {
    pub net_id: u32,
    pub dev_addr: u32,
    pub nwk_skey: [u8; 16],
    pub app_skey: [u8; 16],
    /// Bitmask of enabled channels within sub-band 1 (bit 0 = 915.2 MHz,
    /// bit 7 = 916.6 MHz).  Every other sub-band is disabled.
    pub channel_mask: u8,
    pub adr_enabled: bool,
    pub link_check_enabled: bool,
    pub tx_data_rate: DataRate,
    pub rx2_data_rate: DataRate,
    pub tx_power_dbm: i8,
}

impl RadioSettings {
    /// `false` while the compiled-in keys or address are still zeroed.
    pub fn is_provisioned(&self) -> bool {
        self.dev_addr != 0
            && self.nwk_skey.iter().any(|&b| b != 0)
            && self.app_skey.iter().any(|&b| b != 0)
    }
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            net_id: NET_ID,
            dev_addr: DEV_ADDR,
            nwk_skey: NWK_SKEY,
            app_skey: APP_SKEY,
            channel_mask: 0xFF,
            adr_enabled: false,
            link_check_enabled: false,
            tx_data_rate: DataRate::Sf12,
            rx2_data_rate: DataRate::Sf12Downlink,
            tx_power_dbm: 20,
        }
    }
}

/// Core station configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    // --- Transmission ---
    /// Delay between a completed uplink and the next cycle (seconds).
    pub tx_interval_secs: u32,
    /// Consecutive join/re-join/time-sync failures before a session reset.
    pub max_consecutive_failures: u8,
    /// LoRaWAN application port for records.
    pub uplink_port: u8,
    /// Request network acknowledgement for every uplink.
    pub confirmed_uplinks: bool,
    /// Delay before the restart that follows a fatal encoder failure (ms).
    pub fatal_restart_delay_ms: u32,
    /// Task watchdog window for the main loop (ms).
    pub watchdog_timeout_ms: u32,

    // --- Sampling ---
    /// Raw readings averaged per temperature/humidity/distance query.
    pub samples_per_reading: u16,
    /// Wind speed contributed by one anemometer pulse (km/h).
    pub wind_kmh_per_pulse: f32,
    /// Rainfall contributed by one bucket tip (mm).
    pub rain_mm_per_pulse: f32,
    /// Initial nearest-neighbour distance for the wind vane (volts).
    pub vane_match_threshold_v: f32,
    /// Longest echo the ultrasonic ranger waits for (microseconds).
    pub echo_timeout_us: u32,

    // --- Radio ---
    pub radio: RadioSettings,
}

impl StationConfig {
    /// Reject values that would make the controller or sampler misbehave.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tx_interval_secs == 0 {
            return Err(Error::Config("tx_interval_secs must be > 0"));
        }
        if self.max_consecutive_failures == 0 {
            return Err(Error::Config("max_consecutive_failures must be > 0"));
        }
        if self.uplink_port == 0 || self.uplink_port > 223 {
            return Err(Error::Config("uplink_port must be in 1..=223"));
        }
        if self.watchdog_timeout_ms < 1000 {
            return Err(Error::Config("watchdog_timeout_ms must be >= 1000"));
        }
        if self.samples_per_reading == 0 {
            return Err(Error::Config("samples_per_reading must be > 0"));
        }
        if !(self.wind_kmh_per_pulse > 0.0 && self.rain_mm_per_pulse > 0.0) {
            return Err(Error::Config("pulse conversion factors must be positive"));
        }
        if self.radio.channel_mask == 0 {
            return Err(Error::Config("at least one channel must be enabled"));
        }
        Ok(())
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // Transmission
            tx_interval_secs: 1800, // 30 min
            max_consecutive_failures: 3,
            uplink_port: 4,
            confirmed_uplinks: false,
            fatal_restart_delay_ms: 1000,
            watchdog_timeout_ms: 10_000,

            // Sampling
            samples_per_reading: 100,
            wind_kmh_per_pulse: 0.4,
            rain_mm_per_pulse: 0.2,
            vane_match_threshold_v: 3.3,
            echo_timeout_us: 30_000, // ~5 m round trip

            radio: RadioSettings::default(),
        }
    }
}
