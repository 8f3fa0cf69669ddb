//! LoRaWAN MAC adapter over the MCCI LMIC library.
//!
//! LMIC itself is C/C++ and is linked in as the `lmic_glue` ESP-IDF
//! component (see `components/lmic_glue`).  The glue exposes a flat C ABI
//! (`wx_lmic_*`) and calls back into two Rust functions defined here:
//!
//! - `wx_lmic_on_event`: every `onEvent()` from the MAC.
//! - `wx_lmic_on_send_job`: the one-shot send job armed by
//!   [`RadioPort::schedule_callback`].
//!
//! Both callbacks run inside `os_runloop_once()` on the main task, so they
//! only push onto [`crate::events::EVENTS`]; the controller sees them on
//! the next drain.

use core::ffi::c_int;

use embassy_time::Duration;
use log::{info, warn};

use crate::app::ports::RadioPort;
use crate::app::radio::RadioEvent;
use crate::config::RadioSettings;
use crate::error::RadioError;
use crate::events::{Event, push_event};

unsafe extern "C" {
    fn wx_lmic_init() -> c_int;
    fn wx_lmic_set_session(net_id: u32, dev_addr: u32, nwk_skey: *const u8, app_skey: *const u8);
    fn wx_lmic_apply_channel_plan(
        channel_mask: u8,
        adr: c_int,
        link_check: c_int,
        rx2_dr: u8,
        tx_dr: u8,
        tx_power_dbm: i8,
    );
    fn wx_lmic_tx_pending() -> c_int;
    fn wx_lmic_send(port: u8, data: *const u8, len: u8, confirmed: c_int) -> c_int;
    fn wx_lmic_schedule_send(delay_ms: u32);
    fn wx_lmic_reset();
    fn wx_lmic_run_once();
    fn wx_lmic_job_due(within_ms: u32) -> c_int;
    fn wx_lmic_now_ms() -> u64;
}

#[unsafe(no_mangle)]
pub extern "C" fn wx_lmic_on_event(code: u8, txrx_flags: u8, data_len: u8, freq_hz: u32) {
    push_event(Event::Radio(RadioEvent::from_lmic(
        code, txrx_flags, data_len, freq_hz,
    )));
}

#[unsafe(no_mangle)]
pub extern "C" fn wx_lmic_on_send_job() {
    push_event(Event::SendTimerFired);
}

/// Largest frame `LMIC_setTxData2` accepts (`MAX_LEN_PAYLOAD`).
const MAX_PAYLOAD: usize = 255;

/// Handle to the single LMIC instance.
pub struct LmicRadio {
    settings: Option<RadioSettings>,
}

impl LmicRadio {
    /// Bring up SPI, the LMIC OS layer and the MAC.  Call once.
    pub fn init() -> Result<Self, RadioError> {
        // SAFETY: single call from main() before the event loop.
        let rc = unsafe { wx_lmic_init() };
        if rc != 0 {
            return Err(RadioError::Rejected(rc));
        }
        info!("LMIC: MAC initialised");
        Ok(Self { settings: None })
    }

    /// Service the MAC scheduler once.  Callbacks may fire from in here.
    pub fn run_once(&mut self) {
        // SAFETY: LMIC is only ever touched from the main task.
        unsafe { wx_lmic_run_once() }
    }

    /// True when a MAC job (RX window, TX start) is due within `within_ms`.
    pub fn job_due_within(&self, within_ms: u32) -> bool {
        // SAFETY: reads the LMIC job queue; main task only.
        unsafe { wx_lmic_job_due(within_ms) != 0 }
    }

    fn apply(settings: &RadioSettings) {
        // SAFETY: key pointers reference 16-byte arrays that outlive the
        // call; the glue copies them.
        unsafe {
            wx_lmic_set_session(
                settings.net_id,
                settings.dev_addr,
                settings.nwk_skey.as_ptr(),
                settings.app_skey.as_ptr(),
            );
            wx_lmic_apply_channel_plan(
                settings.channel_mask,
                c_int::from(settings.adr_enabled),
                c_int::from(settings.link_check_enabled),
                settings.rx2_data_rate.index(),
                settings.tx_data_rate.index(),
                settings.tx_power_dbm,
            );
        }
    }
}

impl RadioPort for LmicRadio {
    fn initialize_session(&mut self, settings: &RadioSettings) -> Result<(), RadioError> {
        if !settings.is_provisioned() {
            return Err(RadioError::SessionNotProvisioned);
        }
        Self::apply(settings);
        info!(
            "LMIC: ABP session {:08X}, channel mask {:#04x}, DR{} @ {} dBm, RX2 DR{}",
            settings.dev_addr,
            settings.channel_mask,
            settings.tx_data_rate.index(),
            settings.tx_power_dbm,
            settings.rx2_data_rate.index()
        );
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn is_tx_pending(&self) -> bool {
        // SAFETY: reads LMIC.opmode; main task only.
        unsafe { wx_lmic_tx_pending() != 0 }
    }

    fn enqueue_uplink(
        &mut self,
        port: u8,
        payload: &[u8],
        confirmed: bool,
    ) -> Result<(), RadioError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(RadioError::PayloadTooLarge);
        }
        // SAFETY: LMIC copies `payload` into its own buffer before returning.
        let rc = unsafe {
            wx_lmic_send(
                port,
                payload.as_ptr(),
                payload.len() as u8,
                c_int::from(confirmed),
            )
        };
        if rc != 0 {
            return Err(RadioError::Rejected(rc));
        }
        Ok(())
    }

    fn reset_session(&mut self) {
        // SAFETY: main task only.
        unsafe { wx_lmic_reset() }
        match &self.settings {
            Some(settings) => Self::apply(settings),
            None => warn!("LMIC: reset without a session to restore"),
        }
    }

    fn schedule_callback(&mut self, delay: Duration) {
        let ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        // SAFETY: re-arming the static send job replaces any pending one.
        unsafe { wx_lmic_schedule_send(ms) }
    }

    fn now_ms(&self) -> u64 {
        // SAFETY: plain timer read.
        unsafe { wx_lmic_now_ms() }
    }
}
