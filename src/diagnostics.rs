//! Runtime diagnostics, panic logging and controlled restarts.
//!
//! A snapshot of heap and uptime is logged after every completed
//! transmission so long-running stations show slow leaks in the console
//! capture.  The panic hook only logs: there is no persistent storage on
//! this board.

use serde::Serialize;

use crate::app::events::CycleStats;

/// Runtime diagnostics snapshot collected on demand.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeMetrics {
    pub uptime_secs: u64,
    pub cycles_started: u32,
    pub session_resets: u32,
    pub heap_free: u32,
    pub heap_min_free: u32,
}

impl RuntimeMetrics {
    #[cfg(target_os = "espidf")]
    pub fn collect(uptime_secs: u64, stats: &CycleStats) -> Self {
        use esp_idf_svc::sys::*;
        // SAFETY: plain allocator statistics reads.
        let heap_free = unsafe { esp_get_free_heap_size() };
        let heap_min_free = unsafe { esp_get_minimum_free_heap_size() };

        Self {
            uptime_secs,
            cycles_started: stats.cycles_started,
            session_resets: stats.session_resets,
            heap_free,
            heap_min_free,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn collect(uptime_secs: u64, stats: &CycleStats) -> Self {
        // Synthetic heap figures for simulation runs.
        let heap_free: u32 = 280_000;
        Self {
            uptime_secs,
            cycles_started: stats.cycles_started,
            session_resets: stats.session_resets,
            heap_free,
            heap_min_free: heap_free - heap_free / 8,
        }
    }

    /// Single-line JSON form for the console log.
    pub fn to_log_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Install a panic hook that logs the reason before the default abort.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        match info.location() {
            Some(loc) => log::error!("PANIC: {} ({}:{})", reason, loc.file(), loc.line()),
            None => log::error!("PANIC: {}", reason),
        }
    }));
}

/// Wait `delay_ms` so the console drains, then restart the chip.
#[cfg(target_os = "espidf")]
pub fn restart_after(delay_ms: u32) -> ! {
    log::error!("Restarting in {} ms", delay_ms);
    esp_idf_hal::delay::FreeRtos::delay_ms(delay_ms);
    esp_idf_svc::hal::reset::restart()
}
