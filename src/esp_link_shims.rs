//! Link-time symbols that `critical-section` and `embassy-time` expect the
//! platform to provide.
//!
//! The event queue is an `embassy-sync` channel guarded by
//! `CriticalSectionRawMutex`, and the time adapter reads
//! `embassy_time::Instant`.  On ESP-IDF both resolve to the functions
//! below.  Host builds get `critical-section/std` from dev-dependencies and
//! never link these.

#[cfg(target_os = "espidf")]
use core::cell::{Cell, RefCell};
#[cfg(target_os = "espidf")]
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(target_os = "espidf")]
static QUEUE_LOCK: Mutex<()> = Mutex::new(());

#[cfg(target_os = "espidf")]
thread_local! {
    static NESTING: Cell<u8> = const { Cell::new(0) };
    static HELD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

/// Enter a (possibly nested) critical section.  Only the outermost entry
/// takes the lock.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    NESTING.with(|nesting| {
        let depth = nesting.get();
        if depth == 0 {
            // A panic while holding the lock leaves `()` behind; nothing to
            // repair, so take the guard back.
            let guard = QUEUE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            HELD.with(|held| *held.borrow_mut() = Some(guard));
        }
        let depth = depth.saturating_add(1);
        nesting.set(depth);
        depth
    })
}

#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    NESTING.with(|nesting| match nesting.get() {
        0 => {}
        1 => {
            nesting.set(0);
            HELD.with(|held| *held.borrow_mut() = None);
        }
        depth => nesting.set(depth - 1),
    })
}

/// Microseconds since boot; embassy-time runs at a 1 MHz tick.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    // SAFETY: plain read of the high-resolution timer.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

/// The firmware never awaits an embassy timer, but the driver contract
/// requires the symbol.  Wake immediately so a stray future re-polls
/// instead of hanging.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(_at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }
    // SAFETY: embassy-time passes a live `&Waker` for the duration of the call.
    let waker = unsafe { &*(waker as *const core::task::Waker) };
    waker.wake_by_ref();
    log::warn!("embassy-time: async timer requested but not supported");
}
