//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Creates the two periodic tick sources and pushes their events into the
//! lock-free SPSC queue:
//!
//! - **watchdog cadence** — period strictly shorter than the watchdog
//!   timeout (enforced by config tests), so the main loop always gets a
//!   pet opportunity even with sequencing jitter on the other source.
//! - **sequencing cadence** — tone stepping and sensor polling.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely call push_event() which uses AtomicU8. The callbacks
//! do nothing else — no network I/O, no heap work.
//!
//! On host targets the main loop drives the same events from a sleep
//! loop, so the consumer code is identical on both targets.

use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut WATCHDOG_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut SEQUENCE_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn watchdog_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::WatchdogTick);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn sequence_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::SequenceTick);
}

/// Start both tick sources with periods from config.
#[cfg(target_os = "espidf")]
pub fn start_timers(watchdog_pet_interval_ms: u32, sequence_tick_ms: u32) {
    // SAFETY: WATCHDOG_TIMER and SEQUENCE_TIMER are written here once at
    // boot from the single main-task context before any timer callbacks
    // fire. The callbacks themselves only call push_event(), which is
    // ISR-safe.
    unsafe {
        let watchdog_args = esp_timer_create_args_t {
            callback: Some(watchdog_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"wdt_pet\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&watchdog_args, &raw mut WATCHDOG_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: watchdog timer create failed (rc={}) — device will reset via TWDT",
                ret
            );
            return;
        }
        let ret =
            esp_timer_start_periodic(WATCHDOG_TIMER, u64::from(watchdog_pet_interval_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: watchdog timer start failed (rc={})", ret);
            return;
        }

        let sequence_args = esp_timer_create_args_t {
            callback: Some(sequence_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"sequence\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&sequence_args, &raw mut SEQUENCE_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: sequence timer create failed (rc={}) — continuing without sequencing ticks",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(SEQUENCE_TIMER, u64::from(sequence_tick_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: sequence timer start failed (rc={})", ret);
            return;
        }

        info!(
            "hw_timer: watchdog@{}ms + sequence@{}ms started",
            watchdog_pet_interval_ms, sequence_tick_ms
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(_watchdog_pet_interval_ms: u32, _sequence_tick_ms: u32) {
    log::info!("hw_timer(sim): timers not started (events driven by sleep loop)");
}

/// Stop both tick sources.
#[cfg(target_os = "espidf")]
pub fn stop_timers() {
    // SAFETY: handles are valid if start_timers() succeeded; null-check
    // prevents double-free. Main task only.
    unsafe {
        let wt = WATCHDOG_TIMER;
        if !wt.is_null() {
            esp_timer_stop(wt);
        }
        let st = SEQUENCE_TIMER;
        if !st.is_null() {
            esp_timer_stop(st);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_timers() {}

/// Host simulation helper: emit the tick pattern one sleep period produces —
/// a sequence tick every call, a watchdog tick every `divider` calls.
#[cfg(not(target_os = "espidf"))]
pub fn sim_tick(counter: u32, divider: u32) {
    push_event(Event::SequenceTick);
    if divider != 0 && counter % divider == 0 {
        push_event(Event::WatchdogTick);
    }
}
