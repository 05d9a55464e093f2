//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Two periodic timers:
//! - the clock tick (1 Hz by default) driving [`run_tick`], which advances
//!   the shared clock and commits the servo intent on an alarm match;
//! - the telemetry timer, which only pushes an event for the main loop.
//!
//! Timer callbacks execute in the ESP timer task context. The tick work is
//! bounded arithmetic under a short critical section plus at most one PWM
//! duty write, so it returns deterministically.
//!
//! On simulation targets the main loop drives [`run_tick`] from a sleep
//! loop instead.

use crate::clock::{SharedClock, TickOutcome};
use crate::drivers::servo;
use crate::events::{Event, push_event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut CLOCK_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut TELEMETRY_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut TICK_CLOCK: Option<&'static SharedClock> = None;

/// SAFETY: CLOCK_TIMER is written once in `start_timers()` before any
/// timer callbacks fire. Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn clock_timer() -> esp_timer_handle_t {
    unsafe { CLOCK_TIMER }
}

/// SAFETY: Same invariants as `clock_timer()`.
#[cfg(target_os = "espidf")]
unsafe fn telemetry_timer() -> esp_timer_handle_t {
    unsafe { TELEMETRY_TIMER }
}

/// One clock tick: advance the shared clock and, on an alarm match, commit
/// the servo engage before returning (so a concurrently handled request
/// sees the post-tick actuator state) and queue the event for logging.
pub fn run_tick(clock: &SharedClock) {
    if clock.tick() == TickOutcome::AlarmMatched {
        servo::activate_from_isr();
        push_event(Event::AlarmFired);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn clock_tick_cb(_arg: *mut core::ffi::c_void) {
    // SAFETY: TICK_CLOCK is written once in start_timers() before the
    // timer starts.
    if let Some(clock) = unsafe { TICK_CLOCK } {
        run_tick(clock);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn telemetry_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::TelemetryTick);
}

/// Start the hardware tick timers.
///
/// - clock tick at `tick_period_ms` (1000 ms = 1 Hz by default)
/// - telemetry tick at `telemetry_interval_secs`
#[cfg(target_os = "espidf")]
pub fn start_timers(
    clock: &'static SharedClock,
    tick_period_ms: u32,
    telemetry_interval_secs: u32,
) {
    // SAFETY: TICK_CLOCK / CLOCK_TIMER / TELEMETRY_TIMER are written here
    // once at boot from the single main-task context before any timer
    // callbacks fire. The callbacks only touch the shared clock's critical
    // section, the servo atomic, and the lock-free event queue.
    unsafe {
        TICK_CLOCK = Some(clock);

        // Clock tick timer
        let clock_args = esp_timer_create_args_t {
            callback: Some(clock_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"clock\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&clock_args, &raw mut CLOCK_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: clock timer create failed (rc={}) — clock will not advance",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(CLOCK_TIMER, u64::from(tick_period_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: clock timer start failed (rc={})", ret);
            return;
        }

        // Telemetry timer
        let telemetry_args = esp_timer_create_args_t {
            callback: Some(telemetry_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"telemetry\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&telemetry_args, &raw mut TELEMETRY_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: telemetry timer create failed (rc={}) — continuing without telemetry",
                ret
            );
            return;
        }
        let ret =
            esp_timer_start_periodic(TELEMETRY_TIMER, u64::from(telemetry_interval_secs) * 1_000_000);
        if ret != ESP_OK {
            log::error!("hw_timer: telemetry timer start failed (rc={})", ret);
            return;
        }

        info!(
            "hw_timer: clock@{}ms + telemetry@{}s started",
            tick_period_ms, telemetry_interval_secs
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(
    _clock: &'static SharedClock,
    _tick_period_ms: u32,
    _telemetry_interval_secs: u32,
) {
    log::info!("hw_timer(sim): timers not started (ticks driven by sleep loop)");
}

/// Stop all hardware tick timers.
#[cfg(target_os = "espidf")]
pub fn stop_timers() {
    // SAFETY: handles are valid if start_timers() succeeded; null-check
    // prevents stopping a timer that never started.
    unsafe {
        // SAFETY: clock_timer()/telemetry_timer() contract — main task only.
        let ct = clock_timer();
        if !ct.is_null() {
            esp_timer_stop(ct);
        }
        let tt = telemetry_timer();
        if !tt.is_null() {
            esp_timer_stop(tt);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_timers() {}
