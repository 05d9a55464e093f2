//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - The 1 Hz clock timer callback (alarm match)
//! - The telemetry timer callback
//!
//! Events are consumed by the main loop, which processes them one at a
//! time. The queue is a lock-free SPSC ring so the timer callback context
//! never blocks on the consumer.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Clock timer  │────▶│              │     │              │
//! │ Telemetry    │────▶│  Event Queue │────▶│  Main Loop   │
//! │ timer        │     │  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 16;

/// System event types, ordered by rough priority.
/// Lower discriminant = higher priority when multiple events are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// The clock tick matched the alarm time and the servo was engaged.
    AlarmFired = 0,
    /// Telemetry report timer fired.
    TelemetryTick = 10,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Timer callbacks write (produce), main loop reads (consume).
// Uses atomic head/tail indices. The buffer is intentionally kept in a
// static so the callbacks can access it without a handle.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER slots are written only by the single producer side
// (timer callback context) at EVENT_HEAD and read only by the single
// consumer (main loop) at EVENT_TAIL; the acquire/release pairs on the
// indices order the slot accesses.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from the timer callback context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; the slot at `head` is not visible to the
    // consumer until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::AlarmFired),
        10 => Some(Event::TelemetryTick),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the process-global queue sees one owner.
    #[test]
    fn fifo_order_and_overflow_drop() {
        drain_events(|_| {});
        assert_eq!(queue_len(), 0);

        assert!(push_event(Event::AlarmFired));
        assert!(push_event(Event::TelemetryTick));
        assert_eq!(queue_len(), 2);
        assert_eq!(pop_event(), Some(Event::AlarmFired));
        assert_eq!(pop_event(), Some(Event::TelemetryTick));
        assert_eq!(pop_event(), None);

        // One slot is sacrificed to distinguish full from empty.
        for _ in 0..EVENT_QUEUE_CAP - 1 {
            assert!(push_event(Event::TelemetryTick));
        }
        assert!(!push_event(Event::AlarmFired), "full queue must drop");
        drain_events(|_| {});
        assert_eq!(queue_len(), 0);
    }
}
