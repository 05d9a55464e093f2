//! Clock / alarm state machine.
//!
//! [`ClockCore`] owns the time-of-day counter and the configured alarm and
//! advances one second per tick, carrying seconds into minutes into hours.
//! Hours accept 0–12 on the way in, and the carry wraps 12 back to 1 (a
//! 12-hour face with no AM/PM marker), so 13 is never observable.
//!
//! [`SharedClock`] wraps the core in a critical-section blocking mutex so
//! the periodic timer callback and the request-handling context can share
//! it. The lock is held for a few arithmetic operations at most, and a
//! reader can never observe a torn `{h, m, s}` triple.
//!
//! Output is Moore-style: each tick reports whether the post-increment time
//! equals the alarm, and the caller commits the matching servo intent
//! before the tick returns.

use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::error::TimeError;

// ───────────────────────────────────────────────────────────────
// Time-of-day
// ───────────────────────────────────────────────────────────────

/// A wall-clock triple. Always within range once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl TimeOfDay {
    /// Boot value.
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Validate and construct. Hours 0–12, minutes and seconds 0–59.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, TimeError> {
        if hours > 12 || minutes > 59 || seconds > 59 {
            return Err(TimeError::OutOfRange);
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

// ───────────────────────────────────────────────────────────────
// Alarm time
// ───────────────────────────────────────────────────────────────

/// Alarm triple: either a valid [`TimeOfDay`]-shaped value or the disabled
/// sentinel, whose fields sit outside the reachable clock range and
/// therefore never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

/// Field value marking a disarmed alarm.
const DISABLED_FIELD: u8 = 100;

impl AlarmTime {
    /// Disarmed alarm — the default state.
    pub const DISABLED: Self = Self {
        hours: DISABLED_FIELD,
        minutes: DISABLED_FIELD,
        seconds: DISABLED_FIELD,
    };

    /// Validate and construct. Accepts either a valid time triple or the
    /// exact disabled sentinel (`100 100 100`), which disarms the alarm.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, TimeError> {
        if (hours, minutes, seconds) == (DISABLED_FIELD, DISABLED_FIELD, DISABLED_FIELD) {
            return Ok(Self::DISABLED);
        }
        let t = TimeOfDay::new(hours, minutes, seconds)?;
        Ok(Self::at(t))
    }

    /// Alarm at a specific clock time.
    pub fn at(t: TimeOfDay) -> Self {
        Self {
            hours: t.hours,
            minutes: t.minutes,
            seconds: t.seconds,
        }
    }

    pub fn is_disabled(&self) -> bool {
        *self == Self::DISABLED
    }

    /// All three fields equal. The sentinel fields are unreachable by the
    /// clock, so a disarmed alarm can never match.
    fn matches(&self, t: &TimeOfDay) -> bool {
        self.hours == t.hours && self.minutes == t.minutes && self.seconds == t.seconds
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_disabled() {
            write!(f, "--:--:--")
        } else {
            write!(
                f,
                "{:02}:{:02}:{:02}",
                self.hours, self.minutes, self.seconds
            )
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Clock core
// ───────────────────────────────────────────────────────────────

/// Result of one tick, as seen by the caller that must act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time advanced; no alarm match.
    Advanced,
    /// The post-increment time equals the alarm — engage the actuator.
    AlarmMatched,
}

/// The clock/alarm state: `{time, alarm, last tick outcome}`.
///
/// `tick()` is bounded arithmetic only — it cannot fail, block, or
/// allocate, so it is safe to run from the timer callback context.
#[derive(Debug)]
pub struct ClockCore {
    time: TimeOfDay,
    alarm: AlarmTime,
    last_outcome: TickOutcome,
}

impl ClockCore {
    pub const fn new() -> Self {
        Self {
            time: TimeOfDay::ZERO,
            alarm: AlarmTime::DISABLED,
            last_outcome: TickOutcome::Advanced,
        }
    }

    /// Advance one second, cascading carries; hours wrap from 12 to 1 when
    /// the carry lands on 13. The alarm comparison runs after the
    /// increment, so an alarm equal to the pre-tick time does not fire.
    pub fn tick(&mut self) -> TickOutcome {
        self.time.seconds += 1;
        if self.time.seconds == 60 {
            self.time.seconds = 0;
            self.time.minutes += 1;
        }
        if self.time.minutes == 60 {
            self.time.minutes = 0;
            self.time.hours += 1;
        }
        if self.time.hours == 13 {
            self.time.hours = 1;
        }

        let outcome = if self.alarm.matches(&self.time) {
            TickOutcome::AlarmMatched
        } else {
            TickOutcome::Advanced
        };
        self.last_outcome = outcome;
        outcome
    }

    /// Replace the current time. Validation happens in [`TimeOfDay::new`];
    /// a constructed value is always in range.
    pub fn set_time(&mut self, t: TimeOfDay) {
        self.time = t;
    }

    /// Replace the alarm.
    pub fn set_alarm(&mut self, a: AlarmTime) {
        self.alarm = a;
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn alarm(&self) -> AlarmTime {
        self.alarm
    }

    pub fn last_outcome(&self) -> TickOutcome {
        self.last_outcome
    }
}

// ───────────────────────────────────────────────────────────────
// Shared wrapper
// ───────────────────────────────────────────────────────────────

/// [`ClockCore`] behind an interrupt-safe critical section.
///
/// The timer callback calls [`tick`](Self::tick); the request context calls
/// the setters and [`snapshot`](Self::snapshot). Neither side can block the
/// other for longer than the bounded lock hold.
pub struct SharedClock {
    inner: Mutex<CriticalSectionRawMutex, RefCell<ClockCore>>,
}

impl SharedClock {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ClockCore::new())),
        }
    }

    /// Advance one second. See [`ClockCore::tick`].
    pub fn tick(&self) -> TickOutcome {
        self.inner.lock(|c| c.borrow_mut().tick())
    }

    /// Atomically replace the current time.
    pub fn set_time(&self, t: TimeOfDay) {
        self.inner.lock(|c| c.borrow_mut().set_time(t));
    }

    /// Atomically replace the alarm.
    pub fn set_alarm(&self, a: AlarmTime) {
        self.inner.lock(|c| c.borrow_mut().set_alarm(a));
    }

    /// Consistent view of `{time, alarm}` — never a torn triple.
    pub fn snapshot(&self) -> (TimeOfDay, AlarmTime) {
        self.inner.lock(|c| {
            let c = c.borrow();
            (c.time(), c.alarm())
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_ticks_carry_one_minute() {
        let mut clock = ClockCore::new();
        for _ in 0..60 {
            clock.tick();
        }
        assert_eq!(clock.time(), TimeOfDay::new(0, 1, 0).unwrap());
    }

    #[test]
    fn hours_wrap_from_twelve_to_one() {
        let mut clock = ClockCore::new();
        clock.set_time(TimeOfDay::new(12, 59, 59).unwrap());
        clock.tick();
        assert_eq!(clock.time(), TimeOfDay::new(1, 0, 0).unwrap());
    }

    #[test]
    fn thirteen_is_never_observable() {
        let mut clock = ClockCore::new();
        clock.set_time(TimeOfDay::new(12, 0, 0).unwrap());
        for _ in 0..3_600 {
            clock.tick();
            assert!(clock.time().hours() <= 12);
        }
        assert_eq!(clock.time().hours(), 1);
    }

    #[test]
    fn alarm_matches_on_the_tick_that_reaches_it() {
        let mut clock = ClockCore::new();
        clock.set_time(TimeOfDay::new(6, 29, 59).unwrap());
        clock.set_alarm(AlarmTime::new(6, 30, 0).unwrap());
        assert_eq!(clock.tick(), TickOutcome::AlarmMatched);
        assert_eq!(clock.last_outcome(), TickOutcome::AlarmMatched);
        // The next tick moves past the alarm and reports no match.
        assert_eq!(clock.tick(), TickOutcome::Advanced);
    }

    #[test]
    fn alarm_equal_to_pre_tick_time_does_not_fire() {
        let mut clock = ClockCore::new();
        clock.set_time(TimeOfDay::new(7, 0, 0).unwrap());
        clock.set_alarm(AlarmTime::new(7, 0, 0).unwrap());
        // Comparison runs after the increment.
        assert_eq!(clock.tick(), TickOutcome::Advanced);
    }

    #[test]
    fn disabled_alarm_never_matches() {
        let mut clock = ClockCore::new();
        assert!(clock.alarm().is_disabled());
        for _ in 0..7_200 {
            assert_eq!(clock.tick(), TickOutcome::Advanced);
        }
    }

    #[test]
    fn set_time_rejects_out_of_range_fields() {
        assert_eq!(TimeOfDay::new(13, 0, 0), Err(TimeError::OutOfRange));
        assert_eq!(TimeOfDay::new(25, 0, 0), Err(TimeError::OutOfRange));
        assert_eq!(TimeOfDay::new(0, 60, 0), Err(TimeError::OutOfRange));
        assert_eq!(TimeOfDay::new(0, 0, 60), Err(TimeError::OutOfRange));
        assert!(TimeOfDay::new(12, 59, 59).is_ok());
    }

    #[test]
    fn alarm_accepts_sentinel_and_rejects_other_out_of_range() {
        assert_eq!(AlarmTime::new(100, 100, 100), Ok(AlarmTime::DISABLED));
        assert_eq!(AlarmTime::new(100, 0, 0), Err(TimeError::OutOfRange));
        assert_eq!(AlarmTime::new(13, 30, 0), Err(TimeError::OutOfRange));
        assert!(AlarmTime::new(7, 30, 0).is_ok());
    }

    #[test]
    fn shared_clock_snapshot_is_consistent() {
        let shared = SharedClock::new();
        shared.set_time(TimeOfDay::new(9, 41, 0).unwrap());
        shared.set_alarm(AlarmTime::new(9, 41, 1).unwrap());
        let (t, a) = shared.snapshot();
        assert_eq!(t, TimeOfDay::new(9, 41, 0).unwrap());
        assert_eq!(a, AlarmTime::new(9, 41, 1).unwrap());
        assert_eq!(shared.tick(), TickOutcome::AlarmMatched);
    }
}
