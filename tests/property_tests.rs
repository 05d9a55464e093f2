//! Property tests for the clock arithmetic, input validation, and the
//! conversion pipeline.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets. On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;
use wakebell::clock::{AlarmTime, ClockCore, TimeOfDay};
use wakebell::config::SystemConfig;
use wakebell::error::TimeError;
use wakebell::sensors::thermistor::{DividerCalibration, divider_celsius};
use wakebell::server::{parse_servo_body, parse_time_body};

fn valid_triple() -> impl Strategy<Value = (u8, u8, u8)> {
    (0u8..=12, 0u8..=59, 0u8..=59)
}

proptest! {
    /// Every valid triple survives a set/observe round trip exactly.
    #[test]
    fn set_time_round_trips((h, m, s) in valid_triple()) {
        let mut clock = ClockCore::new();
        let t = TimeOfDay::new(h, m, s).unwrap();
        clock.set_time(t);
        prop_assert_eq!(clock.time(), t);
    }

    /// No tick sequence can push a field out of range, and hour 13 is
    /// never observable.
    #[test]
    fn ticks_preserve_field_ranges(
        (h, m, s) in valid_triple(),
        ticks in 0usize..=10_000,
    ) {
        let mut clock = ClockCore::new();
        clock.set_time(TimeOfDay::new(h, m, s).unwrap());
        for _ in 0..ticks {
            clock.tick();
            let t = clock.time();
            prop_assert!(t.hours() <= 12);
            prop_assert!(t.minutes() <= 59);
            prop_assert!(t.seconds() <= 59);
        }
    }

    /// An out-of-range field is always rejected and never mutates state.
    #[test]
    fn out_of_range_triples_rejected(
        h in 13u8..,
        m in 0u8..=59,
        s in 0u8..=59,
    ) {
        prop_assert_eq!(TimeOfDay::new(h, m, s), Err(TimeError::OutOfRange));
    }

    /// A disarmed alarm never matches, whatever the clock does.
    #[test]
    fn disabled_alarm_never_fires(
        (h, m, s) in valid_triple(),
        ticks in 1usize..=5_000,
    ) {
        let mut clock = ClockCore::new();
        clock.set_time(TimeOfDay::new(h, m, s).unwrap());
        clock.set_alarm(AlarmTime::DISABLED);
        for _ in 0..ticks {
            prop_assert_eq!(clock.tick(), wakebell::clock::TickOutcome::Advanced);
        }
    }

    /// The body parsers must never panic, whatever bytes arrive.
    #[test]
    fn parsers_never_panic(body in ".*") {
        let _ = parse_time_body(&body);
        let _ = parse_servo_body(&body);
    }

    /// A well-formed body round-trips into the same fields.
    #[test]
    fn time_body_round_trips(h in 0u8.., m in 0u8.., s in 0u8..) {
        let body = format!("{} {} {}", h, m, s);
        prop_assert_eq!(parse_time_body(&body), Ok((h, m, s)));
    }

    /// The conversion either yields a finite temperature or a typed
    /// error — NaN and infinity can never escape.
    #[test]
    fn conversion_never_yields_nan(mv in 0u32..=6_000) {
        let cal = DividerCalibration::from_config(&SystemConfig::default());
        match divider_celsius(&cal, mv) {
            Ok(c) => prop_assert!(c.is_finite()),
            Err(_) => {}
        }
    }
}
