//! Application service — the hexagonal core of the control surface.
//!
//! [`AppService`] owns a handle to the shared clock and maps the four
//! control-surface operations onto it and onto the actuator/sensor ports
//! injected at call sites, making the whole surface testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │
//! ActuatorPort ◀──│  SharedClock operations │
//!                 └────────────────────────┘
//! ```
//!
//! The clock tick itself does not pass through here — the timer callback
//! drives [`SharedClock::tick`] directly (see `drivers::hw_timer`); this
//! service is the request-side counterpart.

use log::info;

use crate::clock::{AlarmTime, SharedClock, TimeOfDay};
use crate::error::{Error, Result};
use crate::sensors::thermistor::TemperatureReading;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates the control-surface operations.
pub struct AppService<'c> {
    clock: &'c SharedClock,
    command_count: u64,
}

impl<'c> AppService<'c> {
    pub fn new(clock: &'c SharedClock) -> Self {
        Self {
            clock,
            command_count: 0,
        }
    }

    /// Announce the service on the sink.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!("AppService started");
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from an HTTP handler or a test).
    /// A rejected command leaves all state unchanged.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.command_count += 1;
        match cmd {
            AppCommand::SetTime {
                hours,
                minutes,
                seconds,
            } => self.set_time(hours, minutes, seconds, sink),
            AppCommand::SetAlarm {
                hours,
                minutes,
                seconds,
            } => self.set_alarm(hours, minutes, seconds, hw, sink),
            AppCommand::ForceActuator(on) => {
                self.force_actuator(on, hw, sink);
                Ok(())
            }
        }
    }

    /// Replace the current time. Validation happens before any mutation.
    pub fn set_time(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let t = TimeOfDay::new(hours, minutes, seconds).map_err(Error::Time)?;
        self.clock.set_time(t);
        sink.emit(&AppEvent::TimeSet(t));
        Ok(())
    }

    /// Replace the alarm. A successful set also engages the servo — the
    /// surface has always behaved this way and callers rely on it as an
    /// immediate function check (see the pinned integration test).
    pub fn set_alarm(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let a = AlarmTime::new(hours, minutes, seconds).map_err(Error::Time)?;
        self.clock.set_alarm(a);
        hw.activate();
        sink.emit(&AppEvent::AlarmSet(a));
        Ok(())
    }

    /// Direct servo override. Always succeeds; bypasses alarm logic.
    pub fn force_actuator(
        &mut self,
        on: bool,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        if on {
            hw.activate();
        } else {
            hw.deactivate();
        }
        sink.emit(&AppEvent::ActuatorForced(on));
    }

    /// Fresh multisampled temperature conversion.
    pub fn read_temperature(&self, hw: &mut impl SensorPort) -> Result<TemperatureReading> {
        hw.read_temperature().map_err(Error::Sensor)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Consistent `{time, alarm}` view.
    pub fn clock_snapshot(&self) -> (TimeOfDay, AlarmTime) {
        self.clock.snapshot()
    }

    pub fn current_time(&self) -> TimeOfDay {
        self.clock.snapshot().0
    }

    /// Total control-surface commands processed since startup.
    pub fn command_count(&self) -> u64 {
        self.command_count
    }

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self, hw: &mut (impl SensorPort + ActuatorPort)) -> TelemetryData {
        let (time, alarm) = self.clock.snapshot();
        let temperature_c = hw.read_temperature().ok().map(|r| r.celsius);
        TelemetryData {
            time,
            alarm,
            servo_engaged: hw.is_engaged(),
            temperature_c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimeError;

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    struct FlagActuator {
        engaged: bool,
    }
    impl ActuatorPort for FlagActuator {
        fn activate(&mut self) {
            self.engaged = true;
        }
        fn deactivate(&mut self) {
            self.engaged = false;
        }
        fn is_engaged(&self) -> bool {
            self.engaged
        }
    }

    #[test]
    fn set_time_round_trips_through_snapshot() {
        let clock = SharedClock::new();
        let mut app = AppService::new(&clock);
        let mut sink = NullSink;
        app.set_time(9, 41, 7, &mut sink).unwrap();
        assert_eq!(app.current_time(), TimeOfDay::new(9, 41, 7).unwrap());
    }

    #[test]
    fn rejected_set_time_leaves_state_unchanged() {
        let clock = SharedClock::new();
        let mut app = AppService::new(&clock);
        let mut sink = NullSink;
        app.set_time(8, 0, 0, &mut sink).unwrap();
        let err = app.set_time(25, 0, 0, &mut sink).unwrap_err();
        assert_eq!(err, Error::Time(TimeError::OutOfRange));
        assert_eq!(app.current_time(), TimeOfDay::new(8, 0, 0).unwrap());
    }

    #[test]
    fn rejected_set_alarm_does_not_engage_servo() {
        let clock = SharedClock::new();
        let mut app = AppService::new(&clock);
        let mut sink = NullSink;
        let mut hw = FlagActuator { engaged: false };
        assert!(app.set_alarm(13, 0, 0, &mut hw, &mut sink).is_err());
        assert!(!hw.is_engaged());
        assert!(app.clock_snapshot().1.is_disabled());
    }
}
