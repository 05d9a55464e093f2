//! Integration tests: AppService → clock → servo intents.

use wakebell::app::commands::AppCommand;
use wakebell::app::events::AppEvent;
use wakebell::app::ports::{ActuatorPort, EventSink, SensorPort};
use wakebell::app::service::AppService;
use wakebell::clock::{SharedClock, TickOutcome, TimeOfDay};
use wakebell::error::{Error, SensorError, TimeError};
use wakebell::sensors::thermistor::TemperatureReading;
use wakebell::server::parse_time_body;

// ── Mock implementations ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServoCall {
    Activate,
    Deactivate,
}

struct MockHw {
    calls: Vec<ServoCall>,
    engaged: bool,
    temp: Result<TemperatureReading, SensorError>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            engaged: false,
            temp: Ok(TemperatureReading {
                raw_avg: 2048,
                millivolts: 1650,
                celsius: 21.5,
            }),
        }
    }
}

impl ActuatorPort for MockHw {
    fn activate(&mut self) {
        self.engaged = true;
        self.calls.push(ServoCall::Activate);
    }
    fn deactivate(&mut self) {
        self.engaged = false;
        self.calls.push(ServoCall::Deactivate);
    }
    fn is_engaged(&self) -> bool {
        self.engaged
    }
}

impl SensorPort for MockHw {
    fn read_temperature(&mut self) -> Result<TemperatureReading, SensorError> {
        self.temp
    }
}

struct RecordingSink {
    events: Vec<String>,
}

impl RecordingSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, e: &AppEvent) {
        self.events.push(format!("{:?}", e));
    }
}

fn make_app(clock: &SharedClock) -> (AppService<'_>, MockHw, RecordingSink) {
    let mut app = AppService::new(clock);
    let hw = MockHw::new();
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, hw, sink)
}

// ── SetTime round trip ────────────────────────────────────────

#[test]
fn set_time_round_trips_for_valid_triple() {
    let clock = SharedClock::new();
    let (mut app, mut hw, mut sink) = make_app(&clock);
    app.handle_command(
        AppCommand::SetTime {
            hours: 11,
            minutes: 58,
            seconds: 3,
        },
        &mut hw,
        &mut sink,
    )
    .unwrap();
    assert_eq!(app.current_time(), TimeOfDay::new(11, 58, 3).unwrap());
}

// ── Malformed / out-of-range SetTime leaves state unchanged ───

#[test]
fn rejected_set_time_keeps_previous_time() {
    let clock = SharedClock::new();
    let (mut app, _hw, mut sink) = make_app(&clock);
    app.set_time(8, 15, 0, &mut sink).unwrap();

    // "25 0 0" parses (fields are numeric) but fails range validation.
    let (h, m, s) = parse_time_body("25 0 0").unwrap();
    let err = app.set_time(h, m, s, &mut sink).unwrap_err();
    assert_eq!(err, Error::Time(TimeError::OutOfRange));

    // "7 thirty 0" never reaches the service.
    assert_eq!(parse_time_body("7 thirty 0"), Err(TimeError::Malformed));

    assert_eq!(app.current_time(), TimeOfDay::new(8, 15, 0).unwrap());
}

// ── SetAlarm engages the servo as a side effect ───────────────

#[test]
fn set_alarm_engages_servo_immediately() {
    let clock = SharedClock::new();
    let (mut app, mut hw, mut sink) = make_app(&clock);
    assert!(!hw.is_engaged());

    // No tick needed: the set call itself engages the servo.
    app.set_alarm(7, 30, 0, &mut hw, &mut sink).unwrap();
    assert!(hw.is_engaged(), "SetAlarm must engage the servo on its own");
    assert_eq!(hw.calls, vec![ServoCall::Activate]);
    assert!(
        sink.events.iter().any(|e| e.contains("AlarmSet")),
        "AlarmSet event must reach the sink"
    );
}

#[test]
fn tick_past_alarm_does_not_release_servo() {
    let clock = SharedClock::new();
    let (mut app, mut hw, mut sink) = make_app(&clock);
    app.set_time(7, 30, 0, &mut sink).unwrap();
    app.set_alarm(7, 30, 0, &mut hw, &mut sink).unwrap();
    assert!(hw.is_engaged());

    // Advancing away from the alarm reports no match — and nothing ever
    // commands a release except the explicit force operation.
    assert_eq!(clock.tick(), TickOutcome::Advanced);
    assert!(hw.is_engaged());
    assert!(!hw.calls.contains(&ServoCall::Deactivate));
}

// ── ForceActuator idempotence ─────────────────────────────────

#[test]
fn force_actuator_sequence_is_idempotent_and_infallible() {
    let clock = SharedClock::new();
    let (mut app, mut hw, mut sink) = make_app(&clock);

    app.handle_command(AppCommand::ForceActuator(false), &mut hw, &mut sink)
        .unwrap();
    app.handle_command(AppCommand::ForceActuator(true), &mut hw, &mut sink)
        .unwrap();
    app.handle_command(AppCommand::ForceActuator(true), &mut hw, &mut sink)
        .unwrap();
    assert!(hw.is_engaged());
}

// ── Temperature error propagation ─────────────────────────────

#[test]
fn undefined_conversion_surfaces_as_sensor_error() {
    let clock = SharedClock::new();
    let (app, mut hw, _sink) = make_app(&clock);
    hw.temp = Err(SensorError::RangeUndefined);
    let err = app.read_temperature(&mut hw).unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::RangeUndefined));
}

// ── Telemetry snapshot ────────────────────────────────────────

#[test]
fn telemetry_reflects_clock_servo_and_sensor() {
    let clock = SharedClock::new();
    let (mut app, mut hw, mut sink) = make_app(&clock);
    app.set_time(9, 41, 0, &mut sink).unwrap();
    app.set_alarm(9, 45, 0, &mut hw, &mut sink).unwrap();

    let t = app.build_telemetry(&mut hw);
    assert_eq!(t.time, TimeOfDay::new(9, 41, 0).unwrap());
    assert!(!t.alarm.is_disabled());
    assert!(t.servo_engaged);
    assert_eq!(t.temperature_c, Some(21.5));

    hw.temp = Err(SensorError::AdcReadFailed);
    let t = app.build_telemetry(&mut hw);
    assert_eq!(t.temperature_c, None, "failed read must not fake a value");
}

// ── Tick path commits the engage before returning ─────────────
//
// Uses the process-global servo facade and event queue; this is the only
// test in this binary that touches them.

#[test]
fn alarm_match_commits_servo_engage_and_queues_event() {
    use wakebell::drivers::hw_timer;
    use wakebell::drivers::servo::ServoDriver;
    use wakebell::events::{self, Event};

    let clock = SharedClock::new();
    clock.set_time(TimeOfDay::new(6, 29, 59).unwrap());
    clock.set_alarm(wakebell::clock::AlarmTime::new(6, 30, 0).unwrap());

    let probe = ServoDriver::new();
    events::drain_events(|_| {});

    hw_timer::run_tick(&clock);

    // By the time run_tick returned, the engage was committed and the
    // fired event queued.
    assert!(probe.is_engaged());
    assert_eq!(events::pop_event(), Some(Event::AlarmFired));
    assert_eq!(events::pop_event(), None);
}
