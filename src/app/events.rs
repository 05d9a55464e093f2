//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, push to a client, etc.

use crate::clock::{AlarmTime, TimeOfDay};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// The time of day was replaced via the control surface.
    TimeSet(TimeOfDay),

    /// The alarm was replaced via the control surface.
    AlarmSet(AlarmTime),

    /// A clock tick matched the alarm and engaged the servo.
    AlarmFired(TimeOfDay),

    /// The servo was forced via the control surface.
    ActuatorForced(bool),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub time: TimeOfDay,
    pub alarm: AlarmTime,
    pub servo_engaged: bool,
    /// `None` when the conversion was undefined for the current reading.
    pub temperature_c: Option<f64>,
}
