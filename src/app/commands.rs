//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (HTTP handlers,
//! tests) that the [`AppService`](super::service::AppService) interprets
//! and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Replace the current time of day.
    SetTime { hours: u8, minutes: u8, seconds: u8 },

    /// Replace the alarm. A successful set also engages the servo.
    SetAlarm { hours: u8, minutes: u8, seconds: u8 },

    /// Direct servo override, bypassing the alarm logic entirely.
    ForceActuator(bool),
}
