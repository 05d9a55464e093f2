//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future push-channel adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match t.temperature_c {
                Some(c) => info!(
                    "TELEM | {} | alarm={} | servo={} | T={:.1}\u{00b0}C",
                    t.time,
                    t.alarm,
                    if t.servo_engaged { "ENGAGED" } else { "released" },
                    c,
                ),
                None => info!(
                    "TELEM | {} | alarm={} | servo={} | T=unavailable",
                    t.time,
                    t.alarm,
                    if t.servo_engaged { "ENGAGED" } else { "released" },
                ),
            },
            AppEvent::TimeSet(t) => {
                info!("TIME  | set to {}", t);
            }
            AppEvent::AlarmSet(a) => {
                info!("ALARM | set to {}", a);
            }
            AppEvent::AlarmFired(t) => {
                info!("ALARM | fired at {}", t);
            }
            AppEvent::ActuatorForced(on) => {
                info!("SERVO | forced {}", if *on { "on" } else { "off" });
            }
            AppEvent::Started => {
                info!("START | control surface up");
            }
        }
    }
}
