//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (the thermistor sensor, the servo, event sinks)
//! implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole surface runs under host tests with mocks.

use crate::error::SensorError;
use crate::sensors::thermistor::TemperatureReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain a calibrated
/// temperature. Each call is a fresh multisampled conversion — values are
/// never cached.
pub trait SensorPort {
    fn read_temperature(&mut self) -> Result<TemperatureReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain submits servo intents. Both calls are
/// idempotent — commanding the current position is a no-op.
pub trait ActuatorPort {
    /// Drive to the engaged end stop.
    fn activate(&mut self);

    /// Drive to the released end stop.
    fn deactivate(&mut self);

    /// Last commanded position.
    fn is_engaged(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, a future
/// push channel, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
