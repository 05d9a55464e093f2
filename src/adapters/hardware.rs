//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the thermistor sensor and the servo facade, exposing them through
//! [`SensorPort`] and [`ActuatorPort`]. This is the only module in the
//! request path that touches actual hardware. On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::servo::ServoDriver;
use crate::error::SensorError;
use crate::sensors::thermistor::{TemperatureReading, ThermistorSensor};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    thermistor: ThermistorSensor,
    servo: ServoDriver,
}

impl HardwareAdapter {
    pub fn new(thermistor: ThermistorSensor, servo: ServoDriver) -> Self {
        Self { thermistor, servo }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_temperature(&mut self) -> Result<TemperatureReading, SensorError> {
        self.thermistor.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn activate(&mut self) {
        self.servo.activate();
    }

    fn deactivate(&mut self) {
        self.servo.deactivate();
    }

    fn is_engaged(&self) -> bool {
        self.servo.is_engaged()
    }
}
