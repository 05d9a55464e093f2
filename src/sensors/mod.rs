//! Sensor subsystem.
//!
//! WakeBell carries a single analog sensor: the thermistor voltage divider
//! read through ADC1. The driver lives in [`thermistor`].

pub mod thermistor;

pub use thermistor::{CalibrationSource, DividerCalibration, TemperatureReading, ThermistorSensor};
