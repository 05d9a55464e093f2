//! GPIO / peripheral pin assignments for the WakeBell main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Thermistor voltage divider — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Thermistor divider tap — GPIO 34 on the ESP32 (input-only pin).
pub const THERMISTOR_ADC_GPIO: i32 = 34;
/// ADC1 channel for GPIO 34.
pub const THERMISTOR_ADC_CHANNEL: u32 = 6;
/// ADC attenuation for the divider tap (11 dB → full 0 – 3.1 V span).
pub const THERMISTOR_ADC_ATTEN: u32 = 3; // esp_idf_hal::adc::attenuation::DB_11

// ---------------------------------------------------------------------------
// Alarm servo (standard hobby servo on LEDC PWM)
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the servo signal line.
pub const SERVO_PWM_GPIO: i32 = 33;
/// Servo carrier frequency (20 ms frame, standard hobby-servo timing).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution. 14-bit gives 16384 steps across the 20 ms frame,
/// i.e. ~1.2 µs per step — fine enough for the 500–2400 µs pulse range.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;

/// Pulse width commanding the released (disengaged) end stop.
pub const SERVO_RELEASED_PULSE_US: u16 = 500;
/// Pulse width commanding the engaged end stop.
pub const SERVO_ENGAGED_PULSE_US: u16 = 2400;
