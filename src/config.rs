//! System configuration parameters
//!
//! All tunable parameters for the WakeBell system. Calibration values are
//! compiled-in defaults; WiFi credentials come from the build environment.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Thermistor divider ---
    /// Fixed reference resistance R1 of the voltage divider (kΩ)
    pub divider_r1_kohm: f64,
    /// Divider supply voltage VCC (volts)
    pub divider_supply_v: f64,

    // --- Thermistor exponential fit: R(T) = e^(a − b·T) + r_offset ---
    /// Fit constant `a`
    pub fit_a: f64,
    /// Fit slope `b` (per °C)
    pub fit_b_per_c: f64,
    /// Fit resistance offset (kΩ); the logarithm is undefined at or below it
    pub fit_r_offset_kohm: f64,

    // --- ADC sampling ---
    /// Samples averaged per temperature reading (multisampling window)
    pub adc_sample_count: u16,
    /// Fallback reference voltage (mV) when no eFuse calibration is burned
    pub default_vref_mv: u16,

    // --- Timing ---
    /// Clock tick period (milliseconds)
    pub clock_tick_period_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Network ---
    /// HTTP control-surface port
    pub http_port: u16,
    /// WiFi station SSID
    pub wifi_ssid: heapless::String<32>,
    /// WiFi station password
    pub wifi_password: heapless::String<64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Divider
            divider_r1_kohm: 9.1,
            divider_supply_v: 5.0,

            // Exponential fit
            fit_a: 3.25,
            fit_b_per_c: 0.053,
            fit_r_offset_kohm: 2.8,

            // Sampling
            adc_sample_count: 64,
            default_vref_mv: 1125,

            // Timing
            clock_tick_period_ms: 1000, // 1 Hz
            telemetry_interval_secs: 60, // 1/min

            // Network
            http_port: 80,
            wifi_ssid: heapless::String::try_from(option_env!("WAKEBELL_WIFI_SSID").unwrap_or(""))
                .unwrap_or_default(),
            wifi_password: heapless::String::try_from(
                option_env!("WAKEBELL_WIFI_PASS").unwrap_or(""),
            )
            .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.divider_r1_kohm > 0.0);
        assert!(c.divider_supply_v > 0.0);
        assert!(c.fit_b_per_c > 0.0);
        assert!(c.fit_r_offset_kohm > 0.0);
        assert!(c.adc_sample_count > 0);
        assert!(c.clock_tick_period_ms > 0);
        assert!(c.telemetry_interval_secs > 0);
        assert!(c.http_port > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.divider_r1_kohm - c2.divider_r1_kohm).abs() < 1e-9);
        assert!((c.fit_b_per_c - c2.fit_b_per_c).abs() < 1e-9);
        assert_eq!(c.adc_sample_count, c2.adc_sample_count);
        assert_eq!(c.http_port, c2.http_port);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.clock_tick_period_ms <= c.telemetry_interval_secs * 1000,
            "telemetry must not outpace the clock tick"
        );
    }
}
