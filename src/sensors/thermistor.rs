//! Thermistor voltage-divider temperature sensor.
//!
//! The thermistor forms the high side of a divider against a fixed
//! reference resistance R1; the tap voltage is read through the ESP32 ADC
//! (12-bit, 64-sample multisampled) and converted to °C by inverting an
//! exponential resistance fit `R(T) = e^(a − b·T) + r_offset`.
//!
//! Raw samples become millivolts through the converter's calibration
//! characterization (two-point, eFuse-Vref, or default-Vref — resolved
//! once at init, see [`CalibrationSource`]). Everything from the averaged
//! raw sample onward is pure computation; readings are recomputed per
//! query and never cached.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the ADC via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use crate::config::SystemConfig;
use crate::drivers::hw_init;
use crate::error::SensorError;

static SIM_THERM_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_thermistor_adc(raw: u16) {
    SIM_THERM_ADC.store(raw, Ordering::Relaxed);
}

/// Which correction curve the converter was characterized with, in
/// preference order. Queried from the hardware once at init and fixed for
/// the life of the sensor — never re-evaluated per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationSource {
    /// Two-point calibration burned into eFuse.
    TwoPoint,
    /// Reference voltage burned into eFuse.
    EfuseVref,
    /// No eFuse data — characterized with the configured default Vref.
    DefaultVref,
}

/// Divider and fit constants, lifted from [`SystemConfig`] so the
/// conversion carries no magic numbers.
#[derive(Debug, Clone, Copy)]
pub struct DividerCalibration {
    pub r1_kohm: f64,
    pub supply_v: f64,
    pub fit_a: f64,
    pub fit_b_per_c: f64,
    pub fit_r_offset_kohm: f64,
}

impl DividerCalibration {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            r1_kohm: config.divider_r1_kohm,
            supply_v: config.divider_supply_v,
            fit_a: config.fit_a,
            fit_b_per_c: config.fit_b_per_c,
            fit_r_offset_kohm: config.fit_r_offset_kohm,
        }
    }
}

/// One calibrated reading. `celsius` is derived from `raw_avg` per query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub raw_avg: u16,
    pub millivolts: u32,
    pub celsius: f64,
}

pub struct ThermistorSensor {
    cal: DividerCalibration,
    source: CalibrationSource,
    sample_count: u16,
    _adc_gpio: i32,
}

impl ThermistorSensor {
    pub fn new(adc_gpio: i32, cal: DividerCalibration, sample_count: u16) -> Self {
        Self {
            cal,
            source: hw_init::adc_calibration_source(),
            sample_count: sample_count.max(1),
            _adc_gpio: adc_gpio,
        }
    }

    /// The characterization resolved at init.
    pub fn calibration_source(&self) -> CalibrationSource {
        self.source
    }

    /// Multisample, average, and convert to a calibrated temperature.
    pub fn read(&self) -> Result<TemperatureReading, SensorError> {
        let mut sum: u32 = 0;
        for _ in 0..self.sample_count {
            sum += u32::from(self.read_adc());
        }
        // Integer division; the sub-LSB truncation is accepted error.
        let raw_avg = (sum / u32::from(self.sample_count)) as u16;
        let millivolts = hw_init::adc_raw_to_millivolts(raw_avg);
        let celsius = divider_celsius(&self.cal, millivolts)?;
        Ok(TemperatureReading {
            raw_avg,
            millivolts,
            celsius,
        })
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc_read_raw()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_THERM_ADC.load(Ordering::Relaxed)
    }
}

/// Pure conversion: divider tap millivolts → °C.
///
/// `Rt = ((Vcc / Vr) − 1) · R1`, then `T = (ln(Rt − r_offset) − a) / −b`.
/// A zero tap voltage or a resistance at/below the fit offset leaves the
/// logarithm undefined; that is reported as [`SensorError::RangeUndefined`]
/// instead of letting NaN or infinity escape.
pub fn divider_celsius(cal: &DividerCalibration, millivolts: u32) -> Result<f64, SensorError> {
    let vr = f64::from(millivolts) / 1000.0;
    if vr <= 0.0 {
        return Err(SensorError::RangeUndefined);
    }

    let rt = ((cal.supply_v / vr) - 1.0) * cal.r1_kohm;
    let above_offset = rt - cal.fit_r_offset_kohm;
    if above_offset <= 0.0 {
        return Err(SensorError::RangeUndefined);
    }

    Ok((above_offset.ln() - cal.fit_a) / -cal.fit_b_per_c)
}
