//! One-shot hardware peripheral initialization.
//!
//! Configures the thermistor ADC channel (with its calibration
//! characterization) and the servo LEDC timer/channel using raw ESP-IDF
//! sys calls. Called once from `main()` before the timers start.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::sensors::thermistor::CalibrationSource;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    AdcCalibrationFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::AdcCalibrationFailed(rc) => write!(f, "ADC calibration failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals(default_vref_mv: u16) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the timers start; single-threaded.
    unsafe {
        init_adc(default_vref_mv)?;
        init_servo_pwm()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_default_vref_mv: u16) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot + line-fitting calibration) ──────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut ADC1_CALI_HANDLE: adc_cali_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut ADC1_CALI_SOURCE: CalibrationSource = CalibrationSource::DefaultVref;

/// SAFETY: Written once in `init_adc()` before the sensor read path runs;
/// afterwards read-only.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

/// SAFETY: Same invariants as `adc1_handle()`.
#[cfg(target_os = "espidf")]
unsafe fn adc1_cali_handle() -> adc_cali_handle_t {
    unsafe { ADC1_CALI_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(default_vref_mv: u16) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::THERMISTOR_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // Resolve the characterization source once: two-point if burned into
    // eFuse, then eFuse Vref, then the configured default Vref.
    let mut efuse_val: adc_cali_line_fitting_efuse_val_t =
        adc_cali_line_fitting_efuse_val_t_ADC_CALI_LINE_FITTING_EFUSE_VAL_DEFAULT_VREF;
    // SAFETY: pure eFuse read, no shared state.
    unsafe {
        adc_cali_scheme_line_fitting_check_efuse(&mut efuse_val);
    }
    let source = match efuse_val {
        v if v == adc_cali_line_fitting_efuse_val_t_ADC_CALI_LINE_FITTING_EFUSE_VAL_EFUSE_TP => {
            CalibrationSource::TwoPoint
        }
        v if v == adc_cali_line_fitting_efuse_val_t_ADC_CALI_LINE_FITTING_EFUSE_VAL_EFUSE_VREF => {
            CalibrationSource::EfuseVref
        }
        _ => CalibrationSource::DefaultVref,
    };

    let cali_cfg = adc_cali_line_fitting_config_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        default_vref: u32::from(default_vref_mv),
    };
    // SAFETY: ADC1_CALI_HANDLE / ADC1_CALI_SOURCE are only written here,
    // once at boot, before any read.
    let ret = unsafe { adc_cali_create_scheme_line_fitting(&cali_cfg, &raw mut ADC1_CALI_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcCalibrationFailed(ret));
    }
    unsafe {
        ADC1_CALI_SOURCE = source;
    }

    info!(
        "hw_init: ADC1 configured (CH{}=thermistor, cal={:?})",
        pins::THERMISTOR_ADC_CHANNEL,
        source
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc_read_raw() -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE is written once during init_adc() before this is
    // called; the read itself is re-entrant per ESP-IDF.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), pins::THERMISTOR_ADC_CHANNEL, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc_read_raw() -> u16 {
    0
}

/// Convert a raw 12-bit sample to millivolts through the characterization
/// resolved at init.
#[cfg(target_os = "espidf")]
pub fn adc_raw_to_millivolts(raw: u16) -> u32 {
    let mut mv: i32 = 0;
    // SAFETY: ADC1_CALI_HANDLE written once in init_adc(); read-only here.
    let ret = unsafe { adc_cali_raw_to_voltage(adc1_cali_handle(), i32::from(raw), &mut mv) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    mv.max(0) as u32
}

/// Host approximation: ideal linear transfer across the attenuated span.
#[cfg(not(target_os = "espidf"))]
pub fn adc_raw_to_millivolts(raw: u16) -> u32 {
    const SIM_FULL_SCALE_MV: u32 = 3300;
    const ADC_MAX: u32 = 4095;
    u32::from(raw.min(4095)) * SIM_FULL_SCALE_MV / ADC_MAX
}

#[cfg(target_os = "espidf")]
pub fn adc_calibration_source() -> CalibrationSource {
    // SAFETY: written once in init_adc() before any sensor is constructed.
    unsafe { ADC1_CALI_SOURCE }
}

#[cfg(not(target_os = "espidf"))]
pub fn adc_calibration_source() -> CalibrationSource {
    CalibrationSource::DefaultVref
}

// ── LEDC servo PWM ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_servo_pwm() -> Result<(), HwInitError> {
    // Timer 0: servo carrier (50 Hz, 14-bit).
    // SAFETY: called from the single main-task context via init_peripherals().
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: pins::SERVO_PWM_RESOLUTION_BITS,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    // Channel 0: servo signal line, parked at the released pulse width.
    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_0,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::SERVO_PWM_GPIO,
            duty: pulse_us_to_duty(pins::SERVO_RELEASED_PULSE_US),
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!(
        "hw_init: LEDC configured (servo=CH0, {}Hz, {}-bit)",
        pins::SERVO_PWM_FREQ_HZ,
        pins::SERVO_PWM_RESOLUTION_BITS
    );
    Ok(())
}

/// Map a pulse width in µs onto the LEDC duty range for the servo frame.
pub fn pulse_us_to_duty(pulse_us: u16) -> u32 {
    let frame_us = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
    let steps = 1u32 << pins::SERVO_PWM_RESOLUTION_BITS;
    u32::from(pulse_us) * steps / frame_us
}

pub const LEDC_CH_SERVO: u32 = 0;

#[cfg(target_os = "espidf")]
pub fn servo_set_pulse_us(pulse_us: u16) {
    // SAFETY: the LEDC channel was configured in init_servo_pwm(); the duty
    // register write sequence is what ESP-IDF prescribes for live updates.
    unsafe {
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            LEDC_CH_SERVO,
            pulse_us_to_duty(pulse_us),
        );
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, LEDC_CH_SERVO);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn servo_set_pulse_us(_pulse_us: u16) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins;

    #[test]
    fn pulse_to_duty_spans_the_servo_range() {
        // 20 ms frame, 14-bit: ~1.22 µs per step.
        let released = pulse_us_to_duty(pins::SERVO_RELEASED_PULSE_US);
        let engaged = pulse_us_to_duty(pins::SERVO_ENGAGED_PULSE_US);
        assert_eq!(released, 409); // 500 µs / 20 ms * 16384
        assert_eq!(engaged, 1966); // 2400 µs / 20 ms * 16384
        assert!(engaged > released);
        assert!(engaged < (1 << pins::SERVO_PWM_RESOLUTION_BITS));
    }
}
