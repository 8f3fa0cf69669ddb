//! One-shot hardware peripheral initialization.
//!
//! Configures the vane ADC channel and the pulse-sensor GPIOs using raw
//! ESP-IDF sys calls, then installs the per-pin ISR service.  Called once
//! from `main()` before the event loop starts.  The DHT11 and HC-SR04
//! pins are owned by `esp-idf-hal` pin drivers instead.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => {
                write!(f, "GPIO ISR service install failed (rc={})", rc)
            }
            Self::IsrHandlerFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        let what = match e {
            HwInitError::AdcInitFailed(_) => "ADC1",
            HwInitError::GpioConfigFailed(_) => "GPIO",
            HwInitError::IsrInstallFailed(_) | HwInitError::IsrHandlerFailed(_) => "GPIO ISR",
        };
        Self::Init(what)
    }
}

/// ADC1 channel wired to the wind vane (GPIO 36).
pub const ADC1_CH_VANE: u32 = 0;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_adc()?;
        init_pulse_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation: full 0-3.3 V span of the vane ladder.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_VANE, &chan_cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 configured (CH{}=wind vane, GPIO {})",
        ADC1_CH_VANE,
        pins::WIND_DIRECTION_ADC_GPIO
    );
    Ok(())
}

/// One 12-bit conversion; 0 if the driver reports an error.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK {
        return 0;
    }
    raw.clamp(0, 4095) as u16
}

// ── Pulse inputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_pulse_inputs() -> Result<(), HwInitError> {
    for pin in [pins::WIND_SPEED_GPIO, pins::RAIN_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }
    info!(
        "hw_init: pulse inputs configured (wind GPIO {}, rain GPIO {}, pull-up)",
        pins::WIND_SPEED_GPIO,
        pins::RAIN_GPIO
    );
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::sensors::pulse::{rain_isr_handler, wind_isr_handler};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn wind_gpio_isr(_arg: *mut core::ffi::c_void) {
    wind_isr_handler();
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn rain_gpio_isr(_arg: *mut core::ffi::c_void) {
    rain_isr_handler();
}

#[cfg(target_os = "espidf")]
unsafe fn attach_isr(
    pin: i32,
    edge: gpio_int_type_t,
    handler: unsafe extern "C" fn(*mut core::ffi::c_void),
) -> Result<(), HwInitError> {
    let ret = unsafe { gpio_set_intr_type(pin, edge) };
    if ret != ESP_OK {
        return Err(HwInitError::IsrHandlerFailed(ret));
    }
    let ret = unsafe { gpio_isr_handler_add(pin, Some(handler), core::ptr::null_mut()) };
    if ret != ESP_OK {
        return Err(HwInitError::IsrHandlerFailed(ret));
    }
    let ret = unsafe { gpio_intr_enable(pin) };
    if ret != ESP_OK {
        return Err(HwInitError::IsrHandlerFailed(ret));
    }
    Ok(())
}

/// Install the per-pin GPIO ISR service and register the pulse handlers.
/// Call after init_peripherals() and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service was already installed
    // (acceptable).  The handlers only increment atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        // Anemometer: rising edge
        attach_isr(
            pins::WIND_SPEED_GPIO,
            gpio_int_type_t_GPIO_INTR_POSEDGE,
            wind_gpio_isr,
        )?;

        // Rain gauge: falling edge
        attach_isr(
            pins::RAIN_GPIO,
            gpio_int_type_t_GPIO_INTR_NEGEDGE,
            rain_gpio_isr,
        )?;
    }
    info!("hw_init: ISR service installed (wind rising, rain falling)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
