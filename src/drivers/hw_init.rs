//! One-shot hardware peripheral initialization and raw I/O shims.
//!
//! Configures GPIO directions, the touch-sense peripheral, and the LEDC
//! channel for the piezo using raw ESP-IDF sys calls. Called once from
//! `main()` before the event loop starts. Host targets get no-op shims so
//! the drivers above compile and test unchanged.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    TouchInitFailed(i32),
    LedcInitFailed,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::TouchInitFailed(rc) => write!(f, "touch peripheral init failed (rc={})", rc),
            Self::LedcInitFailed => write!(f, "LEDC timer/channel config failed"),
        }
    }
}

// ── Init ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the event loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_touch()?;
        init_piezo_ledc()?;
    }
    log::info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): no peripherals to configure");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ALERT_LED_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: cfg is a valid, fully initialised gpio_config_t.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_touch() -> Result<(), HwInitError> {
    // SAFETY: touch pad driver init before any touch_read call; main task only.
    unsafe {
        let ret = touch_pad_init();
        if ret != ESP_OK {
            return Err(HwInitError::TouchInitFailed(ret));
        }
        for &gpio in &pins::TOUCH_GPIOS {
            let ret = touch_pad_config(gpio as touch_pad_t);
            if ret != ESP_OK {
                return Err(HwInitError::TouchInitFailed(ret));
            }
        }
        let ret = touch_pad_fsm_start();
        if ret != ESP_OK {
            return Err(HwInitError::TouchInitFailed(ret));
        }
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_piezo_ledc() -> Result<(), HwInitError> {
    // SAFETY: LEDC timer + channel configured once before tone_start is used.
    unsafe {
        let timer_cfg = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            duty_resolution: pins::PIEZO_PWM_RESOLUTION_BITS,
            timer_num: ledc_timer_t_LEDC_TIMER_0,
            freq_hz: 1_000,
            clk_cfg: ledc_clk_cfg_t_LEDC_AUTO_CLK,
            deconfigure: false,
        };
        if ledc_timer_config(&timer_cfg) != ESP_OK {
            return Err(HwInitError::LedcInitFailed);
        }

        let channel_cfg = ledc_channel_config_t {
            gpio_num: pins::PIEZO_GPIO,
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_0,
            intr_type: ledc_intr_type_t_LEDC_INTR_DISABLE,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            duty: 0,
            hpoint: 0,
            ..core::mem::zeroed()
        };
        if ledc_channel_config(&channel_cfg) != ESP_OK {
            return Err(HwInitError::LedcInitFailed);
        }
    }
    Ok(())
}

// ── Raw I/O shims ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured as an output in init_gpio_outputs().
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

/// Raw charge-time magnitude for one touch channel (bigger = closer).
#[cfg(target_os = "espidf")]
pub fn touch_read(gpio: i32) -> u32 {
    let mut raw: u32 = 0;
    // SAFETY: channel was configured in init_touch().
    let ret = unsafe { touch_pad_read_raw_data(gpio as touch_pad_t, &mut raw) };
    if ret != ESP_OK {
        log::warn!("touch_read: channel {} failed (rc={})", gpio, ret);
        return 0;
    }
    raw
}

#[cfg(not(target_os = "espidf"))]
pub fn touch_read(_gpio: i32) -> u32 {
    0
}

/// Start emitting `freq_hz` on the piezo channel at 50% duty.
#[cfg(target_os = "espidf")]
pub fn tone_start(freq_hz: u16) {
    // SAFETY: LEDC channel 0 configured in init_piezo_ledc().
    unsafe {
        ledc_set_freq(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_timer_t_LEDC_TIMER_0,
            u32::from(freq_hz),
        );
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0, 128);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn tone_start(_freq_hz: u16) {}

/// Silence the piezo channel.
#[cfg(target_os = "espidf")]
pub fn tone_stop() {
    // SAFETY: LEDC channel 0 configured in init_piezo_ledc().
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0, 0);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn tone_stop() {}
