//! Alert indicator LED driver.
//!
//! Single digital output, active HIGH. On ESP-IDF it writes the GPIO via
//! the hw_init shim; on host targets it tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    on: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        hw_init::gpio_write(pins::ALERT_LED_GPIO, false);
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::ALERT_LED_GPIO, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_state() {
        let mut led = StatusLed::new();
        assert!(!led.is_on());
        led.set(true);
        assert!(led.is_on());
        led.set(false);
        assert!(!led.is_on());
    }
}
