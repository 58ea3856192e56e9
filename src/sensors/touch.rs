//! Capacitive touch-pad hub.
//!
//! Reads the four gesture channels through the charge-time counters.
//! On ESP-IDF the touch peripheral does the measurement; on host targets
//! the hub returns values injected by tests or the simulation loop.

use crate::app::ports::SensorPort;
use crate::sensors::CHANNEL_COUNT;

pub struct TouchPadHub {
    gpios: [i32; CHANNEL_COUNT],
    /// Host simulation: last injected raw magnitudes.
    #[cfg(not(target_os = "espidf"))]
    sim_readings: [u32; CHANNEL_COUNT],
}

impl TouchPadHub {
    pub fn new(gpios: [i32; CHANNEL_COUNT]) -> Self {
        Self {
            gpios,
            #[cfg(not(target_os = "espidf"))]
            sim_readings: [0; CHANNEL_COUNT],
        }
    }

    /// GPIO assignment for one channel (diagnostics).
    pub fn gpio(&self, channel: usize) -> Option<i32> {
        self.gpios.get(channel).copied()
    }

    /// Inject raw magnitudes for the next read (host simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn inject(&mut self, readings: [u32; CHANNEL_COUNT]) {
        self.sim_readings = readings;
    }

    #[cfg(target_os = "espidf")]
    fn platform_read(&mut self) -> [u32; CHANNEL_COUNT] {
        let mut out = [0u32; CHANNEL_COUNT];
        for (value, &gpio) in out.iter_mut().zip(&self.gpios) {
            *value = crate::drivers::hw_init::touch_read(gpio);
        }
        out
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_read(&mut self) -> [u32; CHANNEL_COUNT] {
        self.sim_readings
    }
}

impl SensorPort for TouchPadHub {
    fn read_channels(&mut self) -> [u32; CHANNEL_COUNT] {
        self.platform_read()
    }
}
