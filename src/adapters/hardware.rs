//! Combined hardware adapter.
//!
//! Bundles the touch hub, indicator LED, and tone sequencer into one value
//! that satisfies both [`SensorPort`] and [`AlertOutputPort`] — the
//! [`AppService`](crate::app::service::AppService) takes it as a single
//! `impl SensorPort + AlertOutputPort` to avoid a double mutable borrow
//! while keeping the port boundary explicit.

use crate::app::ports::{AlertOutputPort, SensorPort};
use crate::drivers::hw_init;
use crate::drivers::status_led::StatusLed;
use crate::drivers::tone::{ToneSequencer, ToneStep, ALERT_SEQUENCE};
use crate::sensors::touch::TouchPadHub;
use crate::sensors::CHANNEL_COUNT;

pub struct HardwareAdapter {
    touch: TouchPadHub,
    led: StatusLed,
    tone: ToneSequencer,
}

impl HardwareAdapter {
    pub fn new(touch: TouchPadHub, led: StatusLed) -> Self {
        Self {
            touch,
            led,
            tone: ToneSequencer::new(),
        }
    }

    /// Step the tone sequencer one sequencing tick and drive the piezo.
    /// Called from the main loop on every [`Event::SequenceTick`].
    ///
    /// [`Event::SequenceTick`]: crate::events::Event::SequenceTick
    pub fn service_tone_tick(&mut self, tick_ms: u32) {
        match self.tone.advance(tick_ms) {
            ToneStep::Play(note) => hw_init::tone_start(note.freq_hz),
            ToneStep::Silence => hw_init::tone_stop(),
            ToneStep::Sustain | ToneStep::Idle => {}
        }
    }

    pub fn indicator_is_on(&self) -> bool {
        self.led.is_on()
    }

    pub fn tone_is_armed(&self) -> bool {
        self.tone.is_armed()
    }

    /// Host simulation access to the touch hub (injection).
    #[cfg(not(target_os = "espidf"))]
    pub fn touch_mut(&mut self) -> &mut TouchPadHub {
        &mut self.touch
    }
}

impl SensorPort for HardwareAdapter {
    fn read_channels(&mut self) -> [u32; CHANNEL_COUNT] {
        self.touch.read_channels()
    }
}

impl AlertOutputPort for HardwareAdapter {
    fn set_indicator(&mut self, on: bool) {
        self.led.set(on);
    }

    fn start_tone_sequence(&mut self) {
        self.tone.arm(&ALERT_SEQUENCE);
    }

    fn stop_tone_sequence(&mut self) {
        self.tone.request_stop();
    }
}
