//! Hardware drivers: timer sources, watchdog, indicator LED, tone
//! sequencing, and the one-shot peripheral bring-up.

pub mod hw_init;
pub mod hw_timer;
pub mod status_led;
pub mod tone;
pub mod watchdog;
