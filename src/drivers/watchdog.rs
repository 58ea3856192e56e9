//! Hardware watchdog supervisor.
//!
//! Arms the watchdog with the configured timeout at boot; the main loop
//! pets it on every watchdog-cadence tick. Missing the deadline is fatal
//! by design — the chip resets and boots back into the unpaired initial
//! state. That reset is the last-resort recovery for any unanticipated
//! hang, so nothing here tries to catch or soften it.
//!
//! On ESP-IDF this wraps the Task Watchdog Timer (TWDT). On host targets
//! the deadline is simulated so liveness semantics stay testable: the
//! main loop polls [`Watchdog::expired`] and treats `Fired` as a reset.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

/// Host-observable watchdog verdict. `Fired` is terminal — once latched,
/// the simulated device is considered reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogVerdict {
    Armed,
    Fired,
}

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    sim: SimWatchdog,
}

#[cfg(not(target_os = "espidf"))]
struct SimWatchdog {
    deadline_ms: u32,
    fired: bool,
}

impl Watchdog {
    /// Arm the watchdog. `now_ms` seeds the first deadline on host targets;
    /// hardware ignores it.
    pub fn arm(timeout_ms: u32, now_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            let _ = now_ms;
            // SAFETY: TWDT reconfigure/subscribe are called once from the
            // single main task before the event loop starts.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: armed ({}ms timeout, reset on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self {
                    timeout_ms,
                    subscribed,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): armed ({}ms timeout)", timeout_ms);
            Self {
                timeout_ms,
                sim: SimWatchdog {
                    deadline_ms: now_ms.wrapping_add(timeout_ms),
                    fired: false,
                },
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Pet the watchdog, pushing the deadline forward by the full timeout.
    /// Must be reachable from the main loop at least once per timeout even
    /// under worst-case sequencing load — the cadence is sized in config
    /// with margin, never bypassed.
    pub fn pet(&mut self, now_ms: u32) {
        #[cfg(target_os = "espidf")]
        {
            let _ = now_ms;
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            if !self.sim.fired {
                self.sim.deadline_ms = now_ms.wrapping_add(self.timeout_ms);
            }
        }
    }

    /// Host simulation: has the deadline elapsed? Latches `Fired` on the
    /// first expiry — there is no software-observable recovery, matching
    /// the hardware reset.
    #[cfg(not(target_os = "espidf"))]
    pub fn expired(&mut self, now_ms: u32) -> WatchdogVerdict {
        if self.sim.fired {
            return WatchdogVerdict::Fired;
        }
        // Wrapping-aware "now >= deadline" over a u32 clock.
        let overdue = now_ms.wrapping_sub(self.sim.deadline_ms) < u32::MAX / 2;
        if overdue {
            self.sim.fired = true;
            log::error!("Watchdog(sim): deadline missed — device reset");
            return WatchdogVerdict::Fired;
        }
        WatchdogVerdict::Armed
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn petted_watchdog_never_fires() {
        let mut wd = Watchdog::arm(1_000, 0);
        // Pet every 400ms for 10s — strictly inside the timeout.
        for t in (0..10_000).step_by(400) {
            assert_eq!(wd.expired(t), WatchdogVerdict::Armed);
            wd.pet(t);
        }
    }

    #[test]
    fn unpetted_watchdog_fires_once_and_latches() {
        let mut wd = Watchdog::arm(1_000, 0);
        assert_eq!(wd.expired(999), WatchdogVerdict::Armed);
        assert_eq!(wd.expired(1_000), WatchdogVerdict::Fired);
        // Terminal: petting after the fact does not un-fire.
        wd.pet(1_001);
        assert_eq!(wd.expired(1_002), WatchdogVerdict::Fired);
    }

    #[test]
    fn pet_extends_deadline() {
        let mut wd = Watchdog::arm(1_000, 0);
        wd.pet(900);
        assert_eq!(wd.expired(1_500), WatchdogVerdict::Armed);
        assert_eq!(wd.expired(1_900), WatchdogVerdict::Fired);
    }
}
