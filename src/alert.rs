//! Alert output state machine.
//!
//! Tracks whether the alert output (LED + tone) is active and times out
//! stale alerts. The engine is pure state: the caller maps transitions to
//! port calls and wire sends, which keeps every branch host-testable.
//!
//! Repeated TRIGGERs or CLEARs are safe — a transition is only reported
//! when the state actually flips, so side effects never duplicate.

use crate::protocol::AlertCode;

/// Result of applying an alert code or timeout to the output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTransition {
    /// Output just turned on.
    Activated,
    /// Output just turned off.
    Deactivated,
    /// Code re-confirmed the current state; no side effects.
    Unchanged,
}

pub struct AlertEngine {
    active: bool,
    activated_at_ms: u32,
    stale_timeout_ms: u32,
}

impl AlertEngine {
    pub fn new(stale_timeout_ms: u32) -> Self {
        Self {
            active: false,
            activated_at_ms: 0,
            stale_timeout_ms,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The code describing the current output state (for status packets).
    pub fn status_code(&self) -> AlertCode {
        AlertCode::for_state(self.active)
    }

    /// Apply a validated alert code (inbound from the peer, or local).
    pub fn apply(&mut self, code: AlertCode, now_ms: u32) -> AlertTransition {
        match (code, self.active) {
            (AlertCode::Trigger, false) => {
                self.active = true;
                self.activated_at_ms = now_ms;
                AlertTransition::Activated
            }
            (AlertCode::Trigger, true) => {
                // Re-trigger restarts the stale window but nothing else.
                self.activated_at_ms = now_ms;
                AlertTransition::Unchanged
            }
            (AlertCode::Clear, true) => {
                self.active = false;
                AlertTransition::Deactivated
            }
            (AlertCode::Clear, false) => AlertTransition::Unchanged,
        }
    }

    /// Auto-clear an alert that has been active past the stale window.
    /// Returns `true` when the clear happened on this call.
    pub fn check_stale(&mut self, now_ms: u32) -> bool {
        if self.active && now_ms.wrapping_sub(self.activated_at_ms) >= self.stale_timeout_ms {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// Unconditional local deactivation (peer loss, shutdown).
    /// Returns `true` when the output was active.
    pub fn force_clear(&mut self) -> bool {
        let was = self.active;
        self.active = false;
        was
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_then_clear() {
        let mut a = AlertEngine::new(30_000);
        assert_eq!(a.apply(AlertCode::Trigger, 0), AlertTransition::Activated);
        assert!(a.is_active());
        assert_eq!(a.apply(AlertCode::Clear, 10), AlertTransition::Deactivated);
        assert!(!a.is_active());
    }

    #[test]
    fn trigger_is_idempotent() {
        let mut a = AlertEngine::new(30_000);
        assert_eq!(a.apply(AlertCode::Trigger, 0), AlertTransition::Activated);
        assert_eq!(a.apply(AlertCode::Trigger, 1), AlertTransition::Unchanged);
        assert_eq!(a.apply(AlertCode::Trigger, 2), AlertTransition::Unchanged);
        assert!(a.is_active());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut a = AlertEngine::new(30_000);
        assert_eq!(a.apply(AlertCode::Clear, 0), AlertTransition::Unchanged);
        a.apply(AlertCode::Trigger, 1);
        a.apply(AlertCode::Clear, 2);
        assert_eq!(a.apply(AlertCode::Clear, 3), AlertTransition::Unchanged);
    }

    #[test]
    fn stale_alert_auto_clears_once() {
        let mut a = AlertEngine::new(30_000);
        a.apply(AlertCode::Trigger, 0);
        assert!(!a.check_stale(29_999));
        assert!(a.check_stale(30_000));
        assert!(!a.is_active());
        assert!(!a.check_stale(60_000));
    }

    #[test]
    fn retrigger_restarts_stale_window() {
        let mut a = AlertEngine::new(30_000);
        a.apply(AlertCode::Trigger, 0);
        a.apply(AlertCode::Trigger, 20_000);
        assert!(!a.check_stale(30_000));
        assert!(a.check_stale(50_000));
    }

    #[test]
    fn status_code_tracks_state() {
        let mut a = AlertEngine::new(30_000);
        assert_eq!(a.status_code(), AlertCode::Clear);
        a.apply(AlertCode::Trigger, 0);
        assert_eq!(a.status_code(), AlertCode::Trigger);
    }

    #[test]
    fn force_clear_reports_prior_state() {
        let mut a = AlertEngine::new(30_000);
        assert!(!a.force_clear());
        a.apply(AlertCode::Trigger, 0);
        assert!(a.force_clear());
        assert!(!a.is_active());
    }
}
