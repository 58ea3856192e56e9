//! Property tests for the protocol, classifier, pairing, and alert cores.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets. On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use core::net::SocketAddr;

use proptest::prelude::*;

use safewalk::alert::AlertEngine;
use safewalk::pairing::{DeviceIdentity, DeviceIdString, PairingManager, PairingOutcome};
use safewalk::protocol::{self, AlertCode, Frame};
use safewalk::sensors::{classify, CalibrationTable, Direction, CHANNEL_COUNT};

fn identity() -> DeviceIdentity {
    let mut device_id = DeviceIdString::new();
    device_id.push_str("DE:AD:BE:EF:CA:FE").unwrap();
    DeviceIdentity {
        device_id,
        local_addr: SocketAddr::from(([192, 0, 2, 1], 8889)),
    }
}

// ── Wire decoder ──────────────────────────────────────────────

proptest! {
    /// The decoder must never panic, whatever arrives off the wire.
    #[test]
    fn decoder_never_panics(data in proptest::collection::vec(any::<u8>(), 0..=64)) {
        let _ = protocol::decode(&data);
    }

    /// On the alert layer, exactly two byte values are valid; everything
    /// else is malformed or a control frame, never an alert.
    #[test]
    fn only_ff_and_00_are_alerts(byte in any::<u8>()) {
        match protocol::decode(&[byte]) {
            Ok(Frame::Alert(AlertCode::Trigger)) => prop_assert_eq!(byte, 0xFF),
            Ok(Frame::Alert(AlertCode::Clear)) => prop_assert_eq!(byte, 0x00),
            Ok(_) | Err(_) => {
                prop_assert!(byte != 0xFF && byte != 0x00);
            }
        }
    }
}

// ── Classifier ────────────────────────────────────────────────

proptest! {
    /// The tie-break order is fixed: the result is always the first
    /// channel over threshold in UP, RIGHT, DOWN, LEFT order.
    #[test]
    fn classifier_priority_is_deterministic(
        readings in proptest::array::uniform4(0u32..=5_000),
        thresholds in proptest::array::uniform4(1u32..=4_999),
    ) {
        let table = CalibrationTable { thresholds };
        let got = classify(readings, &table);

        let expected = (0..CHANNEL_COUNT)
            .find(|&ch| readings[ch] > thresholds[ch])
            .map_or(Direction::None, |ch| match ch {
                0 => Direction::Up,
                1 => Direction::Right,
                2 => Direction::Down,
                _ => Direction::Left,
            });
        prop_assert_eq!(got, expected);
    }
}

// ── Alert engine ──────────────────────────────────────────────

proptest! {
    /// For any accepted packet sequence, the output state equals the code
    /// of the most recently applied packet.
    #[test]
    fn output_state_equals_last_accepted_code(
        codes in proptest::collection::vec(prop_oneof![Just(AlertCode::Trigger), Just(AlertCode::Clear)], 1..=32),
    ) {
        let mut engine = AlertEngine::new(u32::MAX);
        for (i, &code) in codes.iter().enumerate() {
            engine.apply(code, i as u32);
        }
        prop_assert_eq!(
            engine.is_active(),
            *codes.last().unwrap() == AlertCode::Trigger
        );
    }

    /// Applying the same code twice never differs from applying it once.
    #[test]
    fn alert_application_is_idempotent(
        prefix in proptest::collection::vec(prop_oneof![Just(AlertCode::Trigger), Just(AlertCode::Clear)], 0..=8),
        code in prop_oneof![Just(AlertCode::Trigger), Just(AlertCode::Clear)],
    ) {
        let mut once = AlertEngine::new(u32::MAX);
        let mut twice = AlertEngine::new(u32::MAX);
        for (i, &c) in prefix.iter().enumerate() {
            once.apply(c, i as u32);
            twice.apply(c, i as u32);
        }
        once.apply(code, 100);
        twice.apply(code, 100);
        twice.apply(code, 101);
        prop_assert_eq!(once.is_active(), twice.is_active());
    }
}

// ── Pairing exclusivity ───────────────────────────────────────

proptest! {
    /// Whatever the request order, the manager holds the address of the
    /// FIRST requester until silence or an explicit unpair — later
    /// requesters never steal the pairing.
    #[test]
    fn first_requester_wins(
        requesters in proptest::collection::vec(1u8..=20, 1..=24),
    ) {
        let mut manager = PairingManager::new(identity(), u32::MAX);
        let first = requesters[0];

        for (i, &r) in requesters.iter().enumerate() {
            let from = SocketAddr::from(([10, 0, 0, r], 8888));
            let outcome = manager.request_pairing(from, i as u32);
            if r == first {
                prop_assert!(matches!(
                    outcome,
                    PairingOutcome::Accepted | PairingOutcome::AlreadyPaired
                ));
            } else {
                prop_assert!(
                    matches!(outcome, PairingOutcome::Rejected { .. }),
                    "expected Rejected outcome"
                );
            }
        }

        prop_assert_eq!(
            manager.peer(),
            Some(SocketAddr::from(([10, 0, 0, first], 8888)))
        );
    }

    /// Silence recovery: after the timeout the manager is unpaired, and a
    /// new requester is then accepted.
    #[test]
    fn silence_then_repair(
        peer_a in 1u8..=100,
        peer_b in 101u8..=200,
        timeout in 1_000u32..=60_000,
    ) {
        let mut manager = PairingManager::new(identity(), timeout);
        let a = SocketAddr::from(([10, 0, 0, peer_a], 8888));
        let b = SocketAddr::from(([10, 0, 0, peer_b], 8888));

        manager.request_pairing(a, 0);
        prop_assert_eq!(manager.check_silence(timeout - 1), None);
        prop_assert_eq!(manager.check_silence(timeout), Some(a));
        prop_assert_eq!(manager.check_silence(timeout + 1), None);

        prop_assert_eq!(manager.request_pairing(b, timeout + 2), PairingOutcome::Accepted);
        prop_assert_eq!(manager.peer(), Some(b));
    }
}

// ── Watchdog liveness ─────────────────────────────────────────

proptest! {
    /// Petting at any cadence strictly inside the timeout keeps the
    /// watchdog armed forever; stopping pets fires it exactly once.
    #[test]
    fn watchdog_fires_iff_pets_stop(
        timeout in 100u32..=10_000,
        pet_every_divisor in 2u32..=10,
        pets in 1u32..=50,
    ) {
        use safewalk::drivers::watchdog::{Watchdog, WatchdogVerdict};

        let pet_every = (timeout / pet_every_divisor).max(1);
        let mut wd = Watchdog::arm(timeout, 0);

        let mut t = 0u32;
        for _ in 0..pets {
            t += pet_every;
            prop_assert_eq!(wd.expired(t), WatchdogVerdict::Armed);
            wd.pet(t);
        }

        // Silence: the next check inside the window is fine, past it fires.
        prop_assert_eq!(wd.expired(t + timeout - 1), WatchdogVerdict::Armed);
        prop_assert_eq!(wd.expired(t + timeout), WatchdogVerdict::Fired);
    }
}
