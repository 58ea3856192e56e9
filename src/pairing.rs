//! Pairing manager — this controller's identity and its single peer.
//!
//! A controller is either unpaired (announcing itself so a frontend can
//! discover it) or paired with exactly one frontend address. The peer
//! address only exists while paired — the sum type makes a stale-address
//! transmit unrepresentable.
//!
//! Peer loss is detected by silence: every accepted frame from the peer
//! refreshes a last-heard timestamp, and [`check_silence`] unpairs once
//! the configured window elapses. A packet from the old peer after that
//! is just an unknown sender until a new handshake completes.
//!
//! [`check_silence`]: PairingManager::check_silence

use core::net::SocketAddr;

use log::{info, warn};

// ── Identity ──────────────────────────────────────────────────

/// Fixed-size device ID string ("DE:AD:BE:EF:CA:FE" = 17 chars).
pub type DeviceIdString = heapless::String<24>;

/// Who this controller is on the network. Built once at boot from the
/// factory MAC and the DHCP lease; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// MAC-address text, doubling as the stable device ID.
    pub device_id: DeviceIdString,
    /// Address the controller listens on.
    pub local_addr: SocketAddr,
}

// ── Pairing state ─────────────────────────────────────────────

/// Exclusive pairing state. `Paired::peer` is meaningful by construction —
/// there is no "paired flag with leftover address" state to get wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    Unpaired,
    Paired {
        peer: SocketAddr,
        /// Monotonic ms of the last accepted frame from the peer.
        last_heard_ms: u32,
    },
}

/// Outcome of a pairing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingOutcome {
    /// Request accepted — now paired with the requester.
    Accepted,
    /// Re-request from the current peer; liveness refreshed, no change.
    AlreadyPaired,
    /// Paired with a different frontend; request silently rejected.
    Rejected { current: SocketAddr },
}

// ── Manager ───────────────────────────────────────────────────

pub struct PairingManager {
    identity: DeviceIdentity,
    state: PairingState,
    silence_timeout_ms: u32,
}

impl PairingManager {
    pub fn new(identity: DeviceIdentity, silence_timeout_ms: u32) -> Self {
        Self {
            identity,
            state: PairingState::Unpaired,
            silence_timeout_ms,
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    pub fn is_paired(&self) -> bool {
        matches!(self.state, PairingState::Paired { .. })
    }

    /// Current peer address, if paired.
    pub fn peer(&self) -> Option<SocketAddr> {
        match self.state {
            PairingState::Paired { peer, .. } => Some(peer),
            PairingState::Unpaired => None,
        }
    }

    /// Handle an inbound pairing request.
    ///
    /// At most one paired peer at a time: a request from a second frontend
    /// is rejected with no state change.
    pub fn request_pairing(&mut self, from: SocketAddr, now_ms: u32) -> PairingOutcome {
        match self.state {
            PairingState::Unpaired => {
                self.state = PairingState::Paired {
                    peer: from,
                    last_heard_ms: now_ms,
                };
                info!("pairing: accepted frontend {}", from);
                PairingOutcome::Accepted
            }
            PairingState::Paired { peer, .. } if peer == from => {
                self.state = PairingState::Paired {
                    peer,
                    last_heard_ms: now_ms,
                };
                PairingOutcome::AlreadyPaired
            }
            PairingState::Paired { peer, .. } => {
                warn!("pairing: rejected {} (already paired with {})", from, peer);
                PairingOutcome::Rejected { current: peer }
            }
        }
    }

    /// Record protocol traffic from `from`. Refreshes the silence window
    /// when the sender is the paired peer; traffic from anyone else is
    /// ignored here (the caller already dropped or routed it).
    pub fn note_traffic(&mut self, from: SocketAddr, now_ms: u32) {
        if let PairingState::Paired { peer, .. } = self.state {
            if peer == from {
                self.state = PairingState::Paired {
                    peer,
                    last_heard_ms: now_ms,
                };
            }
        }
    }

    /// Unpair if the peer has been silent for the configured window.
    ///
    /// Returns the lost peer's address exactly once per silence episode —
    /// the transition itself moves the state to `Unpaired`, so a second
    /// call reports nothing.
    pub fn check_silence(&mut self, now_ms: u32) -> Option<SocketAddr> {
        if let PairingState::Paired { peer, last_heard_ms } = self.state {
            if now_ms.wrapping_sub(last_heard_ms) >= self.silence_timeout_ms {
                warn!(
                    "pairing: peer {} silent for {}ms — unpairing",
                    peer, self.silence_timeout_ms
                );
                self.state = PairingState::Unpaired;
                return Some(peer);
            }
        }
        None
    }

    /// Explicit unpair (command or shutdown path).
    pub fn unpair(&mut self) -> Option<SocketAddr> {
        let old = self.peer();
        if let Some(peer) = old {
            info!("pairing: unpaired from {}", peer);
        }
        self.state = PairingState::Unpaired;
        old
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> SocketAddr {
        SocketAddr::from(([192, 0, 2, last], 8888))
    }

    fn manager() -> PairingManager {
        let mut device_id = DeviceIdString::new();
        device_id.push_str("DE:AD:BE:EF:CA:FE").unwrap();
        PairingManager::new(
            DeviceIdentity {
                device_id,
                local_addr: SocketAddr::from(([192, 0, 2, 1], 8889)),
            },
            15_000,
        )
    }

    #[test]
    fn boots_unpaired() {
        let m = manager();
        assert!(!m.is_paired());
        assert_eq!(m.peer(), None);
    }

    #[test]
    fn first_request_pairs() {
        let mut m = manager();
        assert_eq!(m.request_pairing(addr(5), 100), PairingOutcome::Accepted);
        assert_eq!(m.peer(), Some(addr(5)));
    }

    #[test]
    fn pairing_is_exclusive() {
        let mut m = manager();
        m.request_pairing(addr(5), 100);
        assert_eq!(
            m.request_pairing(addr(6), 200),
            PairingOutcome::Rejected { current: addr(5) }
        );
        // peerAddress remains P.
        assert_eq!(m.peer(), Some(addr(5)));
    }

    #[test]
    fn same_peer_rerequest_refreshes() {
        let mut m = manager();
        m.request_pairing(addr(5), 100);
        assert_eq!(
            m.request_pairing(addr(5), 14_000),
            PairingOutcome::AlreadyPaired
        );
        // Refreshed at 14s, so silence at 15s has not elapsed yet.
        assert_eq!(m.check_silence(15_000), None);
        assert!(m.is_paired());
    }

    #[test]
    fn silence_unpairs_exactly_once() {
        let mut m = manager();
        m.request_pairing(addr(5), 0);
        assert_eq!(m.check_silence(14_999), None);
        assert_eq!(m.check_silence(15_000), Some(addr(5)));
        // Second check reports nothing — single transition per episode.
        assert_eq!(m.check_silence(20_000), None);
        assert!(!m.is_paired());
    }

    #[test]
    fn traffic_defers_silence() {
        let mut m = manager();
        m.request_pairing(addr(5), 0);
        m.note_traffic(addr(5), 10_000);
        assert_eq!(m.check_silence(15_000), None);
        assert_eq!(m.check_silence(25_000), Some(addr(5)));
    }

    #[test]
    fn foreign_traffic_does_not_defer_silence() {
        let mut m = manager();
        m.request_pairing(addr(5), 0);
        m.note_traffic(addr(9), 10_000);
        assert_eq!(m.check_silence(15_000), Some(addr(5)));
    }

    #[test]
    fn can_repair_after_loss() {
        let mut m = manager();
        m.request_pairing(addr(5), 0);
        m.check_silence(15_000);
        assert_eq!(m.request_pairing(addr(6), 16_000), PairingOutcome::Accepted);
        assert_eq!(m.peer(), Some(addr(6)));
    }
}
