//! Backend registration adapter.
//!
//! Announces this device to the fleet backend once the network is up:
//! a single JSON datagram `{deviceID, ipAddress, port}` to the configured
//! registration endpoint. The backend is a collaborator, not a dependency —
//! registration failures are logged and retried on a slow cadence, and the
//! pairing/alert core runs identically with no backend at all.

use core::net::SocketAddr;

use log::{info, warn};
use serde::Serialize;

use crate::app::ports::DatagramPort;
use crate::pairing::DeviceIdentity;

const RETRY_INTERVAL_MS: u32 = 30_000;

#[derive(Serialize)]
struct RegistrationPayload<'a> {
    #[serde(rename = "deviceID")]
    device_id: &'a str,
    #[serde(rename = "ipAddress")]
    ip_address: String,
    port: u16,
}

pub struct BackendRegistrar {
    endpoint: Option<SocketAddr>,
    registered: bool,
    next_attempt_ms: u32,
}

impl BackendRegistrar {
    pub fn new(endpoint: Option<SocketAddr>) -> Self {
        Self {
            endpoint,
            registered: false,
            next_attempt_ms: 0,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Send the registration once, retrying on the slow cadence until a
    /// send succeeds. UDP gives no delivery guarantee — "sent without a
    /// local error" is the best signal available at this layer.
    pub fn maybe_register(
        &mut self,
        identity: &DeviceIdentity,
        net: &mut impl DatagramPort,
        now_ms: u32,
    ) {
        let Some(endpoint) = self.endpoint else {
            return;
        };
        if self.registered || now_ms.wrapping_sub(self.next_attempt_ms) >= u32::MAX / 2 {
            return;
        }

        let payload = RegistrationPayload {
            device_id: identity.device_id.as_str(),
            ip_address: identity.local_addr.ip().to_string(),
            port: identity.local_addr.port(),
        };
        let body = match serde_json::to_vec(&payload) {
            Ok(b) => b,
            Err(e) => {
                warn!("backend: registration serialize failed: {}", e);
                return;
            }
        };

        match net.send(endpoint, &body) {
            Ok(()) => {
                info!("backend: registered {} with {}", identity.device_id, endpoint);
                self.registered = true;
            }
            Err(e) => {
                warn!("backend: registration send failed ({}), will retry", e);
                self.next_attempt_ms = now_ms.wrapping_add(RETRY_INTERVAL_MS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::TransportError;
    use crate::pairing::DeviceIdString;

    struct MockNet {
        sent: Vec<(SocketAddr, Vec<u8>)>,
        fail: bool,
    }

    impl DatagramPort for MockNet {
        fn send(&mut self, to: SocketAddr, payload: &[u8]) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::SendFailed);
            }
            self.sent.push((to, payload.to_vec()));
            Ok(())
        }
        fn recv(
            &mut self,
            _buf: &mut [u8],
        ) -> Result<Option<(SocketAddr, usize)>, TransportError> {
            Ok(None)
        }
    }

    fn identity() -> DeviceIdentity {
        let mut device_id = DeviceIdString::new();
        device_id.push_str("DE:AD:BE:EF:CA:FE").unwrap();
        DeviceIdentity {
            device_id,
            local_addr: SocketAddr::from(([192, 0, 2, 10], 8889)),
        }
    }

    #[test]
    fn registers_once() {
        let endpoint = SocketAddr::from(([192, 0, 2, 100], 3001));
        let mut reg = BackendRegistrar::new(Some(endpoint));
        let mut net = MockNet { sent: vec![], fail: false };

        reg.maybe_register(&identity(), &mut net, 0);
        reg.maybe_register(&identity(), &mut net, 100);
        assert_eq!(net.sent.len(), 1);
        assert!(reg.is_registered());

        let (to, body) = &net.sent[0];
        assert_eq!(*to, endpoint);
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["deviceID"], "DE:AD:BE:EF:CA:FE");
        assert_eq!(json["ipAddress"], "192.0.2.10");
        assert_eq!(json["port"], 8889);
    }

    #[test]
    fn retries_after_send_failure() {
        let mut reg = BackendRegistrar::new(Some(SocketAddr::from(([192, 0, 2, 100], 3001))));
        let mut net = MockNet { sent: vec![], fail: true };

        reg.maybe_register(&identity(), &mut net, 0);
        assert!(!reg.is_registered());

        // Still inside the retry window: no attempt.
        net.fail = false;
        reg.maybe_register(&identity(), &mut net, 1_000);
        assert!(net.sent.is_empty());

        // Window elapsed: attempt succeeds.
        reg.maybe_register(&identity(), &mut net, RETRY_INTERVAL_MS + 1);
        assert!(reg.is_registered());
        assert_eq!(net.sent.len(), 1);
    }

    #[test]
    fn disabled_without_endpoint() {
        let mut reg = BackendRegistrar::new(None);
        let mut net = MockNet { sent: vec![], fail: false };
        reg.maybe_register(&identity(), &mut net, 0);
        assert!(net.sent.is_empty());
        assert!(!reg.is_registered());
    }
}
