//! System configuration parameters
//!
//! All tunable parameters for the SafeWalk controller. Values can be
//! overridden via NVS; the defaults below are the documented shipping
//! values. Timeouts the distilled protocol leaves open (hello cadence,
//! peer-silence window) are deliberate, tested defaults rather than
//! hard-coded magic numbers.

use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};
use crate::sensors::Direction;

const CONFIG_NAMESPACE: &str = "safewalk";
const CONFIG_KEY: &str = "syscfg";

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeWalkConfig {
    // --- Network ---
    /// Destination port for alert/control traffic to the paired frontend.
    pub peer_port: u16,
    /// Local port this controller listens on.
    pub listen_port: u16,
    /// Backend registration endpoint. `None` disables registration.
    pub backend_addr: Option<core::net::SocketAddr>,

    // --- Pairing / discovery ---
    /// Hello announce interval while unpaired (milliseconds).
    pub hello_interval_ms: u32,
    /// Status heartbeat interval while paired (milliseconds).
    pub status_interval_ms: u32,
    /// Silence from the paired peer that triggers unpairing (milliseconds).
    pub peer_silence_timeout_ms: u32,

    // --- Alerts ---
    /// Active alert with no re-trigger auto-clears after this long.
    pub alert_stale_timeout_ms: u32,
    /// Gesture direction that raises a local alert.
    pub trigger_direction: Direction,

    // --- Timing ---
    /// Sequencing-tick period (tone stepping + sensor polling), ms.
    pub sequence_tick_ms: u32,
    /// Watchdog pet cadence (must be well under the timeout), ms.
    pub watchdog_pet_interval_ms: u32,
    /// Hardware watchdog timeout, ms.
    pub watchdog_timeout_ms: u32,

    // --- Limits ---
    /// Max datagrams drained per sequencing tick.
    pub max_inbound_per_tick: u8,
}

impl Default for SafeWalkConfig {
    fn default() -> Self {
        Self {
            // Network (port split matches the frontend contract)
            peer_port: 8888,
            listen_port: 8889,
            backend_addr: None,

            // Pairing / discovery
            hello_interval_ms: 2_000,
            status_interval_ms: 1_000,
            peer_silence_timeout_ms: 15_000,

            // Alerts
            alert_stale_timeout_ms: 30_000,
            trigger_direction: Direction::Up,

            // Timing
            sequence_tick_ms: 25,
            watchdog_pet_interval_ms: 1_000,
            watchdog_timeout_ms: 8_000,

            // Limits
            max_inbound_per_tick: 8,
        }
    }
}

impl SafeWalkConfig {
    /// Load a stored config, or `None` on first boot / corrupt blob.
    pub fn load(storage: &dyn StoragePort) -> Option<Self> {
        let mut buf = [0u8; 256];
        let n = storage.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf).ok()?;
        postcard::from_bytes(&buf[..n]).ok()
    }

    /// Persist the config.
    pub fn save(&self, storage: &mut dyn StoragePort) -> Result<(), StorageError> {
        let bytes = postcard::to_allocvec(self).map_err(|_| StorageError::IoError)?;
        storage.write(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SafeWalkConfig::default();
        assert!(c.peer_port != c.listen_port);
        assert!(c.hello_interval_ms > 0);
        assert!(c.status_interval_ms > 0);
        assert!(c.sequence_tick_ms > 0);
        assert!(c.max_inbound_per_tick > 0);
        assert_eq!(c.trigger_direction, Direction::Up);
    }

    #[test]
    fn pet_cadence_has_watchdog_margin() {
        let c = SafeWalkConfig::default();
        assert!(
            c.watchdog_pet_interval_ms * 2 <= c.watchdog_timeout_ms,
            "pet cadence must leave at least 2x margin before the watchdog fires"
        );
    }

    #[test]
    fn silence_timeout_covers_several_hellos() {
        let c = SafeWalkConfig::default();
        assert!(
            c.peer_silence_timeout_ms > 3 * c.status_interval_ms,
            "peer-silence window must tolerate a few lost heartbeats"
        );
        assert!(c.peer_silence_timeout_ms > c.hello_interval_ms);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SafeWalkConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SafeWalkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.peer_port, c2.peer_port);
        assert_eq!(c.peer_silence_timeout_ms, c2.peer_silence_timeout_ms);
        assert_eq!(c.trigger_direction, c2.trigger_direction);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SafeWalkConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SafeWalkConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.listen_port, c2.listen_port);
        assert_eq!(c.watchdog_timeout_ms, c2.watchdog_timeout_ms);
    }

    #[cfg(not(target_os = "espidf"))]
    #[test]
    fn storage_roundtrip() {
        use crate::adapters::nvs::NvsAdapter;

        let mut nvs = NvsAdapter::new().unwrap();
        assert!(SafeWalkConfig::load(&nvs).is_none());

        let mut c = SafeWalkConfig::default();
        c.peer_silence_timeout_ms = 20_000;
        c.save(&mut nvs).unwrap();

        let loaded = SafeWalkConfig::load(&nvs).unwrap();
        assert_eq!(loaded.peer_silence_timeout_ms, 20_000);
    }
}
