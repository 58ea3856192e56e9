//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (touch pads, LED/speaker, UDP socket, NVS, event sinks)
//! implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly — everything below is mockable from a host test.

use core::net::SocketAddr;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one raw charge-time magnitude per touch channel, in
/// classifier priority order (UP, RIGHT, DOWN, LEFT).
pub trait SensorPort {
    fn read_channels(&mut self) -> [u32; crate::sensors::CHANNEL_COUNT];
}

// ───────────────────────────────────────────────────────────────
// Alert output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain drives the alert indicator and the tone
/// sequencer through this boundary.
pub trait AlertOutputPort {
    /// Turn the visual indicator on or off.
    fn set_indicator(&mut self, on: bool);

    /// Arm the alert tone sequence. Stepping happens on sequencing ticks.
    fn start_tone_sequence(&mut self);

    /// Request tone stop. Honored at the next tick boundary — the note in
    /// flight is allowed to finish.
    fn stop_tone_sequence(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Datagram port (driven adapter: domain ↔ network)
// ───────────────────────────────────────────────────────────────

/// Connectionless, unreliable, polled datagram transport.
///
/// `recv` MUST NOT block: it returns `Ok(None)` when nothing is pending.
/// All failures are transient — callers retry on the next loop iteration.
pub trait DatagramPort {
    /// Send one datagram.
    fn send(&mut self, to: SocketAddr, payload: &[u8]) -> Result<(), TransportError>;

    /// Non-blocking receive into `buf`. Returns the sender and byte count,
    /// or `None` when no datagram is pending.
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(SocketAddr, usize)>, TransportError>;
}

/// Errors from [`DatagramPort`] operations. All transient by contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Transport not ready (no socket, interface down).
    NotReady,
    /// The OS/driver rejected the send.
    SendFailed,
    /// The OS/driver reported a receive failure.
    ReceiveFailed,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "transport not ready"),
            Self::SendFailed => write!(f, "send failed"),
            Self::ReceiveFailed => write!(f, "receive failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, a future
/// telemetry uplink, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for calibration data and crash logs.
///
/// Keys are namespaced to prevent collisions between subsystems. Write
/// operations MUST be atomic — no partial writes on power loss. The
/// ESP-IDF NVS API guarantees this natively; the in-memory simulation
/// achieves it trivially.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
