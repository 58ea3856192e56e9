//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, feed a test recorder, etc.

use core::net::SocketAddr;

use crate::sensors::Direction;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (unpaired, discovery running).
    Started,

    /// A frontend paired with this controller.
    PairingEstablished { peer: SocketAddr },

    /// A pairing request arrived while already paired with someone else.
    PairingRejected { from: SocketAddr },

    /// The paired peer went silent past the timeout; back to discovery.
    PairingLost { peer: SocketAddr },

    /// The alert output turned on.
    AlertActivated { source: AlertSource },

    /// The alert output turned off.
    AlertCleared { source: AlertSource },

    /// The classifier detected a gesture (edge, not level).
    GestureDetected { direction: Direction },
}

/// What caused an alert-output transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSource {
    /// Local gesture or command on this controller.
    Local,
    /// Packet from the paired frontend.
    Remote,
    /// Active alert aged out with no re-trigger.
    StaleTimeout,
    /// Pairing dropped — an unpaired device shows no alerts.
    PeerLoss,
}
