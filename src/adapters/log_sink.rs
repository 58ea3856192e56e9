//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). A future telemetry uplink
//! would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | unpaired, discovery running");
            }
            AppEvent::PairingEstablished { peer } => {
                info!("PAIR  | established with {}", peer);
            }
            AppEvent::PairingRejected { from } => {
                warn!("PAIR  | rejected request from {}", from);
            }
            AppEvent::PairingLost { peer } => {
                warn!("PAIR  | lost {} (silence timeout)", peer);
            }
            AppEvent::AlertActivated { source } => {
                info!("ALERT | active ({:?})", source);
            }
            AppEvent::AlertCleared { source } => {
                info!("ALERT | cleared ({:?})", source);
            }
            AppEvent::GestureDetected { direction } => {
                info!("TOUCH | {:?}", direction);
            }
        }
    }
}
