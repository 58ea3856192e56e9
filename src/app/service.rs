//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the pairing manager, the alert engine, and the
//! gesture classifier state. It exposes a clean, hardware-agnostic API;
//! all I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!   DatagramPort ◀▶│        AppService         │
//! AlertOutputPort ◀│  Pairing · Alert · Touch  │
//!                  └───────────────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) runs per sequencing-tick event: drain
//! inbound datagrams, classify the touch sample, then run the pairing and
//! alert cadences. Nothing in here blocks — transport errors are logged
//! and retried on the next tick.

use core::net::{Ipv4Addr, SocketAddr};
use core::time::Duration;

use burster::Limiter;
use log::{debug, info, warn};

use crate::alert::{AlertEngine, AlertTransition};
use crate::app::commands::AppCommand;
use crate::app::events::{AlertSource, AppEvent};
use crate::app::ports::{AlertOutputPort, DatagramPort, EventSink, SensorPort, StoragePort};
use crate::config::SafeWalkConfig;
use crate::pairing::{DeviceIdentity, PairingManager, PairingOutcome};
use crate::protocol::{self, AlertCode, Frame};
use crate::sensors::{self, CalibrationTable, Direction};

pub struct AppService {
    config: SafeWalkConfig,
    pairing: PairingManager,
    alert: AlertEngine,
    calibration: CalibrationTable,
    last_direction: Direction,
    last_hello_ms: Option<u32>,
    last_status_ms: u32,
    announce_limiter: burster::TokenBucket<fn() -> Duration>,
}

impl AppService {
    pub fn new(
        config: SafeWalkConfig,
        identity: DeviceIdentity,
        calibration: CalibrationTable,
    ) -> Self {
        let pairing = PairingManager::new(identity, config.peer_silence_timeout_ms);
        let alert = AlertEngine::new(config.alert_stale_timeout_ms);
        Self {
            config,
            pairing,
            alert,
            calibration,
            last_direction: Direction::None,
            last_hello_ms: None,
            last_status_ms: 0,
            // Hello + status heartbeat share one bucket, so cadence
            // traffic can never flood the link whatever the configured
            // intervals are.
            announce_limiter: burster::TokenBucket::new_with_time_provider(
                4,
                4, // 4 tokens per second, 4 burst capacity
                platform_now as fn() -> Duration,
            ),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started: {} at {}",
            self.pairing.identity().device_id,
            self.pairing.identity().local_addr
        );
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn is_paired(&self) -> bool {
        self.pairing.is_paired()
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.pairing.peer()
    }

    pub fn alert_active(&self) -> bool {
        self.alert.is_active()
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    pub fn identity(&self) -> &DeviceIdentity {
        self.pairing.identity()
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one sequencing tick: inbound poll → gesture classify →
    /// pairing/alert cadences.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + AlertOutputPort),
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        self.poll_inbound(now_ms, hw, net, sink);
        self.poll_sensors(now_ms, hw, net, sink);
        self.run_cadences(now_ms, hw, net, sink);
    }

    /// Process an external command (console, test harness).
    pub fn handle_command(
        &mut self,
        command: AppCommand,
        now_ms: u32,
        hw: &mut impl AlertOutputPort,
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        match command {
            AppCommand::TriggerAlert => self.trigger_alert(now_ms, hw, net, sink),
            AppCommand::ClearAlert => self.clear_alert(now_ms, hw, net, sink),
            AppCommand::Unpair => {
                if let Some(peer) = self.pairing.unpair() {
                    self.silence_outputs(hw, sink, AlertSource::PeerLoss);
                    sink.emit(&AppEvent::PairingLost { peer });
                }
            }
        }
    }

    /// Explicit offline calibration: sample baselines through the sensor
    /// port, derive thresholds, persist them. Never invoked automatically.
    pub fn run_calibration(
        &mut self,
        hw: &mut impl SensorPort,
        storage: &mut dyn StoragePort,
        rounds: u32,
        margin: u32,
    ) {
        self.calibration = sensors::calibrate(hw, rounds, margin);
        if let Err(e) = self.calibration.save(storage) {
            warn!("calibration: save failed ({}), thresholds active for this boot only", e);
        }
    }

    // ── Alert operations ──────────────────────────────────────

    /// Local trigger (gesture or command). No-op while unpaired — an
    /// unpaired device must never transmit to a stale address, and it
    /// shows no alerts of its own.
    fn trigger_alert(
        &mut self,
        now_ms: u32,
        hw: &mut impl AlertOutputPort,
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        let Some(peer) = self.pairing.peer() else {
            debug!("trigger ignored: not paired");
            return;
        };

        if let Err(e) = net.send(peer, &protocol::encode_alert(AlertCode::Trigger)) {
            warn!("alert: TRIGGER send to {} failed ({}), retry on next gesture", peer, e);
        }
        if self.alert.apply(AlertCode::Trigger, now_ms) == AlertTransition::Activated {
            hw.set_indicator(true);
            hw.start_tone_sequence();
            sink.emit(&AppEvent::AlertActivated {
                source: AlertSource::Local,
            });
        }
    }

    /// Local clear; notifies the peer when paired.
    fn clear_alert(
        &mut self,
        now_ms: u32,
        hw: &mut impl AlertOutputPort,
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        if let Some(peer) = self.pairing.peer() {
            if let Err(e) = net.send(peer, &protocol::encode_alert(AlertCode::Clear)) {
                warn!("alert: CLEAR send to {} failed ({})", peer, e);
            }
        }
        if self.alert.apply(AlertCode::Clear, now_ms) == AlertTransition::Deactivated {
            hw.set_indicator(false);
            hw.stop_tone_sequence();
            sink.emit(&AppEvent::AlertCleared {
                source: AlertSource::Local,
            });
        }
    }

    // ── Inbound path ──────────────────────────────────────────

    fn poll_inbound(
        &mut self,
        now_ms: u32,
        hw: &mut impl AlertOutputPort,
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        let mut buf = [0u8; 64];
        for _ in 0..self.config.max_inbound_per_tick {
            match net.recv(&mut buf) {
                Ok(Some((from, len))) => match protocol::decode(&buf[..len]) {
                    Ok(frame) => self.route_frame(frame, from, now_ms, hw, net, sink),
                    Err(e) => debug!("dropping malformed datagram from {}: {}", from, e),
                },
                Ok(None) => break,
                Err(e) => {
                    // Transient by contract — retry next tick.
                    debug!("inbound poll error: {}", e);
                    break;
                }
            }
        }
    }

    fn route_frame(
        &mut self,
        frame: Frame<'_>,
        from: SocketAddr,
        now_ms: u32,
        hw: &mut impl AlertOutputPort,
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        match frame {
            Frame::PairRequest => match self.pairing.request_pairing(from, now_ms) {
                PairingOutcome::Accepted => {
                    self.send_pair_confirm(from, net);
                    self.last_status_ms = now_ms;
                    sink.emit(&AppEvent::PairingEstablished { peer: from });
                }
                PairingOutcome::AlreadyPaired => {
                    // Same frontend re-asking (its confirm may have been
                    // lost) — the handshake is idempotent.
                    self.send_pair_confirm(from, net);
                }
                PairingOutcome::Rejected { .. } => {
                    sink.emit(&AppEvent::PairingRejected { from });
                }
            },

            Frame::Alert(code) => {
                if self.pairing.peer() == Some(from) {
                    self.pairing.note_traffic(from, now_ms);
                    self.apply_remote_alert(code, now_ms, hw, sink);
                } else {
                    debug!(
                        "dropping alert 0x{:02X} from non-paired sender {}",
                        code.as_byte(),
                        from
                    );
                }
            }

            Frame::Ack => {
                // Operator acknowledgement: liveness only, never alert state.
                self.pairing.note_traffic(from, now_ms);
            }

            Frame::Hello { .. } | Frame::PairConfirm { .. } => {
                // Controller-originated message types looped back to us.
                debug!("ignoring frontend-bound frame from {}", from);
            }
        }
    }

    fn apply_remote_alert(
        &mut self,
        code: AlertCode,
        now_ms: u32,
        hw: &mut impl AlertOutputPort,
        sink: &mut impl EventSink,
    ) {
        match self.alert.apply(code, now_ms) {
            AlertTransition::Activated => {
                hw.set_indicator(true);
                hw.start_tone_sequence();
                sink.emit(&AppEvent::AlertActivated {
                    source: AlertSource::Remote,
                });
            }
            AlertTransition::Deactivated => {
                hw.set_indicator(false);
                hw.stop_tone_sequence();
                sink.emit(&AppEvent::AlertCleared {
                    source: AlertSource::Remote,
                });
            }
            AlertTransition::Unchanged => {}
        }
    }

    // ── Sensors ───────────────────────────────────────────────

    fn poll_sensors(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + AlertOutputPort),
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        let readings = hw.read_channels();
        let direction = sensors::classify(readings, &self.calibration);

        // Edge, not level: holding a pad is one gesture.
        if direction != self.last_direction {
            self.last_direction = direction;
            if direction != Direction::None {
                sink.emit(&AppEvent::GestureDetected { direction });
                if direction == self.config.trigger_direction {
                    self.trigger_alert(now_ms, hw, net, sink);
                }
            }
        }
    }

    // ── Cadences ──────────────────────────────────────────────

    fn run_cadences(
        &mut self,
        now_ms: u32,
        hw: &mut impl AlertOutputPort,
        net: &mut impl DatagramPort,
        sink: &mut impl EventSink,
    ) {
        // Peer silence → unpaired, exactly once per episode.
        if let Some(peer) = self.pairing.check_silence(now_ms) {
            self.silence_outputs(hw, sink, AlertSource::PeerLoss);
            sink.emit(&AppEvent::PairingLost { peer });
        }

        // Stale active alert → local auto-clear.
        if self.alert.check_stale(now_ms) {
            hw.set_indicator(false);
            hw.stop_tone_sequence();
            sink.emit(&AppEvent::AlertCleared {
                source: AlertSource::StaleTimeout,
            });
        }

        if self.pairing.is_paired() {
            self.status_cadence(now_ms, net);
        } else {
            self.hello_cadence(now_ms, net);
        }
    }

    /// Unpaired discovery: broadcast a hello each interval so a frontend
    /// can find us.
    fn hello_cadence(&mut self, now_ms: u32, net: &mut impl DatagramPort) {
        let due = match self.last_hello_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.config.hello_interval_ms,
        };
        if !due || self.announce_limiter.try_consume(1).is_err() {
            return;
        }

        let dest = SocketAddr::from((Ipv4Addr::BROADCAST, self.config.peer_port));
        let frame = protocol::encode_hello(self.pairing.identity().device_id.as_str());
        match net.send(dest, &frame) {
            Ok(()) => debug!("hello broadcast sent"),
            Err(e) => debug!("hello broadcast failed ({}), retrying next interval", e),
        }
        self.last_hello_ms = Some(now_ms);
    }

    /// Paired heartbeat: report the current alert status byte. Doubles as
    /// the keepalive the frontend tracks.
    fn status_cadence(&mut self, now_ms: u32, net: &mut impl DatagramPort) {
        if now_ms.wrapping_sub(self.last_status_ms) < self.config.status_interval_ms {
            return;
        }
        if self.announce_limiter.try_consume(1).is_err() {
            return;
        }
        let Some(peer) = self.pairing.peer() else {
            return;
        };
        if let Err(e) = net.send(peer, &protocol::encode_alert(self.alert.status_code())) {
            debug!("status heartbeat to {} failed ({})", peer, e);
        }
        self.last_status_ms = now_ms;
    }

    // ── Helpers ───────────────────────────────────────────────

    fn send_pair_confirm(&mut self, to: SocketAddr, net: &mut impl DatagramPort) {
        let frame = protocol::encode_pair_confirm(self.pairing.identity().device_id.as_str());
        if let Err(e) = net.send(to, &frame) {
            // The frontend retries its request; the handshake heals itself.
            warn!("pair-confirm send to {} failed: {}", to, e);
        }
    }

    fn silence_outputs(
        &mut self,
        hw: &mut impl AlertOutputPort,
        sink: &mut impl EventSink,
        source: AlertSource,
    ) {
        if self.alert.force_clear() {
            hw.set_indicator(false);
            hw.stop_tone_sequence();
            sink.emit(&AppEvent::AlertCleared { source });
        }
    }
}

// ── Platform time for the rate limiter ───────────────────────

#[cfg(target_os = "espidf")]
fn platform_now() -> Duration {
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    Duration::from_micros(us as u64)
}

#[cfg(not(target_os = "espidf"))]
fn platform_now() -> Duration {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}
