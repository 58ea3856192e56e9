//! SafeWalk Controller Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink    NvsAdapter   UdpTransport  │
//! │  (Sensor+AlertOut)  (EventSink)     (Storage)    (Datagram)    │
//! │  WifiAdapter        BackendRegistrar                           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Pairing · Alert · Gesture classifier                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Tick queue (SPSC) · Watchdog supervisor · Tone sequencer      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
mod alert;
mod config;
mod diagnostics;
mod error;
mod events;
mod pairing;
mod pins;
mod protocol;

mod adapters;
mod app;
mod drivers;
mod sensors;

#[cfg(feature = "game-mode")]
mod game;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use core::net::{IpAddr, Ipv4Addr, SocketAddr};
use log::{info, warn};

use adapters::backend::BackendRegistrar;
use adapters::device_id;
use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsAdapter;
use adapters::time::MonotonicClock;
use adapters::udp::UdpTransport;
use adapters::wifi::WifiAdapter;
use app::service::AppService;
use config::SafeWalkConfig;
use drivers::status_led::StatusLed;
use drivers::watchdog::Watchdog;
use events::Event;
use pairing::DeviceIdentity;
use sensors::touch::TouchPadHub;
use sensors::CalibrationTable;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("╔══════════════════════════════════════╗");
    info!("║  SafeWalk controller v{}           ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();
    diagnostics::log_reset_reason();

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical; bail and let the
        // supervisor (or the operator) restart us.
        anyhow::bail!("HAL init failed: {}", e);
    }

    // ── 3. Config from NVS (or defaults) ──────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            anyhow::bail!("NVS init failed: {}", e);
        }
    };
    let config = match SafeWalkConfig::load(&nvs) {
        Some(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        None => {
            info!("No stored config, using defaults");
            SafeWalkConfig::default()
        }
    };

    // Surface anything the crash ring captured on previous runs.
    let mut crash_log = diagnostics::CrashLog::new();
    crash_log.init(&nvs);
    for entry in crash_log.read_all(&nvs) {
        warn!(
            "previous failure at uptime {}s: {}",
            entry.uptime_secs, entry.reason
        );
    }

    let clock = MonotonicClock::new();

    // ── 4. WiFi station ───────────────────────────────────────
    // Credentials are baked in at build time (the Rust stand-in for the
    // git-ignored credentials header).
    let mut wifi = WifiAdapter::new();
    match (option_env!("SAFEWALK_WIFI_SSID"), option_env!("SAFEWALK_WIFI_PASS")) {
        (Some(ssid), Some(pass)) => {
            if let Err(e) = wifi.set_credentials(ssid, pass) {
                warn!("WiFi credentials rejected: {}", e);
            } else if let Err(e) = wifi.connect(clock.now_ms()) {
                // Transient: poll() keeps retrying with backoff.
                warn!("WiFi connect failed ({}), retrying in background", e);
            }
        }
        _ => warn!("No WiFi credentials baked in; running link-local only"),
    }

    // ── 5. Identity + transport ───────────────────────────────
    let mac = device_id::read_mac();
    let dev_id = device_id::device_id(&mac);
    let local_ip = wifi
        .local_ip()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), IpAddr::V4);
    let identity = DeviceIdentity {
        device_id: dev_id,
        local_addr: SocketAddr::new(local_ip, config.listen_port),
    };
    info!("Device ID: {} at {}", identity.device_id, identity.local_addr);

    let mut udp = match UdpTransport::bind(config.listen_port) {
        Ok(t) => t,
        Err(e) => anyhow::bail!("UDP bind failed: {}", e),
    };

    // ── 6. Calibration ────────────────────────────────────────
    let calibration = match CalibrationTable::load(&nvs) {
        Some(t) => {
            info!("Calibration loaded: {:?}", t.thresholds);
            t
        }
        None => {
            warn!("No stored calibration, using factory thresholds");
            CalibrationTable::default()
        }
    };

    // ── 7. Liveness + timing core ─────────────────────────────
    let mut watchdog = Watchdog::arm(config.watchdog_timeout_ms, clock.now_ms());
    drivers::hw_timer::start_timers(config.watchdog_pet_interval_ms, config.sequence_tick_ms);

    // ── 8. Hardware adapter + app service ─────────────────────
    let mut hw = HardwareAdapter::new(TouchPadHub::new(pins::TOUCH_GPIOS), StatusLed::new());
    let mut sink = LogEventSink::new();
    let mut registrar = BackendRegistrar::new(config.backend_addr);

    let mut service = AppService::new(config.clone(), identity, calibration);
    service.start(&mut sink);

    info!("System ready. Entering event loop.");

    // ── 9. Event loop ─────────────────────────────────────────
    #[cfg(not(target_os = "espidf"))]
    let watchdog_tick_divider =
        (config.watchdog_pet_interval_ms / config.sequence_tick_ms).max(1);
    #[cfg(not(target_os = "espidf"))]
    let mut sim_counter: u32 = 0;

    loop {
        // Simulate the timer interrupts via sleep on non-espidf targets.
        // On real hardware the esp_timer callbacks feed the queue and the
        // sleep just yields between drains.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(
                config.sequence_tick_ms,
            )));
            sim_counter = sim_counter.wrapping_add(1);
            drivers::hw_timer::sim_tick(sim_counter, watchdog_tick_divider);
        }
        #[cfg(target_os = "espidf")]
        std::thread::sleep(std::time::Duration::from_millis(2));

        // Process all pending ticks.
        let mut pending = events::queue_len();
        while pending > 0 {
            let Some(event) = events::pop_event() else { break };
            pending -= 1;
            let now_ms = clock.now_ms();
            match event {
                Event::WatchdogTick => {
                    watchdog.pet(now_ms);
                }
                Event::SequenceTick => {
                    hw.service_tone_tick(config.sequence_tick_ms);
                    service.tick(now_ms, &mut hw, &mut udp, &mut sink);
                }
            }
        }

        let now_ms = clock.now_ms();

        // WiFi reconnection pump (exponential backoff).
        wifi.poll(now_ms);

        // One-shot backend registration once the link is up.
        if wifi.is_connected() {
            registrar.maybe_register(service.identity(), &mut udp, now_ms);
        }

        // Host simulation treats a missed deadline as the hardware reset.
        #[cfg(not(target_os = "espidf"))]
        {
            use drivers::watchdog::WatchdogVerdict;
            if watchdog.expired(now_ms) == WatchdogVerdict::Fired {
                drivers::hw_timer::stop_timers();
                anyhow::bail!("watchdog expired — simulated device reset");
            }
        }
    }
}
