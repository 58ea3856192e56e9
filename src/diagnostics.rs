//! Crash logging and boot diagnostics.
//!
//! Stores up to 4 crash entries in an NVS ring buffer under the "crash"
//! namespace. A custom panic handler writes the entry before the TWDT or
//! panic machinery resets the chip, so the reason survives the reboot.
//! After a watchdog reset there is no panic to record — the boot path
//! logs the reset reason instead.

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};

const CRASH_RING_SLOTS: usize = 4;
const CRASH_NAMESPACE: &str = "crash";
const CRASH_INDEX_KEY: &str = "crash_idx";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrashEntry {
    pub uptime_secs: u64,
    pub reason: heapless::String<64>,
}

impl CrashEntry {
    pub fn new(uptime_secs: u64, reason: &str) -> Self {
        let mut r = heapless::String::new();
        let _ = r.push_str(&reason[..reason.len().min(63)]);
        Self {
            uptime_secs,
            reason: r,
        }
    }
}

/// NVS-backed ring buffer for crash entries.
#[derive(Default)]
pub struct CrashLog {
    write_index: usize,
}

impl CrashLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the write index from NVS, or default to 0.
    pub fn init(&mut self, storage: &dyn StoragePort) {
        let mut buf = [0u8; 4];
        if let Ok(4) = storage.read(CRASH_NAMESPACE, CRASH_INDEX_KEY, &mut buf) {
            self.write_index = u32::from_le_bytes(buf) as usize % CRASH_RING_SLOTS;
        }
    }

    /// Write a crash entry to the next ring slot and advance the index.
    pub fn write_entry(
        &mut self,
        storage: &mut dyn StoragePort,
        entry: &CrashEntry,
    ) -> Result<(), StorageError> {
        let key = slot_key(self.write_index);
        let bytes = postcard::to_allocvec(entry).map_err(|_| StorageError::IoError)?;
        storage.write(CRASH_NAMESPACE, key, &bytes)?;

        self.write_index = (self.write_index + 1) % CRASH_RING_SLOTS;
        storage.write(
            CRASH_NAMESPACE,
            CRASH_INDEX_KEY,
            &(self.write_index as u32).to_le_bytes(),
        )
    }

    /// Read every stored entry, oldest slot order not guaranteed.
    pub fn read_all(&self, storage: &dyn StoragePort) -> Vec<CrashEntry> {
        let mut entries = Vec::new();
        let mut buf = [0u8; 128];
        for slot in 0..CRASH_RING_SLOTS {
            if let Ok(n) = storage.read(CRASH_NAMESPACE, slot_key(slot), &mut buf) {
                if let Ok(entry) = postcard::from_bytes::<CrashEntry>(&buf[..n]) {
                    entries.push(entry);
                }
            }
        }
        entries
    }
}

fn slot_key(slot: usize) -> &'static str {
    match slot {
        0 => "crash0",
        1 => "crash1",
        2 => "crash2",
        _ => "crash3",
    }
}

/// Install a panic hook that logs the panic message before the reset
/// machinery takes over. The boot path owns the [`CrashLog`] and surfaces
/// any stored entries on the next start.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("PANIC: {}", panic_info);
    }));
}

/// Log why the chip (re)booted. A TWDT reset here is the liveness
/// supervisor doing its job — worth calling out loudly in the log.
#[cfg(target_os = "espidf")]
pub fn log_reset_reason() {
    // SAFETY: esp_reset_reason is a pure query.
    let reason = unsafe { esp_idf_svc::sys::esp_reset_reason() };
    if reason == esp_idf_svc::sys::esp_reset_reason_t_ESP_RST_TASK_WDT
        || reason == esp_idf_svc::sys::esp_reset_reason_t_ESP_RST_WDT
    {
        error!("boot: previous run ended in a WATCHDOG reset");
    } else {
        info!("boot: reset reason code {}", reason);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn log_reset_reason() {
    info!("boot: host simulation start");
}
