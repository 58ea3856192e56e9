//! Device identity derived from the factory MAC address.
//!
//! The MAC-address text doubles as the stable device ID the frontend and
//! backend use to refer to this controller:
//! - Deterministic across reboots (factory-burned eFuse MAC)
//! - Sent in the PAIR_CONFIRM payload (fixed 17-byte text)
//! - Reported in the backend registration payload

use crate::pairing::DeviceIdString;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: esp_efuse_mac_get_default writes exactly 6 bytes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Render the MAC as colon-separated uppercase hex text
/// (e.g. `DE:AD:BE:EF:CA:FE`), the wire form of the device ID.
pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    use core::fmt::Write;
    let _ = write!(
        id,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    id
}
