//! Fuzz target: `protocol::decode` (inbound datagram path)
//!
//! Every datagram off the wire goes through this decoder before any state
//! is touched, so it must never panic and must only ever hand back the
//! closed set of frame variants.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Alert frames decode ONLY from 0xFF / 0x00 first bytes
//! - PairConfirm always carries exactly the fixed-length device ID
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use safewalk::protocol::{self, AlertCode, Frame};

fuzz_target!(|data: &[u8]| {
    match protocol::decode(data) {
        Ok(Frame::Alert(AlertCode::Trigger)) => assert_eq!(data[0], 0xFF),
        Ok(Frame::Alert(AlertCode::Clear)) => assert_eq!(data[0], 0x00),
        Ok(Frame::PairConfirm { device_id }) => {
            assert_eq!(device_id.len(), protocol::DEVICE_ID_WIRE_LEN);
        }
        Ok(_) | Err(_) => {}
    }
});
