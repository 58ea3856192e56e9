//! Wire protocol shared with the frontend.
//!
//! Two layers ride the same UDP socket pair:
//!
//! - **Alert channel** — exactly one byte per datagram. `0xFF` requests an
//!   alert, `0x00` clears it. Every other value on this layer is malformed
//!   and dropped.
//! - **Discovery/control channel** — single-byte opcodes with optional
//!   payload, used for hello announcements and the pairing handshake.
//!
//! ```text
//! ┌────────┬──────────────────────────────┐
//! │ code(1)│ payload (0..=23 bytes)       │
//! └────────┴──────────────────────────────┘
//! ```
//!
//! The PAIR_CONFIRM payload is the 17-byte MAC-address text of the
//! confirming controller; the frontend slices bytes `1..18` out of the
//! datagram, so the length is part of the contract.

use core::fmt;

// ── Wire codes ────────────────────────────────────────────────

/// Alert requested ("all ones").
pub const CODE_TRIGGER: u8 = 0xFF;
/// No alert ("all zeros").
pub const CODE_CLEAR: u8 = 0x00;
/// Unpaired controller announcing itself.
pub const CODE_HELLO: u8 = 0xAA;
/// Frontend asking to pair.
pub const CODE_PAIR_REQUEST: u8 = 0xBB;
/// Controller confirming a pairing, payload = device ID text.
pub const CODE_PAIR_CONFIRM: u8 = 0xCC;
/// Operator acknowledged the alert on the frontend.
pub const CODE_ACK: u8 = 0x01;

/// MAC-address text length the frontend expects after PAIR_CONFIRM.
pub const DEVICE_ID_WIRE_LEN: usize = 17;

/// Largest frame we ever produce or accept: code + device ID payload.
pub const MAX_FRAME_LEN: usize = 1 + 23;

// ── Alert codes ───────────────────────────────────────────────

/// The two valid encodings of an alert packet. Anything else on the alert
/// layer decodes to [`FrameError::UnknownCode`] and is dropped by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCode {
    Trigger,
    Clear,
}

impl AlertCode {
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Trigger => CODE_TRIGGER,
            Self::Clear => CODE_CLEAR,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CODE_TRIGGER => Some(Self::Trigger),
            CODE_CLEAR => Some(Self::Clear),
            _ => None,
        }
    }

    /// The code representing an output state (`true` = alert active).
    pub const fn for_state(active: bool) -> Self {
        if active { Self::Trigger } else { Self::Clear }
    }
}

// ── Frames ────────────────────────────────────────────────────

/// A decoded inbound datagram. Borrows payload bytes from the receive
/// buffer — nothing on this path allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// One-byte alert packet.
    Alert(AlertCode),
    /// Announce from another device; payload is its ID text (may be empty).
    Hello { device_id: &'a [u8] },
    /// Frontend requests pairing with this controller.
    PairRequest,
    /// Pairing confirmation; payload is the confirming device's ID text.
    PairConfirm { device_id: &'a [u8] },
    /// Frontend operator acknowledged the alert. Liveness only.
    Ack,
}

/// Decode failures. Malformed frames are dropped by the caller without
/// side effects; the variants exist for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Zero-length datagram.
    Empty,
    /// Oversized datagram (longer than any frame we define).
    Oversized(usize),
    /// First byte is not a known alert or control code.
    UnknownCode(u8),
    /// Alert code with trailing bytes (alert packets are exactly one byte).
    BadAlertLength(usize),
    /// PAIR_CONFIRM without the full device-ID payload.
    ShortPairConfirm(usize),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty datagram"),
            Self::Oversized(n) => write!(f, "oversized datagram ({n} bytes)"),
            Self::UnknownCode(b) => write!(f, "unknown code 0x{b:02X}"),
            Self::BadAlertLength(n) => write!(f, "alert packet with {n} bytes"),
            Self::ShortPairConfirm(n) => {
                write!(f, "pair-confirm too short ({n} bytes)")
            }
        }
    }
}

/// Decode one inbound datagram.
pub fn decode(buf: &[u8]) -> Result<Frame<'_>, FrameError> {
    let (&code, payload) = buf.split_first().ok_or(FrameError::Empty)?;
    if buf.len() > MAX_FRAME_LEN {
        return Err(FrameError::Oversized(buf.len()));
    }
    match code {
        CODE_TRIGGER | CODE_CLEAR if !payload.is_empty() => {
            Err(FrameError::BadAlertLength(buf.len()))
        }
        CODE_TRIGGER => Ok(Frame::Alert(AlertCode::Trigger)),
        CODE_CLEAR => Ok(Frame::Alert(AlertCode::Clear)),
        CODE_HELLO => Ok(Frame::Hello { device_id: payload }),
        CODE_PAIR_REQUEST => Ok(Frame::PairRequest),
        CODE_PAIR_CONFIRM => {
            if payload.len() < DEVICE_ID_WIRE_LEN {
                return Err(FrameError::ShortPairConfirm(buf.len()));
            }
            Ok(Frame::PairConfirm {
                device_id: &payload[..DEVICE_ID_WIRE_LEN],
            })
        }
        CODE_ACK => Ok(Frame::Ack),
        other => Err(FrameError::UnknownCode(other)),
    }
}

// ── Encoding ──────────────────────────────────────────────────

/// Encode a one-byte alert packet.
pub const fn encode_alert(code: AlertCode) -> [u8; 1] {
    [code.as_byte()]
}

/// Encode a hello announce carrying this device's ID text.
pub fn encode_hello(device_id: &str) -> heapless::Vec<u8, MAX_FRAME_LEN> {
    let mut frame = heapless::Vec::new();
    // Infallible: 1 + 23 bytes fits the vec by construction.
    let _ = frame.push(CODE_HELLO);
    let _ = frame.extend_from_slice(&device_id.as_bytes()[..device_id.len().min(MAX_FRAME_LEN - 1)]);
    frame
}

/// Encode a pairing confirmation. The device ID is padded with spaces or
/// truncated to exactly [`DEVICE_ID_WIRE_LEN`] bytes — the frontend slices
/// a fixed range.
pub fn encode_pair_confirm(device_id: &str) -> heapless::Vec<u8, MAX_FRAME_LEN> {
    let mut frame = heapless::Vec::new();
    let _ = frame.push(CODE_PAIR_CONFIRM);
    let bytes = device_id.as_bytes();
    for i in 0..DEVICE_ID_WIRE_LEN {
        let _ = frame.push(*bytes.get(i).unwrap_or(&b' '));
    }
    frame
}

// ── Tests ─────────────────────────────────────────────────────
