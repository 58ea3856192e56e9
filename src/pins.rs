//! GPIO / peripheral pin assignments for the SafeWalk controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Capacitive touch pads (charge-time sensing)
// ---------------------------------------------------------------------------

/// Touch pad for the UP gesture channel.
pub const TOUCH_UP_GPIO: i32 = 6;
/// Touch pad for the RIGHT gesture channel.
pub const TOUCH_RIGHT_GPIO: i32 = 7;
/// Touch pad for the DOWN gesture channel.
pub const TOUCH_DOWN_GPIO: i32 = 8;
/// Touch pad for the LEFT gesture channel.
pub const TOUCH_LEFT_GPIO: i32 = 9;

/// All four touch channels in classifier priority order
/// (UP, RIGHT, DOWN, LEFT).
pub const TOUCH_GPIOS: [i32; 4] = [
    TOUCH_UP_GPIO,
    TOUCH_RIGHT_GPIO,
    TOUCH_DOWN_GPIO,
    TOUCH_LEFT_GPIO,
];

// ---------------------------------------------------------------------------
// Alert outputs
// ---------------------------------------------------------------------------

/// Digital output: alert indicator LED (active HIGH).
pub const ALERT_LED_GPIO: i32 = 12;

/// Piezo speaker, driven by an LEDC PWM channel at the note frequency.
pub const PIEZO_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits) for the piezo channel.
pub const PIEZO_PWM_RESOLUTION_BITS: u32 = 8;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
