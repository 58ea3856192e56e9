//! Sensor subsystem — gesture classification over four capacitive channels.
//!
//! The classifier turns four raw proximity magnitudes into a discrete
//! [`Direction`]. Thresholds come from an explicit calibration pass and are
//! persisted through the [`StoragePort`](crate::app::ports::StoragePort);
//! classification itself is pure and runs on every sensor-poll tick.

pub mod touch;

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::{SensorPort, StorageError, StoragePort};

const CALIBRATION_NAMESPACE: &str = "touch";
const CALIBRATION_KEY: &str = "thresholds";

/// Number of physical touch channels.
pub const CHANNEL_COUNT: usize = 4;

// ── Direction ─────────────────────────────────────────────────

/// Discrete gesture direction, one per touch channel, or none.
///
/// When several channels exceed their threshold in the same sample the
/// classifier returns the first match in the fixed priority order
/// UP, RIGHT, DOWN, LEFT. The order is a deliberate, documented choice —
/// channel indices follow it throughout the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
    None,
}

impl Direction {
    /// Channel index for a real direction; `None` has no channel.
    pub const fn channel(self) -> Option<usize> {
        match self {
            Self::Up => Some(0),
            Self::Right => Some(1),
            Self::Down => Some(2),
            Self::Left => Some(3),
            Self::None => None,
        }
    }

    const PRIORITY: [Direction; CHANNEL_COUNT] =
        [Self::Up, Self::Right, Self::Down, Self::Left];
}

// ── Calibration ───────────────────────────────────────────────

/// Per-channel trigger thresholds, in raw charge-time units.
///
/// Produced by [`calibrate`] and persisted between boots; normal operation
/// never recalibrates on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationTable {
    pub thresholds: [u32; CHANNEL_COUNT],
}

impl Default for CalibrationTable {
    fn default() -> Self {
        // Conservative factory defaults; a real fit comes from calibrate().
        Self {
            thresholds: [1200; CHANNEL_COUNT],
        }
    }
}

impl CalibrationTable {
    /// Load a stored table, or `None` when no calibration has been saved.
    pub fn load(storage: &dyn StoragePort) -> Option<Self> {
        let mut buf = [0u8; 64];
        let n = storage
            .read(CALIBRATION_NAMESPACE, CALIBRATION_KEY, &mut buf)
            .ok()?;
        postcard::from_bytes(&buf[..n]).ok()
    }

    /// Persist the table.
    pub fn save(&self, storage: &mut dyn StoragePort) -> Result<(), StorageError> {
        let bytes = postcard::to_allocvec(self).map_err(|_| StorageError::IoError)?;
        storage.write(CALIBRATION_NAMESPACE, CALIBRATION_KEY, &bytes)
    }
}

/// Explicit offline calibration step.
///
/// Samples every channel `rounds` times while the pads are untouched,
/// averages the baseline, and sets each threshold to baseline + `margin`.
pub fn calibrate(
    sensors: &mut impl SensorPort,
    rounds: u32,
    margin: u32,
) -> CalibrationTable {
    let rounds = rounds.max(1);
    let mut sums = [0u64; CHANNEL_COUNT];
    for _ in 0..rounds {
        let sample = sensors.read_channels();
        for (sum, raw) in sums.iter_mut().zip(sample) {
            *sum += u64::from(raw);
        }
    }

    let mut thresholds = [0u32; CHANNEL_COUNT];
    for (threshold, sum) in thresholds.iter_mut().zip(sums) {
        let baseline = (sum / u64::from(rounds)) as u32;
        *threshold = baseline.saturating_add(margin);
    }
    info!("calibrate: thresholds={:?} (margin={})", thresholds, margin);
    CalibrationTable { thresholds }
}

// ── Classification ────────────────────────────────────────────

/// Classify one sample of raw channel magnitudes against the calibration
/// table. First channel over threshold in priority order wins.
pub fn classify(readings: [u32; CHANNEL_COUNT], table: &CalibrationTable) -> Direction {
    for dir in Direction::PRIORITY {
        // PRIORITY only holds real directions, so channel() is always Some.
        if let Some(ch) = dir.channel() {
            if readings[ch] > table.thresholds[ch] {
                return dir;
            }
        }
    }
    Direction::None
}

// ── Tests ─────────────────────────────────────────────────────
