//! Alert tone sequencer.
//!
//! Steps through a `{frequency, duration}` note list one sequencing tick
//! at a time. The sequencer itself is pure bookkeeping: each tick it
//! reports what the speaker should do next ([`ToneStep`]), and the
//! hardware adapter turns that into PWM writes. On exhaustion it silences
//! the speaker and disarms itself.
//!
//! Stopping mid-playback is a request, not a guarantee — the flag is
//! honored at the next tick boundary, so the note in flight completes its
//! current tick window.

/// One note of the alert melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub freq_hz: u16,
    pub duration_ms: u16,
}

/// Capacity of a note sequence.
pub const MAX_NOTES: usize = 100;

/// Two-tone siren, repeated — loud and unambiguous on a small piezo.
pub const ALERT_SEQUENCE: [Note; 8] = [
    Note { freq_hz: 880, duration_ms: 250 },
    Note { freq_hz: 660, duration_ms: 250 },
    Note { freq_hz: 880, duration_ms: 250 },
    Note { freq_hz: 660, duration_ms: 250 },
    Note { freq_hz: 880, duration_ms: 250 },
    Note { freq_hz: 660, duration_ms: 250 },
    Note { freq_hz: 880, duration_ms: 250 },
    Note { freq_hz: 660, duration_ms: 250 },
];

/// What the speaker should do after one sequencing tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneStep {
    /// Start (or restart) emitting this note.
    Play(Note),
    /// Keep emitting the current note.
    Sustain,
    /// Stop emitting; the sequencer just disarmed.
    Silence,
    /// Nothing armed.
    Idle,
}

pub struct ToneSequencer {
    notes: heapless::Vec<Note, MAX_NOTES>,
    position: usize,
    /// Milliseconds left in the current note's window.
    remaining_ms: u32,
    armed: bool,
    stop_requested: bool,
}

impl ToneSequencer {
    pub fn new() -> Self {
        Self {
            notes: heapless::Vec::new(),
            position: 0,
            remaining_ms: 0,
            armed: false,
            stop_requested: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Arm a sequence from the start. Notes beyond [`MAX_NOTES`] are
    /// dropped. Re-arming while playing restarts the melody.
    pub fn arm(&mut self, notes: &[Note]) {
        self.notes.clear();
        for note in notes.iter().take(MAX_NOTES) {
            // Infallible: bounded by take(MAX_NOTES).
            let _ = self.notes.push(*note);
        }
        self.position = 0;
        self.remaining_ms = 0;
        self.armed = !self.notes.is_empty();
        self.stop_requested = false;
    }

    /// Request stop at the next tick boundary.
    pub fn request_stop(&mut self) {
        if self.armed {
            self.stop_requested = true;
        }
    }

    /// Advance one sequencing tick of `tick_ms` milliseconds.
    pub fn advance(&mut self, tick_ms: u32) -> ToneStep {
        if !self.armed {
            return ToneStep::Idle;
        }
        if self.stop_requested {
            self.disarm();
            return ToneStep::Silence;
        }

        if self.remaining_ms > tick_ms {
            self.remaining_ms -= tick_ms;
            return ToneStep::Sustain;
        }

        // Current note window exhausted — move to the next note.
        match self.notes.get(self.position).copied() {
            Some(note) => {
                self.position += 1;
                self.remaining_ms = u32::from(note.duration_ms);
                ToneStep::Play(note)
            }
            None => {
                self.disarm();
                ToneStep::Silence
            }
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.stop_requested = false;
        self.position = 0;
        self.remaining_ms = 0;
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: u32 = 25;

    fn two_notes() -> [Note; 2] {
        [
            Note { freq_hz: 440, duration_ms: 50 },
            Note { freq_hz: 220, duration_ms: 25 },
        ]
    }

    #[test]
    fn idle_when_unarmed() {
        let mut seq = ToneSequencer::new();
        assert_eq!(seq.advance(TICK), ToneStep::Idle);
    }

    #[test]
    fn plays_notes_then_silences_and_disarms() {
        let mut seq = ToneSequencer::new();
        seq.arm(&two_notes());

        assert_eq!(
            seq.advance(TICK),
            ToneStep::Play(Note { freq_hz: 440, duration_ms: 50 })
        );
        assert_eq!(seq.advance(TICK), ToneStep::Sustain);
        assert_eq!(
            seq.advance(TICK),
            ToneStep::Play(Note { freq_hz: 220, duration_ms: 25 })
        );
        assert_eq!(seq.advance(TICK), ToneStep::Silence);
        assert!(!seq.is_armed());
        assert_eq!(seq.advance(TICK), ToneStep::Idle);
    }

    #[test]
    fn exhausts_after_sum_of_note_windows() {
        let mut seq = ToneSequencer::new();
        seq.arm(&ALERT_SEQUENCE);
        let total_ms: u32 = ALERT_SEQUENCE
            .iter()
            .map(|n| u32::from(n.duration_ms))
            .sum();

        let mut ticks = 0u32;
        loop {
            match seq.advance(TICK) {
                ToneStep::Silence => break,
                ToneStep::Idle => panic!("disarmed without a Silence step"),
                _ => ticks += 1,
            }
        }
        assert_eq!(ticks, total_ms / TICK);
    }

    #[test]
    fn stop_is_honored_at_next_tick() {
        let mut seq = ToneSequencer::new();
        seq.arm(&two_notes());
        assert!(matches!(seq.advance(TICK), ToneStep::Play(_)));

        seq.request_stop();
        // Still armed until the boundary.
        assert!(seq.is_armed());
        assert_eq!(seq.advance(TICK), ToneStep::Silence);
        assert!(!seq.is_armed());
    }

    #[test]
    fn rearm_restarts_from_the_top() {
        let mut seq = ToneSequencer::new();
        seq.arm(&two_notes());
        let _ = seq.advance(TICK);
        let _ = seq.advance(TICK);

        seq.arm(&two_notes());
        assert_eq!(
            seq.advance(TICK),
            ToneStep::Play(Note { freq_hz: 440, duration_ms: 50 })
        );
    }

    #[test]
    fn stop_on_unarmed_is_a_no_op() {
        let mut seq = ToneSequencer::new();
        seq.request_stop();
        assert_eq!(seq.advance(TICK), ToneStep::Idle);
    }
}
