//! Interrupt-driven tick event system.
//!
//! Events are produced by the two hardware timer callbacks (watchdog
//! cadence and sequencing cadence) and consumed by the main control loop,
//! one at a time, in arrival order. Handler bodies stay trivial — a single
//! lock-free push — and every consequence (petting, tone stepping, sensor
//! polling, network I/O) happens in the consumer.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Watchdog timer cb│────▶│              │     │              │
//! │ Sequence timer cb│────▶│  Tick Queue  │────▶│  Main Loop   │
//! │                  │     │  (lock-free) │     │  (consumer)  │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending ticks.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

/// Tick sources. Within one source ticks arrive in order; the two sources
/// are independent and may interleave arbitrarily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Watchdog-cadence timer fired — the main loop must pet.
    WatchdogTick = 0,
    /// Sequencing-cadence timer fired — advance tones, poll sensors,
    /// service the network.
    SequenceTick = 1,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Timer callbacks write (produce), main loop reads (consume).
// Uses atomic head/tail indices. The buffer is intentionally
// kept in a static so ISR callbacks can access it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER slots are published through the head/tail atomics.
// Producer (push_event): timer-callback context — one writer.
// Consumer (pop_event): main-loop task — one reader.
// The Release store on EVENT_HEAD happens-after the slot write, and the
// Acquire load in pop_event happens-before the slot read, so no slot is
// read while it is being written.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push a tick into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (tick dropped — the consumer will
/// re-check state on the next tick anyway).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop tick.
    }

    // SAFETY: Single producer; the slot at `head` is not visible to the
    // consumer until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next tick from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    // SAFETY: Single consumer; the producer published this slot before the
    // head store we just observed.
    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending ticks into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Number of pending ticks.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::WatchdogTick),
        1 => Some(Event::SequenceTick),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The queue is a process-wide static; serialize tests touching it.
    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn drain_all() {
        while pop_event().is_some() {}
    }

    #[test]
    fn fifo_order_within_run() {
        let _guard = TEST_LOCK.lock().unwrap();
        drain_all();
        assert!(push_event(Event::WatchdogTick));
        assert!(push_event(Event::SequenceTick));
        assert!(push_event(Event::SequenceTick));

        let mut seen = Vec::new();
        drain_events(|e| seen.push(e));
        assert_eq!(
            seen,
            vec![Event::WatchdogTick, Event::SequenceTick, Event::SequenceTick]
        );
        assert_eq!(queue_len(), 0);
    }

    #[test]
    fn full_queue_drops_ticks() {
        let _guard = TEST_LOCK.lock().unwrap();
        drain_all();
        // Capacity is CAP - 1 for a ring with one sentinel slot.
        for _ in 0..EVENT_QUEUE_CAP - 1 {
            assert!(push_event(Event::SequenceTick));
        }
        assert!(!push_event(Event::SequenceTick), "full queue must drop");
        drain_all();
    }
}
