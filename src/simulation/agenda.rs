//! Virtual-time agenda of pending wake-ups.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A process slot due to resume at `time`.
///
/// Ordered by time, then by scheduling order, so simultaneous wake-ups
/// fire first-in first-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Wakeup {
    time: i64,
    seq: u64,
    slot: usize,
}

/// Min-heap of wake-ups with insertion-order tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct Agenda {
    queue: BinaryHeap<Reverse<Wakeup>>,
    next_seq: u64,
}

impl Agenda {
    /// Creates an empty agenda.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `slot` to resume at `time`.
    pub fn schedule(&mut self, time: i64, slot: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Wakeup { time, seq, slot }));
    }

    /// Earliest wake-up time, if any.
    pub fn peek_time(&self) -> Option<i64> {
        self.queue.peek().map(|Reverse(w)| w.time)
    }

    /// Removes the earliest wake-up as `(time, slot)`.
    pub fn pop(&mut self) -> Option<(i64, usize)> {
        self.queue.pop().map(|Reverse(w)| (w.time, w.slot))
    }

    /// Number of pending wake-ups.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no wake-up is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
