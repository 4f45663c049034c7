//! Fixed-capacity circular frontier queue for one flood fill.

use crate::types::Pos;

/// Ring buffer of squares; `head == tail` means empty, so one slot is never used.
/// A push into a full ring is dropped and counted, never blocking or growing.
#[derive(Clone, Debug)]
pub struct FlowQueue {
    slots: Vec<Pos>,
    head: usize,
    tail: usize,
    dropped: u32,
}

impl FlowQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: vec![Pos { y: 0, x: 0 }; capacity.max(2)], head: 0, tail: 0, dropped: 0 }
    }

    /// Entries that fit at once.
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn len(&self) -> usize {
        (self.head + self.slots.len() - self.tail) % self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Returns `false` when the entry was dropped for lack of room.
    pub fn push(&mut self, pos: Pos) -> bool {
        let next_head = (self.head + 1) % self.slots.len();
        if next_head == self.tail {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        self.slots[self.head] = pos;
        self.head = next_head;
        true
    }

    pub fn pop(&mut self) -> Option<Pos> {
        if self.is_empty() {
            return None;
        }
        let pos = self.slots[self.tail];
        self.tail = (self.tail + 1) % self.slots.len();
        Some(pos)
    }

    /// Drops since the last `clear`.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.dropped = 0;
    }
}
