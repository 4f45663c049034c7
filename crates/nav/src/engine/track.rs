//! Short location histories kept between turns.

use std::collections::VecDeque;

use crate::types::Pos;

/// Most recent squares the agent stood on, oldest first; the oldest entry
/// falls off once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct StepTrack {
    squares: VecDeque<Pos>,
    capacity: usize,
}

impl StepTrack {
    pub fn new(capacity: usize) -> Self {
        Self { squares: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, pos: Pos) {
        if self.squares.len() == self.capacity {
            self.squares.pop_front();
        }
        self.squares.push_back(pos);
    }

    /// Records a move, filling in the starting square if the history lost it.
    pub fn arrive(&mut self, from: Pos, to: Pos) {
        if self.squares.back() != Some(&from) {
            self.push(from);
        }
        self.push(to);
    }

    pub fn last(&self) -> Option<Pos> {
        self.squares.back().copied()
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.squares.iter().copied()
    }

    /// True when stepping from `here` to `next` would repeat `here, next, here, next`.
    pub fn would_bounce(&self, here: Pos, next: Pos) -> bool {
        let len = self.squares.len();
        if len < 3 {
            return false;
        }
        self.squares[len - 1] == here
            && self.squares[len - 2] == next
            && self.squares[len - 3] == here
    }
}

/// Doors the agent shut itself; bounded so door-closing can't loop forever.
#[derive(Clone, Debug)]
pub struct DoorTrack {
    doors: Vec<Pos>,
    capacity: usize,
}

impl DoorTrack {
    pub fn new(capacity: usize) -> Self {
        Self { doors: Vec::new(), capacity }
    }

    pub fn is_full(&self) -> bool {
        self.doors.len() >= self.capacity
    }

    pub fn remember(&mut self, pos: Pos) {
        if !self.contains(pos) && !self.is_full() {
            self.doors.push(pos);
        }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.doors.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }
}
