//! Per-square cost layers for one map.
//! This module owns storage and indexing only; propagation rules live elsewhere.

use crate::types::{IMPASSABLE, Pos};

/// Row-major layers sized to the map at load time.
///
/// `cost` is the working field of the current sweep, `flow` the frozen copy of
/// the last committed sweep. `None` means the sweep never reached the square.
/// `known`/`icky` cache hazard verdicts across sweeps until explicitly wiped.
#[derive(Clone, Debug)]
pub struct CostGrid {
    width: usize,
    height: usize,
    hard: Vec<u8>,
    cost: Vec<Option<u16>>,
    flow: Vec<Option<u16>>,
    known: Vec<bool>,
    icky: Vec<bool>,
}

impl CostGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            hard: vec![IMPASSABLE; len],
            cost: vec![None; len],
            flow: vec![None; len],
            known: vec![false; len],
            icky: vec![false; len],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn pos_of(&self, idx: usize) -> Pos {
        Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 }
    }

    pub fn load_hard(&mut self, mut hard_at: impl FnMut(Pos) -> u8) {
        for idx in 0..self.hard.len() {
            self.hard[idx] = hard_at(self.pos_of(idx));
        }
    }

    pub fn hard(&self, pos: Pos) -> u8 {
        self.index(pos).map_or(IMPASSABLE, |idx| self.hard[idx])
    }

    pub fn reset_costs(&mut self) {
        self.cost.fill(None);
    }

    pub fn wipe_hazards(&mut self) {
        self.known.fill(false);
        self.icky.fill(false);
    }

    pub fn cost(&self, pos: Pos) -> Option<u16> {
        self.index(pos).and_then(|idx| self.cost[idx])
    }

    pub(crate) fn cost_at(&self, idx: usize) -> Option<u16> {
        self.cost[idx]
    }

    pub(crate) fn set_cost_at(&mut self, idx: usize, cost: u16) {
        self.cost[idx] = Some(cost);
    }

    pub fn flow(&self, pos: Pos) -> Option<u16> {
        self.index(pos).and_then(|idx| self.flow[idx])
    }

    pub fn commit_flow(&mut self) {
        self.flow.clone_from(&self.cost);
    }

    pub(crate) fn hazard_at(&self, idx: usize) -> Option<bool> {
        self.known[idx].then_some(self.icky[idx])
    }

    pub(crate) fn mark_hazard_at(&mut self, idx: usize, icky: bool) {
        self.known[idx] = true;
        self.icky[idx] = icky;
    }

    /// Legacy byte view of the working field: unreached reads as 255.
    pub fn cost_byte(&self, pos: Pos) -> u8 {
        encode_byte(self.cost(pos))
    }

    pub fn flow_byte(&self, pos: Pos) -> u8 {
        encode_byte(self.flow(pos))
    }

    pub(crate) fn flow_layer(&self) -> &[Option<u16>] {
        &self.flow
    }
}

fn encode_byte(cost: Option<u16>) -> u8 {
    match cost {
        None => IMPASSABLE,
        Some(cost) => cost.min(u16::from(IMPASSABLE) - 1) as u8,
    }
}
