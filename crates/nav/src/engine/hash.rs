//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from navigation code.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

const UNREACHED: u16 = u16::MAX;

impl NavigationEngine {
    /// Hash of everything that steers future steps: committed field, goal,
    /// step history and overflow count.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.grid.width() as u64);
        hasher.write_u64(self.grid.height() as u64);
        for flow in self.grid.flow_layer() {
            hasher.write_u16(flow.unwrap_or(UNREACHED));
        }
        hasher.write_u8(match self.active_goal {
            None => 0,
            Some(goal) => goal as u8 + 1,
        });
        if let Some(anchor) = self.flow_anchor {
            hasher.write_i32(anchor.x);
            hasher.write_i32(anchor.y);
        }
        hasher.write_u64(self.steps.len() as u64);
        for pos in self.steps.iter() {
            hasher.write_i32(pos.x);
            hasher.write_i32(pos.y);
        }
        hasher.write_u64(self.overflow_total);
        hasher.finish()
    }
}
