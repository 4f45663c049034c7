//! Danger-aware navigation engine.
//! This file owns the engine state and wires focused submodules together.
//! It does not own the world model; every read goes through `World`.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use tracing::debug;

use crate::config::NavConfig;
use crate::risk::RiskPolicy;
use crate::types::*;
use crate::world::{Action, ActionSink, ItemKind, World};

mod commit;
mod execute;
mod grid;
mod hash;
mod hazard;
mod propagate;
mod queue;
mod select;
mod sweep;
mod track;

pub use grid::CostGrid;
pub use propagate::{PropagateOptions, SweepReport};
pub use queue::FlowQueue;
pub use track::{DoorTrack, StepTrack};

#[cfg(test)]
mod test_support;

pub struct NavigationEngine {
    config: NavConfig,
    grid: CostGrid,
    queue: FlowQueue,
    rng: ChaCha8Rng,
    hazard_wipe_pending: bool,
    active_goal: Option<Goal>,
    /// First source enqueued in the current sweep.
    sweep_anchor: Option<Pos>,
    /// Sweep anchor captured by the last successful commit.
    flow_anchor: Option<Pos>,
    steps: StepTrack,
    closed_doors: DoorTrack,
    noted_closed_doors: Vec<Pos>,
    noted_veins: Vec<Pos>,
    probed_items: BTreeSet<ItemId>,
    overflow_total: u64,
    oracle_calls: u64,
    log: Vec<NavEvent>,
}

impl NavigationEngine {
    pub fn new(width: usize, height: usize, config: NavConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            grid: CostGrid::new(width, height),
            queue: FlowQueue::with_capacity(config.queue_capacity),
            rng,
            hazard_wipe_pending: false,
            active_goal: None,
            sweep_anchor: None,
            flow_anchor: None,
            steps: StepTrack::new(config.track_capacity),
            closed_doors: DoorTrack::new(config.door_track_capacity),
            noted_closed_doors: Vec::new(),
            noted_veins: Vec::new(),
            probed_items: BTreeSet::new(),
            overflow_total: 0,
            oracle_calls: 0,
            log: Vec::new(),
            config,
        }
    }

    /// Builds an engine sized to `world` with its terrain costs already loaded.
    pub fn for_world<W: World + ?Sized>(world: &W, config: NavConfig) -> NavResult<Self> {
        let (width, height) = world.dimensions();
        let mut engine = Self::new(width, height, config);
        engine.load_terrain(world)?;
        Ok(engine)
    }

    /// Refreshes the static per-square entry costs from `world`.
    pub fn load_terrain<W: World + ?Sized>(&mut self, world: &W) -> NavResult<()> {
        self.check_dimensions(world)?;
        self.grid.load_hard(|pos| world.terrain(pos).hard_cost());
        debug!(width = self.grid.width(), height = self.grid.height(), "terrain costs loaded");
        Ok(())
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn grid(&self) -> &CostGrid {
        &self.grid
    }

    pub fn log(&self) -> &[NavEvent] {
        &self.log
    }

    pub fn steps(&self) -> &StepTrack {
        &self.steps
    }

    pub fn closed_doors(&self) -> &DoorTrack {
        &self.closed_doors
    }

    /// Queue entries dropped for lack of room since the engine was created.
    pub fn overflow_total(&self) -> u64 {
        self.overflow_total
    }

    /// Danger oracle consultations since the engine was created.
    pub fn oracle_calls(&self) -> u64 {
        self.oracle_calls
    }

    /// Records the agent's square without a move, e.g. after a teleport.
    pub fn note_position(&mut self, pos: Pos) {
        if self.steps.last() != Some(pos) {
            self.steps.push(pos);
        }
    }

    /// Remembers a closed door seen on the level; cleared once one is opened.
    pub fn note_closed_door(&mut self, pos: Pos) {
        if !self.noted_closed_doors.contains(&pos) {
            self.noted_closed_doors.push(pos);
        }
    }

    /// Remembers a mineral vein seen on the level; cleared once one is dug.
    pub fn note_vein(&mut self, pos: Pos) {
        if !self.noted_veins.contains(&pos) {
            self.noted_veins.push(pos);
        }
    }

    pub fn noted_closed_doors(&self) -> &[Pos] {
        &self.noted_closed_doors
    }

    pub fn noted_veins(&self) -> &[Pos] {
        &self.noted_veins
    }

    pub fn is_probed(&self, item: ItemId) -> bool {
        self.probed_items.contains(&item)
    }

    fn check_dimensions<W: World + ?Sized>(&self, world: &W) -> NavResult<()> {
        let expected = (self.grid.width(), self.grid.height());
        let found = world.dimensions();
        if found != expected {
            return Err(NavError::DimensionMismatch { expected, found });
        }
        Ok(())
    }

    fn require_in_bounds(&self, pos: Pos) -> NavResult<usize> {
        self.grid.index(pos).ok_or(NavError::OutOfBounds { pos })
    }

    fn push_frontier(&mut self, pos: Pos) {
        if !self.queue.push(pos) {
            self.overflow_total += 1;
        }
    }

    /// Per-mille chance roll from the engine's seeded stream.
    fn roll_per_mille(&mut self, per_mille: u32) -> bool {
        self.rng.next_u64() % 1000 < u64::from(per_mille)
    }

    fn abandon_goal(&mut self, goal: Goal) {
        self.active_goal = None;
        self.log.push(NavEvent::GoalAbandoned { goal });
        debug!(?goal, "goal abandoned");
    }
}
