//! Shared test fixtures for the engine test suites.
//! This module exists to avoid repeating map and sweep setup across many tests.
//! It does not own production navigation logic.

use super::*;
use crate::scenario::{ScenarioMap, ScenarioWorld};

pub(super) fn open_world(width: usize, height: usize, agent: Pos) -> ScenarioWorld {
    ScenarioWorld::new(ScenarioMap::new(width, height), agent)
}

pub(super) fn world_from_rows(rows: &[&str]) -> ScenarioWorld {
    let (map, agent) = ScenarioMap::from_rows(rows).expect("fixture layout should parse");
    ScenarioWorld::new(map, agent.expect("fixture layout should place '@'"))
}

/// Defaults with every random refusal switched off.
pub(super) fn quiet_config() -> NavConfig {
    NavConfig {
        door_refusal_per_mille: 0,
        door_magic_per_mille: 0,
        dig_loop_break_per_mille: 0,
        ..NavConfig::default()
    }
}

pub(super) fn engine_for(world: &ScenarioWorld) -> NavigationEngine {
    NavigationEngine::for_world(world, quiet_config()).expect("fixture dimensions match")
}

/// Runs a whole sweep from `sources` and commits it for `goal`.
pub(super) fn plan(
    engine: &mut NavigationEngine,
    world: &ScenarioWorld,
    sources: &[Pos],
    options: &PropagateOptions,
    goal: Goal,
) -> bool {
    engine.reset_sweep();
    for &source in sources {
        engine.enqueue_source(world, source, &options.policy).expect("source in bounds");
    }
    engine.propagate(world, options).expect("sweep should run");
    engine.commit(world, goal).expect("agent in bounds")
}

pub(super) fn pos(y: i32, x: i32) -> Pos {
    Pos { y, x }
}
