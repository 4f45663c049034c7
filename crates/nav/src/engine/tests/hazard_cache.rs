//! Tests for hazard memoization and invalidation.

use super::support::*;

fn cautious() -> PropagateOptions {
    PropagateOptions { policy: RiskPolicy::new(100), ..PropagateOptions::default() }
}

#[test]
fn oracle_runs_once_per_square_until_invalidated() {
    let world = open_world(5, 5, pos(4, 4));
    let mut engine = engine_for(&world);

    assert!(plan(&mut engine, &world, &[pos(0, 0)], &cautious(), Goal::Explore));
    let first = world.danger_queries();
    assert!(first > 0);
    assert_eq!(engine.oracle_calls(), first);

    assert!(plan(&mut engine, &world, &[pos(0, 0)], &cautious(), Goal::Explore));
    assert_eq!(world.danger_queries(), first, "cached verdicts must be reused");

    engine.invalidate_hazards();
    assert!(plan(&mut engine, &world, &[pos(0, 0)], &cautious(), Goal::Explore));
    assert_eq!(world.danger_queries(), first * 2);
    assert_eq!(
        engine.log().iter().filter(|event| **event == NavEvent::HazardsInvalidated).count(),
        1
    );
}

#[test]
fn hazardous_source_is_not_seeded() {
    let mut world = open_world(5, 5, pos(2, 2));
    world.map.set_danger(pos(0, 0), 1000);
    let mut engine = engine_for(&world);

    engine.reset_sweep();
    let seeded = engine.enqueue_source(&world, pos(0, 0), &RiskPolicy::new(100));
    assert_eq!(seeded, Ok(false));
    engine.propagate(&world, &cautious()).expect("sweep");
    assert_eq!(engine.commit(&world, Goal::Kill), Ok(false));
    assert_eq!(engine.hazard_verdict(pos(0, 0)), Some(true));
}

#[test]
fn hazardous_corridor_square_blocks_the_route() {
    let mut world = world_from_rows(&["@.."]);
    world.map.set_danger(pos(0, 1), 31);
    let mut engine = engine_for(&world);
    assert!(!plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Take));

    // At exactly the threshold the square is still acceptable.
    world.map.set_danger(pos(0, 1), 30);
    engine.invalidate_hazards();
    assert!(plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Take));
}

#[test]
fn stale_verdicts_persist_until_invalidated() {
    let mut world = world_from_rows(&["@.."]);
    let mut engine = engine_for(&world);
    assert!(plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Take));

    world.map.set_danger(pos(0, 1), 5000);
    assert!(plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Take));

    engine.invalidate_hazards();
    assert!(!plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Take));
}

#[test]
fn hazard_ignoring_posture_bypasses_the_cache() {
    let mut world = world_from_rows(&["@.."]);
    world.map.set_danger(pos(0, 1), 5000);
    let mut engine = engine_for(&world);
    let fleeing = PropagateOptions {
        policy: RiskPolicy::new(100).with_posture(Posture::Desperate),
        ..PropagateOptions::default()
    };

    assert!(plan(&mut engine, &world, &[pos(0, 2)], &fleeing, Goal::Flee));
    assert_eq!(world.danger_queries(), 0);
    assert_eq!(engine.hazard_verdict(pos(0, 1)), None);

    assert!(!plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Take));
    assert_eq!(engine.hazard_verdict(pos(0, 1)), Some(true));
}

#[test]
fn town_uses_a_tight_threshold() {
    let mut world = world_from_rows(&["@.."]);
    world.map.set_danger(pos(0, 1), 40);
    world.agent.food = 0;
    let mut engine = engine_for(&world);
    assert!(plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Shop), "starving fears less");

    world.agent.depth = 0;
    engine.invalidate_hazards();
    assert!(!plan(&mut engine, &world, &[pos(0, 2)], &cautious(), Goal::Shop));
}

#[test]
fn route_detours_around_a_hazardous_square() {
    let mut world = world_from_rows(&["@.......", "........"]);
    world.map.set_danger(pos(0, 4), 1000);
    let mut engine = engine_for(&world);
    let options = cautious();

    assert!(plan(&mut engine, &world, &[pos(0, 7)], &options, Goal::Take));
    assert_eq!(engine.grid().flow(pos(0, 0)), Some(7));
    assert_eq!(engine.grid().flow(pos(0, 4)), None);
    assert_eq!(engine.hazard_verdict(pos(0, 4)), Some(true));

    let mut walked = vec![world.agent.pos];
    while let Some(dir) =
        engine.select_step(&world, Goal::Take, &options.policy).expect("in bounds")
    {
        let next = world.agent.pos.step(dir);
        engine.note_position(next);
        world.agent.pos = next;
        walked.push(next);
    }
    assert_eq!(world.agent.pos, pos(0, 7));
    assert_eq!(walked.len(), 8);
    assert!(!walked.contains(&pos(0, 4)), "walk entered the hazard: {walked:?}");
    assert!(walked.iter().any(|square| square.y == 1), "walk should leave the top row");
}
