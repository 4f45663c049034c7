use nav::{
    Action, ActionOutcome, Goal, ItemKind, NavConfig, NavEvent, NavigationEngine, Pos,
    PropagateOptions, ScenarioMap, ScenarioWorld, Terrain,
};

fn pos(y: i32, x: i32) -> Pos {
    Pos { y, x }
}

fn quiet_config() -> NavConfig {
    NavConfig {
        door_refusal_per_mille: 0,
        door_magic_per_mille: 0,
        dig_loop_break_per_mille: 0,
        ..NavConfig::default()
    }
}

fn world_from_rows(rows: &[&str]) -> ScenarioWorld {
    let (map, agent) = ScenarioMap::from_rows(rows).expect("layout should parse");
    ScenarioWorld::new(map, agent.expect("layout should place '@'"))
}

/// Plans, steps and applies until the engine runs out of progress or turns.
fn drive(
    world: &mut ScenarioWorld,
    engine: &mut NavigationEngine,
    goal: Goal,
    sources: &[Pos],
    options: &PropagateOptions,
    max_turns: usize,
) -> Vec<ActionOutcome> {
    let mut outcomes = Vec::new();
    for _ in 0..max_turns {
        if engine.active_goal() != Some(goal) {
            engine.reset_sweep();
            for &source in sources {
                engine.enqueue_source(world, source, &options.policy).expect("source in bounds");
            }
            engine.propagate(world, options).expect("sweep should run");
            if !engine.commit(world, goal).expect("agent in bounds") {
                break;
            }
        }

        let mut actions: Vec<Action> = Vec::new();
        let Some(outcome) =
            engine.step(world, &mut actions, goal, &options.policy).expect("agent in bounds")
        else {
            break;
        };
        outcomes.push(outcome);

        let mut changed = false;
        for action in &actions {
            changed |= world.apply(action);
        }
        if changed {
            engine.load_terrain(world).expect("same dimensions");
            engine.invalidate_hazards();
            engine.cancel_goal();
        }
        if outcome == ActionOutcome::Attacked {
            break;
        }
    }
    outcomes
}

#[test]
fn walks_around_a_wall_and_attacks() {
    let mut world = world_from_rows(&[
        "########",
        "#@.....#",
        "#####..#",
        "#......#",
        "########",
    ]);
    world.add_actor(pos(3, 1), "white worm mass", false);
    let mut engine = NavigationEngine::for_world(&world, quiet_config()).expect("dimensions");

    let outcomes =
        drive(&mut world, &mut engine, Goal::Kill, &[pos(3, 1)], &PropagateOptions::default(), 20);

    let mut expected = vec![ActionOutcome::Moved; 7];
    expected.push(ActionOutcome::Attacked);
    assert_eq!(outcomes, expected);
    assert_eq!(world.agent.pos, pos(3, 2));
    assert!(world.actors.is_empty());
}

#[test]
fn opens_a_door_then_walks_through() {
    let mut world = world_from_rows(&["#####", "#@+.#", "#####"]);
    let mut engine = NavigationEngine::for_world(&world, quiet_config()).expect("dimensions");

    let outcomes =
        drive(&mut world, &mut engine, Goal::Take, &[pos(1, 3)], &PropagateOptions::default(), 10);

    assert_eq!(
        outcomes,
        vec![ActionOutcome::Opened, ActionOutcome::Moved, ActionOutcome::Moved]
    );
    assert_eq!(world.agent.pos, pos(1, 3));
    assert_eq!(world.map.tile_at(pos(1, 2)), Terrain::OpenDoor);
}

#[test]
fn tunnels_through_rubble_when_allowed() {
    let mut world = world_from_rows(&["#@:.#"]);
    let mut engine = NavigationEngine::for_world(&world, quiet_config()).expect("dimensions");
    let options = PropagateOptions { allow_tunnel: true, ..PropagateOptions::default() };

    let outcomes = drive(&mut world, &mut engine, Goal::Recover, &[pos(0, 3)], &options, 10);

    assert_eq!(outcomes, vec![ActionOutcome::Dug, ActionOutcome::Moved, ActionOutcome::Moved]);
    assert_eq!(world.agent.pos, pos(0, 3));
}

#[test]
fn picks_up_an_item_by_walking_onto_it() {
    let mut world = world_from_rows(&["@...", "....", "...."]);
    world.add_item(pos(2, 3), "flask of oil", ItemKind::Other);
    let mut engine = NavigationEngine::for_world(&world, quiet_config()).expect("dimensions");

    let outcomes =
        drive(&mut world, &mut engine, Goal::Take, &[pos(2, 3)], &PropagateOptions::default(), 10);

    assert_eq!(outcomes, vec![ActionOutcome::Moved; 3]);
    assert_eq!(world.agent.pos, pos(2, 3));
    assert!(world.items.is_empty());
    assert!(engine.log().contains(&NavEvent::GoalAbandoned { goal: Goal::Take }));
}

#[test]
fn permanent_partition_is_never_tunnelled() {
    let mut map = ScenarioMap::walled(8, 5);
    for y in 1..4 {
        map.set_tile(pos(y, 4), Terrain::Permanent);
    }
    let mut world = ScenarioWorld::new(map, pos(1, 1));
    let mut engine = NavigationEngine::for_world(&world, quiet_config()).expect("dimensions");

    let tunnel = PropagateOptions { allow_tunnel: true, ..PropagateOptions::default() };
    let outcomes = drive(&mut world, &mut engine, Goal::Leave, &[pos(2, 6)], &tunnel, 5);
    assert!(outcomes.is_empty());
    assert!(engine.log().contains(&NavEvent::CommitRejected { goal: Goal::Leave }));

    let outcomes = drive(&mut world, &mut engine, Goal::Explore, &[pos(3, 3)], &tunnel, 5);
    assert_eq!(outcomes, vec![ActionOutcome::Moved; 2]);
    assert_eq!(world.agent.pos, pos(3, 3));
}
