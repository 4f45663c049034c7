use anyhow::{Result, bail};
use clap::Parser;
use nav::{
    Action, Direction, Goal, NavConfig, NavEvent, NavigationEngine, Pos, PropagateOptions, RiskPolicy,
    ScenarioMap, ScenarioWorld,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    maps: u32,
    #[arg(long, default_value_t = 40)]
    width: usize,
    #[arg(long, default_value_t = 20)]
    height: usize,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    let args = Args::parse();

    println!("Starting nav fuzz on seed {} over {} maps...", args.seed, args.maps);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut arrivals = 0u32;
    for round in 0..args.maps {
        if fuzz_map(&mut rng, &args, round)? {
            arrivals += 1;
        }
    }

    println!("Fuzzing completed successfully: {arrivals} of {} maps reached a source.", args.maps);
    Ok(())
}

/// Plans and walks one random map, checking invariants after every turn.
fn fuzz_map(rng: &mut ChaCha8Rng, args: &Args, round: u32) -> Result<bool> {
    let map = ScenarioMap::random(args.width, args.height, rng.next_u64());
    let floor = map.open_floor();
    if floor.len() < 2 {
        return Ok(false);
    }
    let agent = choose(rng, &floor);
    let mut world = ScenarioWorld::new(map, agent);
    world.agent.depth = choose(rng, &[0, 1, 5, 30]);
    world.agent.dig_skill = choose(rng, &[0, 20, 60]);

    let config = NavConfig {
        seed: rng.next_u64(),
        queue_capacity: choose(rng, &[8, 64, 1536]),
        ..NavConfig::default()
    };
    let mut engine = NavigationEngine::for_world(&world, config)?;
    let options = PropagateOptions {
        allow_tunnel: rng.next_u64() % 2 == 0,
        avoid_unknown: rng.next_u64() % 2 == 0,
        sneak: rng.next_u64() % 4 == 0,
        policy: RiskPolicy::new(choose(rng, &[0, 40, 100, 400])),
        ..PropagateOptions::default()
    };
    let goal = choose(rng, &[Goal::Explore, Goal::Take, Goal::Digging, Goal::Flee]);
    let sources: Vec<Pos> = (0..1 + rng.next_u64() % 3).map(|_| choose(rng, &floor)).collect();

    for _ in 0..(args.width * args.height) {
        if engine.active_goal() != Some(goal) {
            engine.reset_sweep();
            for &source in &sources {
                engine.enqueue_source(&world, source, &options.policy)?;
            }
            engine.propagate(&world, &options)?;
            check_parents(&engine, args)?;
            if !engine.commit(&world, goal)? {
                debug!(round, "no route");
                return Ok(false);
            }
        }

        let here = world.agent.pos;
        let mut actions: Vec<Action> = Vec::new();
        if engine.step(&world, &mut actions, goal, &options.policy)?.is_none() {
            return Ok(engine.grid().flow(here) == Some(0));
        }
        if actions.len() > 1 {
            bail!("round {round}: one step issued {} actions", actions.len());
        }
        let stepped = engine.log().iter().rev().find_map(|event| match event {
            NavEvent::Stepped { dir, .. } => Some(*dir),
            _ => None,
        });
        if let Some(dir) = stepped {
            let (from, to) = (engine.grid().flow(here), engine.grid().flow(here.step(dir)));
            if !matches!((from, to), (Some(from), Some(to)) if to < from) {
                bail!("round {round}: step {dir:?} from ({}, {}) was not downhill", here.y, here.x);
            }
        }

        let mut changed = false;
        for action in &actions {
            changed |= world.apply(action);
        }
        if world.map.tile_at(world.agent.pos).is_wall() {
            bail!("round {round}: agent ended up inside a wall");
        }
        if changed {
            engine.load_terrain(&world)?;
            engine.invalidate_hazards();
            engine.cancel_goal();
        }
    }

    info!(round, overflow = engine.overflow_total(), "turn budget exhausted");
    Ok(false)
}

/// Every reached square other than a source has a neighbour exactly one closer.
fn check_parents(engine: &NavigationEngine, args: &Args) -> Result<()> {
    let grid = engine.grid();
    for y in 0..args.height as i32 {
        for x in 0..args.width as i32 {
            let here = Pos { y, x };
            let Some(cost) = grid.cost(here) else { continue };
            if cost > 0
                && !Direction::ALL
                    .into_iter()
                    .any(|dir| grid.cost(here.step(dir)) == Some(cost - 1))
            {
                bail!("({y}, {x}) holds distance {cost} without a parent");
            }
        }
    }
    Ok(())
}
