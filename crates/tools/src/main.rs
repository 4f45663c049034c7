use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nav::{
    Action, ActionOutcome, NavConfig, NavigationEngine, PropagateOptions, Scenario, ScenarioWorld,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario JSON file to run
    #[arg(short, long)]
    scenario: PathBuf,
    /// Optional navigation config JSON; defaults are used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Turn budget before giving up
    #[arg(short, long, default_value_t = 200)]
    turns: u32,
    /// Let the sweep path through diggable walls
    #[arg(long)]
    tunnel: bool,
    /// Refuse squares next to monsters
    #[arg(long)]
    sneak: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
}

/// Re-plans toward the scenario's targets. Returns false when there is nowhere to go.
fn plan(
    engine: &mut NavigationEngine,
    world: &ScenarioWorld,
    scenario: &Scenario,
    options: &PropagateOptions,
) -> Result<bool> {
    let targets = scenario.targets_in(world);
    if targets.is_empty() {
        return Ok(false);
    }
    engine.reset_sweep();
    for target in targets {
        engine
            .enqueue_source(world, target, &options.policy)
            .with_context(|| format!("target ({}, {}) is off the map", target.y, target.x))?;
    }
    let report = engine.propagate(world, options)?;
    info!(expanded = report.expanded, dropped = report.dropped, "sweep finished");
    Ok(engine.commit(world, scenario.goal)?)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario: {}", args.scenario.display()))?;
    let config = match &args.config {
        Some(path) => NavConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => NavConfig::default(),
    };
    let mut world = scenario.build().with_context(|| "Failed to build scenario world")?;
    let mut engine = NavigationEngine::for_world(&world, config)?;
    let options = PropagateOptions {
        allow_tunnel: args.tunnel,
        sneak: args.sneak,
        policy: scenario.policy,
        ..PropagateOptions::default()
    };

    let mut turns = 0;
    while turns < args.turns {
        if engine.active_goal() != Some(scenario.goal)
            && !plan(&mut engine, &world, &scenario, &options)?
        {
            println!("No route for {:?}.", scenario.goal);
            break;
        }

        let mut actions: Vec<Action> = Vec::new();
        let Some(outcome) = engine.step(&world, &mut actions, scenario.goal, &options.policy)?
        else {
            println!("No further progress toward {:?}.", scenario.goal);
            break;
        };
        turns += 1;
        println!("Turn {turns}: {outcome:?} {actions:?}");

        if let ActionOutcome::Blocked(reason) = outcome {
            info!(?reason, "step blocked");
            continue;
        }
        let mut changed = false;
        for action in &actions {
            changed |= world.apply(action);
        }
        if changed {
            engine.load_terrain(&world)?;
            engine.invalidate_hazards();
            engine.cancel_goal();
        }
    }
    if turns >= args.turns {
        println!("Turn budget of {} exhausted.", args.turns);
    }

    println!("Run complete.");
    println!("Agent: ({}, {})", world.agent.pos.y, world.agent.pos.x);
    println!("Queue overflow: {}", engine.overflow_total());
    println!("Oracle calls: {}", engine.oracle_calls());
    println!("Snapshot Hash: {}", engine.snapshot_hash());

    Ok(())
}
