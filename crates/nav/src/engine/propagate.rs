//! Breadth-first flood fill from the seeded sources.
//! This module owns the admission rules for neighbouring squares.
//! It does not commit results; a sweep stays private until `commit`.

use tracing::{debug, warn};

use super::*;
use crate::config::MAX_DEPTH_LIMIT;
use crate::world::AgentStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropagateOptions {
    /// Distances past this are never assigned; `None` uses the configured
    /// depth. Either way the limit is clamped to `MAX_DEPTH_LIMIT`.
    pub max_depth: Option<u16>,
    /// Stop once the frontier is farther out than the agent's own distance.
    pub stop_at_first_reachable: bool,
    pub avoid_unknown: bool,
    /// Treat diggable walls as enterable.
    pub allow_tunnel: bool,
    /// Refuse squares next to a monster.
    pub sneak: bool,
    /// Measure from here instead of the agent, e.g. a stair being fled to.
    pub origin: Option<Pos>,
    pub policy: RiskPolicy,
}

impl Default for PropagateOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            stop_at_first_reachable: true,
            avoid_unknown: false,
            allow_tunnel: false,
            sneak: false,
            origin: None,
            policy: RiskPolicy::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Squares popped and expanded.
    pub expanded: u32,
    /// Squares that received a distance during the fill, sources excluded.
    pub assigned: u32,
    /// Frontier entries lost to a full queue during this sweep.
    pub dropped: u32,
}

/// Per-sweep facts that don't change while the fill runs.
struct Admission<'a> {
    agent: &'a AgentStatus,
    options: &'a PropagateOptions,
    twitchy: bool,
}

impl NavigationEngine {
    /// Fills the working field outwards from every seeded source.
    ///
    /// Each square gets the smallest step count through admissible squares,
    /// or stays unreached. Queue overflow leaves a smaller but still valid field.
    pub fn propagate<W: World + ?Sized>(
        &mut self,
        world: &W,
        options: &PropagateOptions,
    ) -> NavResult<SweepReport> {
        self.check_dimensions(world)?;
        let agent = world.agent();
        // An explicit origin makes early termination meaningless.
        let (origin, optimize) = match options.origin {
            Some(origin) => (origin, false),
            None => (agent.pos, options.stop_at_first_reachable),
        };
        let origin_idx = self.require_in_bounds(origin)?;
        let depth_limit = options
            .max_depth
            .map_or(self.config.depth_limit(), |depth| depth.min(MAX_DEPTH_LIMIT));
        let admission =
            Admission { agent, options, twitchy: options.policy.is_twitchy(agent) };

        let mut report = SweepReport::default();
        let mut frontier = 0u16;
        while let Some(current) = self.queue.pop() {
            let Some(current_cost) = self.grid.cost(current) else {
                continue;
            };
            let next_cost = current_cost.saturating_add(1);
            if next_cost > frontier {
                if optimize && self.grid.cost_at(origin_idx).is_some_and(|c| next_cost > c) {
                    break;
                }
                if next_cost > depth_limit {
                    break;
                }
                frontier = next_cost;
            }
            report.expanded += 1;

            for dir in Direction::ALL {
                let next = current.step(dir);
                let Some(idx) = self.grid.index(next) else {
                    continue;
                };
                if self.grid.cost_at(idx).is_some_and(|c| c <= next_cost) {
                    continue;
                }
                if !self.admits(world, next, &admission) {
                    continue;
                }
                if self.is_hazardous(world, next, &options.policy) {
                    continue;
                }
                self.grid.set_cost_at(idx, next_cost);
                report.assigned += 1;
                self.push_frontier(next);
            }
        }

        report.dropped = self.queue.dropped();
        self.queue.clear();
        if report.dropped > 0 {
            warn!(dropped = report.dropped, "flow queue overflowed; field is partial");
            self.log.push(NavEvent::QueueOverflow { dropped: report.dropped });
        }
        debug!(
            expanded = report.expanded,
            assigned = report.assigned,
            frontier,
            "sweep propagated"
        );
        Ok(report)
    }

    /// Static admission rules, checked in a fixed order before the hazard test.
    fn admits<W: World + ?Sized>(&self, world: &W, pos: Pos, admission: &Admission<'_>) -> bool {
        let Admission { agent, options, twitchy } = *admission;
        let policy = &options.policy;

        if options.sneak
            && !policy.is_desperate()
            && !twitchy
            && Direction::ALL.into_iter().any(|dir| {
                let near = pos.step(dir);
                self.grid.in_bounds(near) && world.has_monster(near)
            })
        {
            return false;
        }

        let terrain = world.terrain(pos);
        if terrain.is_wall() && !options.allow_tunnel {
            return false;
        }
        if self.grid.hard(pos) == IMPASSABLE {
            return false;
        }
        if terrain == Terrain::Lava && !agent.fire_immune {
            return false;
        }
        if terrain == Terrain::Unknown
            && (options.avoid_unknown || policy.is_desperate())
            && !twitchy
        {
            return false;
        }

        if world.has_monster(pos) {
            if policy.posture.avoids_monsters() || agent.afraid {
                return false;
            }
            if !twitchy && agent.food >= 2 && agent.max_level < 5 {
                return false;
            }
        }

        if let (Some(wanted), Some(shop)) = (world.level().goal_shop, terrain.shop())
            && shop != wanted
            && pos != agent.pos
        {
            return false;
        }

        if world.marker(pos) == Some(Marker::Trap)
            && !twitchy
            && (agent.hp < 60 || agent.too_clumsy_for_traps())
        {
            return false;
        }

        true
    }
}
