//! Downhill step selection over the committed field, plus the combined turn step.
//! This module does not touch the world; actions go through `execute_step`.

use tracing::debug;

use super::*;

impl NavigationEngine {
    /// Picks the adjacent square that moves strictly downhill on the committed field.
    ///
    /// Returns `None` and drops the active goal when `goal` isn't active or no
    /// neighbour makes progress.
    pub fn select_step<W: World + ?Sized>(
        &mut self,
        world: &W,
        goal: Goal,
        policy: &RiskPolicy,
    ) -> NavResult<Option<Direction>> {
        if self.active_goal != Some(goal) {
            if let Some(active) = self.active_goal {
                self.abandon_goal(active);
            }
            return Ok(None);
        }
        let agent = world.agent();
        let here = agent.pos;
        self.require_in_bounds(here)?;
        let Some(current) = self.grid.flow(here) else {
            self.give_up(goal, here);
            return Ok(None);
        };

        // Strictly lower than here: equal-cost neighbours never win.
        let mut best_cost = i64::from(current) * 10 - 5;
        let mut best = None;
        let mut ties = 0u64;
        let in_town = agent.in_town();
        let near_anchor = goal == Goal::Digging
            && self.flow_anchor.is_some_and(|anchor| here.chebyshev(anchor) <= 2);

        for dir in Direction::ALL {
            let next = here.step(dir);
            let Some(flow) = self.grid.flow(next) else {
                continue;
            };
            let cost = i64::from(flow) * 10;
            if cost > best_cost {
                continue;
            }
            // Digging in a straight line next to the anchor just reopens the same tunnel.
            if near_anchor && dir.is_orthogonal() {
                continue;
            }
            if !policy.is_desperate() && self.steps.would_bounce(here, next) {
                continue;
            }
            if cost < best_cost {
                ties = 0;
            }
            ties += 1;
            if ties >= 2 && (!in_town || self.rng.next_u64() % ties != 0) {
                continue;
            }
            best = Some(dir);
            best_cost = cost;
        }

        match best {
            Some(dir) => Ok(Some(dir)),
            None => {
                self.give_up(goal, here);
                Ok(None)
            }
        }
    }

    /// One full turn: select a direction, then act on it.
    ///
    /// A blocked action abandons the goal so the caller re-plans.
    pub fn step<W: World + ?Sized, S: ActionSink + ?Sized>(
        &mut self,
        world: &W,
        sink: &mut S,
        goal: Goal,
        policy: &RiskPolicy,
    ) -> NavResult<Option<ActionOutcome>> {
        let Some(dir) = self.select_step(world, goal, policy)? else {
            return Ok(None);
        };
        let outcome = self.execute_step(world, sink, dir, goal, policy)?;
        self.log.push(NavEvent::Stepped { goal, dir, outcome });
        debug!(?goal, ?dir, ?outcome, "step taken");
        if !outcome.acted() && self.active_goal == Some(goal) {
            self.abandon_goal(goal);
        }
        Ok(Some(outcome))
    }

    fn give_up(&mut self, goal: Goal, here: Pos) {
        if goal == Goal::Digging
            && let Some(anchor) = self.flow_anchor
            && here == anchor
        {
            debug!(y = here.y, x = here.x, "digging run ended");
            self.log.push(NavEvent::AnchorReached { anchor });
        }
        self.abandon_goal(goal);
    }
}
