//! Goal commitment: freezing a sweep into the field the selector reads.

use tracing::debug;

use super::*;

impl NavigationEngine {
    /// Adopts the current sweep for `goal` if the agent can reach a source.
    ///
    /// A rejected commit leaves the previous committed field and goal untouched.
    pub fn commit<W: World + ?Sized>(&mut self, world: &W, goal: Goal) -> NavResult<bool> {
        let here = world.agent().pos;
        let idx = self.require_in_bounds(here)?;
        match self.grid.cost_at(idx) {
            Some(cost) if cost < self.config.unreachable_cost => {
                self.grid.commit_flow();
                self.active_goal = Some(goal);
                self.flow_anchor = self.sweep_anchor;
                self.log.push(NavEvent::FlowCommitted { goal, cost });
                debug!(?goal, cost, "flowing toward goal");
                Ok(true)
            }
            _ => {
                self.log.push(NavEvent::CommitRejected { goal });
                debug!(?goal, "goal unreachable from agent square");
                Ok(false)
            }
        }
    }

    pub fn active_goal(&self) -> Option<Goal> {
        self.active_goal
    }

    /// Drops the active goal without touching the committed field.
    pub fn cancel_goal(&mut self) {
        if let Some(goal) = self.active_goal {
            self.abandon_goal(goal);
        }
    }

    pub fn flow_anchor(&self) -> Option<Pos> {
        self.flow_anchor
    }
}
