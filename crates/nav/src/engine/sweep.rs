//! Sweep setup: clearing the working field and seeding sources.

use super::*;

impl NavigationEngine {
    /// Starts a new sweep. Hazard verdicts survive unless a wipe was requested.
    pub fn reset_sweep(&mut self) {
        self.grid.reset_costs();
        if self.hazard_wipe_pending {
            self.grid.wipe_hazards();
            self.hazard_wipe_pending = false;
        }
        self.queue.clear();
        self.sweep_anchor = None;
    }

    /// Seeds `pos` as a distance-zero source.
    ///
    /// Returns `Ok(false)` when the square is hazardous or already seeded.
    pub fn enqueue_source<W: World + ?Sized>(
        &mut self,
        world: &W,
        pos: Pos,
        policy: &RiskPolicy,
    ) -> NavResult<bool> {
        let idx = self.require_in_bounds(pos)?;
        if self.is_hazardous(world, pos, policy) {
            return Ok(false);
        }
        if self.grid.cost_at(idx) == Some(0) {
            return Ok(false);
        }
        self.grid.set_cost_at(idx, 0);
        self.sweep_anchor.get_or_insert(pos);
        self.push_frontier(pos);
        Ok(true)
    }

    pub fn sweep_anchor(&self) -> Option<Pos> {
        self.sweep_anchor
    }
}
