//! Memoized hazard verdicts.
//! This module exists so the expensive danger oracle runs at most once per square
//! between invalidations. It does not decide thresholds; `RiskPolicy` does.

use tracing::trace;

use super::*;

impl NavigationEngine {
    /// Whether propagation must treat `pos` as hazardous under `policy`.
    ///
    /// Hazard-ignoring postures neither read nor write the cache, so a sweep
    /// run in such a posture leaves the memo exactly as it found it.
    pub fn is_hazardous<W: World + ?Sized>(
        &mut self,
        world: &W,
        pos: Pos,
        policy: &RiskPolicy,
    ) -> bool {
        if policy.posture.ignores_hazards() {
            return false;
        }
        let Some(idx) = self.grid.index(pos) else {
            return true;
        };
        if let Some(icky) = self.grid.hazard_at(idx) {
            return icky;
        }
        let danger = world.danger(pos, 1);
        self.oracle_calls += 1;
        let threshold = policy.threshold(world.agent(), world.level());
        let icky = danger > threshold;
        self.grid.mark_hazard_at(idx, icky);
        trace!(y = pos.y, x = pos.x, danger, threshold, icky, "hazard evaluated");
        icky
    }

    /// Requests a full hazard wipe at the start of the next sweep.
    pub fn invalidate_hazards(&mut self) {
        if !self.hazard_wipe_pending {
            self.hazard_wipe_pending = true;
            self.log.push(NavEvent::HazardsInvalidated);
        }
    }

    pub fn hazard_verdict(&self, pos: Pos) -> Option<bool> {
        self.grid.index(pos).and_then(|idx| self.grid.hazard_at(idx))
    }
}
