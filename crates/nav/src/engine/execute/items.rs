//! Stepping onto items: chests and curse probing.

use super::*;
use crate::world::{ChestState, Effect};

/// Half-width of the square around a probed item that the probe also covers.
const PROBE_RADIUS: i32 = 2;

impl NavigationEngine {
    pub(super) fn approach_item<W: World + ?Sized, S: ActionSink + ?Sized>(
        &mut self,
        world: &W,
        sink: &mut S,
        dir: Direction,
        id: ItemId,
    ) -> ActionOutcome {
        let Some(item) = world.item(id) else {
            return ActionOutcome::Blocked(BlockReason::ItemVanished);
        };
        let agent = world.agent();
        let here = agent.pos;

        match item.kind {
            ItemKind::Chest(ChestState::Trapped { power })
                if agent.device_skill.saturating_sub(power) >= self.config.chest_fail_tolerance =>
            {
                sink.issue(Action::Disarm(dir));
                return ActionOutcome::Disarmed;
            }
            ItemKind::Chest(ChestState::Unknown | ChestState::Disarmed) => {
                sink.issue(Action::Open(dir));
                return ActionOutcome::Opened;
            }
            ItemKind::Wieldable
                if agent.effects.curse_probe
                    && !self.probed_items.contains(&id)
                    && here.chebyshev(item.pos) == 1 =>
            {
                sink.issue(Action::Invoke { effect: Effect::CurseProbe, target: item.pos });
                self.mark_probed_around(world, item.pos);
                return ActionOutcome::Probed;
            }
            _ => {}
        }

        self.walk(sink, here, dir)
    }

    fn mark_probed_around<W: World + ?Sized>(&mut self, world: &W, center: Pos) {
        for dy in -PROBE_RADIUS..=PROBE_RADIUS {
            for dx in -PROBE_RADIUS..=PROBE_RADIUS {
                let pos = Pos { y: center.y + dy, x: center.x + dx };
                if !self.grid.in_bounds(pos) {
                    continue;
                }
                if let Some(Occupant::Item(id)) = world.occupant(pos)
                    && world.item(id).is_some_and(|item| item.kind == ItemKind::Wieldable)
                {
                    self.probed_items.insert(id);
                }
            }
        }
    }
}
