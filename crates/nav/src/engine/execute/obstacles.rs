//! Traps, closed doors and diggable walls in the way of a step.

use tracing::debug;

use super::*;
use crate::world::Effect;

impl NavigationEngine {
    /// `None` means the trap is stepped on and the destination is handled as usual.
    pub(super) fn handle_trap<W: World + ?Sized, S: ActionSink + ?Sized>(
        &mut self,
        world: &W,
        sink: &mut S,
        dir: Direction,
        policy: &RiskPolicy,
    ) -> Option<ActionOutcome> {
        let agent = world.agent();
        let level = world.level();
        let dest = agent.pos.step(dir);
        let clear_headed = agent.has_light && !agent.blind && !agent.confused;
        let mana_to_spare = i64::from(agent.mana) * 100
            > i64::from(agent.max_mana) * i64::from(self.config.trap_magic_mana_pct);

        if clear_headed && !level.scary_guy_on_level {
            if agent.effects.disable_traps && mana_to_spare {
                sink.issue(Action::Invoke { effect: Effect::DisableTraps, target: dest });
                return Some(ActionOutcome::Disarmed);
            }
            if !agent.too_clumsy_for_traps() {
                sink.issue(Action::Disarm(dir));
                return Some(ActionOutcome::Disarmed);
            }
        }
        if clear_headed && agent.effects.disable_traps {
            sink.issue(Action::Invoke { effect: Effect::DisableTraps, target: dest });
            return Some(ActionOutcome::Disarmed);
        }
        let permitted = level.scary_guy_on_level
            || policy.is_desperate()
            || policy.is_twitchy(agent);
        if permitted {
            debug!(y = dest.y, x = dest.x, "walking onto trap");
            None
        } else {
            Some(ActionOutcome::Blocked(BlockReason::TrapUnsafe))
        }
    }

    pub(super) fn handle_door<W: World + ?Sized, S: ActionSink + ?Sized>(
        &mut self,
        world: &W,
        sink: &mut S,
        dir: Direction,
    ) -> ActionOutcome {
        let agent = world.agent();
        let here = agent.pos;
        let dest = here.step(dir);

        // Some doors are stuck or locked; refusing now and then breaks retry loops.
        if self.roll_per_mille(self.config.door_refusal_per_mille) {
            return ActionOutcome::Blocked(BlockReason::DoorRefused);
        }
        let hostile_adjacent = Direction::ALL.into_iter().any(|d| {
            let near = here.step(d);
            self.grid.in_bounds(near) && world.has_monster(near)
        });
        if hostile_adjacent && agent.level < 15 && !agent.afraid {
            return ActionOutcome::Blocked(BlockReason::HostileAdjacent);
        }

        let stuck_on_panel = world.level().turns_this_panel >= self.config.door_magic_panel_turns;
        if self.roll_per_mille(self.config.door_magic_per_mille) || stuck_on_panel {
            let effect = if agent.effects.destroy_doors {
                Some(Effect::DestroyDoors)
            } else if agent.effects.stone_to_mud {
                Some(Effect::StoneToMud)
            } else {
                None
            };
            if let Some(effect) = effect {
                sink.issue(Action::Invoke { effect, target: dest });
                self.noted_closed_doors.clear();
                return ActionOutcome::Opened;
            }
        }

        sink.issue(Action::Open(dir));
        self.noted_closed_doors.clear();
        ActionOutcome::Opened
    }

    pub(super) fn handle_diggable<W: World + ?Sized, S: ActionSink + ?Sized>(
        &mut self,
        world: &W,
        sink: &mut S,
        dir: Direction,
        goal: Goal,
    ) -> ActionOutcome {
        let agent = world.agent();
        let dest = agent.pos.step(dir);
        let terrain = world.terrain(dest);

        if terrain != Terrain::Rubble && goal == Goal::Explore {
            return ActionOutcome::Blocked(BlockReason::NoDigWhileExploring);
        }
        if !agent.can_dig(terrain) {
            return ActionOutcome::Blocked(BlockReason::CannotDig);
        }
        if agent.effects.stone_to_mud {
            sink.issue(Action::Invoke { effect: Effect::StoneToMud, target: dest });
            self.noted_veins.clear();
            return ActionOutcome::Dug;
        }
        // Occasionally give up so a wall that never yields can't trap the agent in a loop.
        if self.roll_per_mille(self.config.dig_loop_break_per_mille)
            && !world.level().vault_on_level
        {
            return ActionOutcome::Blocked(BlockReason::DigLoopBreak);
        }
        sink.issue(Action::Tunnel(dir));
        self.noted_veins.clear();
        ActionOutcome::Dug
    }
}
