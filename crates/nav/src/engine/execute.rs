//! Turning a chosen direction into exactly one game action.
//! This module decides what the step means for the destination square.
//! It does not validate the direction against the committed field.

use tracing::debug;

use super::*;

mod items;
mod obstacles;

impl NavigationEngine {
    /// Issues the action for stepping `dir` from the agent's square.
    ///
    /// Every outcome except `Blocked` issued exactly one action to `sink`.
    pub fn execute_step<W: World + ?Sized, S: ActionSink + ?Sized>(
        &mut self,
        world: &W,
        sink: &mut S,
        dir: Direction,
        goal: Goal,
        policy: &RiskPolicy,
    ) -> NavResult<ActionOutcome> {
        let agent = world.agent();
        let here = agent.pos;
        self.require_in_bounds(here)?;
        let dest = here.step(dir);
        self.require_in_bounds(dest)?;

        if world.level().breeder_level
            && let Some(door_dir) = self.door_to_close(world, here, dest)
        {
            let door = here.step(door_dir);
            sink.issue(Action::Close(door_dir));
            self.closed_doors.remember(door);
            debug!(y = door.y, x = door.x, "closing door against breeders");
            return Ok(ActionOutcome::Closed);
        }

        if world.level().take_stairs && world.terrain(here) == Terrain::UpStairs {
            sink.issue(Action::Ascend);
            return Ok(ActionOutcome::Ascended);
        }

        if world.marker(dest) == Some(Marker::Ward) {
            return Ok(self.walk(sink, here, dir));
        }

        match world.occupant(dest) {
            Some(Occupant::Actor(id)) => return Ok(self.confront(world, sink, dir, id)),
            Some(Occupant::Item(id)) => return Ok(self.approach_item(world, sink, dir, id)),
            None => {}
        }

        if world.marker(dest) == Some(Marker::Trap)
            && let Some(outcome) = self.handle_trap(world, sink, dir, policy)
        {
            return Ok(outcome);
        }

        let terrain = world.terrain(dest);
        if terrain == Terrain::ClosedDoor {
            return Ok(self.handle_door(world, sink, dir));
        }
        if terrain.is_diggable() {
            return Ok(self.handle_diggable(world, sink, dir, goal));
        }
        if let Some(shop) = terrain.shop() {
            sink.issue(Action::EnterShop { dir, shop });
            return Ok(ActionOutcome::Entered);
        }

        Ok(self.walk(sink, here, dir))
    }

    fn walk<S: ActionSink + ?Sized>(
        &mut self,
        sink: &mut S,
        here: Pos,
        dir: Direction,
    ) -> ActionOutcome {
        sink.issue(Action::Move(dir));
        self.steps.arrive(here, here.step(dir));
        ActionOutcome::Moved
    }

    fn confront<W: World + ?Sized, S: ActionSink + ?Sized>(
        &mut self,
        world: &W,
        sink: &mut S,
        dir: Direction,
        id: ActorId,
    ) -> ActionOutcome {
        let agent = world.agent();
        if agent.afraid {
            return ActionOutcome::Blocked(BlockReason::Afraid);
        }
        let unique = world.actor(id).is_some_and(|actor| actor.unique);
        if unique && agent.in_town() && agent.level < 5 {
            return ActionOutcome::Blocked(BlockReason::TownUnique);
        }
        sink.issue(Action::Attack(dir));
        ActionOutcome::Attacked
    }

    /// An open, empty door next to the agent, other than the one it is about to use.
    fn door_to_close<W: World + ?Sized>(
        &self,
        world: &W,
        here: Pos,
        dest: Pos,
    ) -> Option<Direction> {
        if self.closed_doors.is_full() {
            return None;
        }
        Direction::ALL.into_iter().find(|&dir| {
            let pos = here.step(dir);
            pos != dest
                && self.grid.in_bounds(pos)
                && world.terrain(pos) == Terrain::OpenDoor
                && world.occupant(pos).is_none()
        })
    }
}
