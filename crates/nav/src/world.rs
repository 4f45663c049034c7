//! Narrow interfaces the navigation core consumes from the host turn engine.
//! This module exists so the engine never depends on a concrete world model.
//! It does not own danger scoring, monster bookkeeping, or input handling.

use serde::{Deserialize, Serialize};

use crate::types::*;

const DIG_SKILL: i32 = 13;
const DIG_SKILL_HARD: i32 = 40;

/// Read-only snapshot of the world around the agent.
pub trait World {
    /// `(width, height)` of the current map.
    fn dimensions(&self) -> (usize, usize);
    fn terrain(&self, pos: Pos) -> Terrain;
    fn marker(&self, pos: Pos) -> Option<Marker>;
    fn occupant(&self, pos: Pos) -> Option<Occupant>;
    /// Threat of standing on `pos` for `exposure_turns`; deterministic per snapshot.
    fn danger(&self, pos: Pos, exposure_turns: u32) -> u32;
    fn actor(&self, id: ActorId) -> Option<&ActorInfo>;
    fn item(&self, id: ItemId) -> Option<&ItemInfo>;
    fn agent(&self) -> &AgentStatus;
    fn level(&self) -> &LevelStatus;

    fn has_monster(&self, pos: Pos) -> bool {
        matches!(self.occupant(pos), Some(Occupant::Actor(_)))
    }
}

/// One-shot magical or device effects the agent can currently rely on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    pub disable_traps: bool,
    pub destroy_doors: bool,
    pub stone_to_mud: bool,
    pub curse_probe: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentStatus {
    pub pos: Pos,
    pub level: u8,
    pub max_level: u8,
    pub depth: u8,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    /// Satiation band; 0 is starving.
    pub food: u8,
    pub hungry: bool,
    pub weak: bool,
    pub afraid: bool,
    pub blind: bool,
    pub confused: bool,
    pub has_light: bool,
    pub fire_immune: bool,
    pub disarm_physical: i32,
    pub disarm_magical: i32,
    pub device_skill: i32,
    pub dig_skill: i32,
    /// A digging tool is available as a weapon swap.
    pub digger_swap: bool,
    pub effects: Effects,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self {
            pos: Pos { y: 0, x: 0 },
            level: 20,
            max_level: 20,
            depth: 5,
            hp: 200,
            max_hp: 200,
            mana: 0,
            max_mana: 0,
            food: 5,
            hungry: false,
            weak: false,
            afraid: false,
            blind: false,
            confused: false,
            has_light: true,
            fire_immune: false,
            disarm_physical: 60,
            disarm_magical: 60,
            device_skill: 40,
            dig_skill: 0,
            digger_swap: false,
            effects: Effects::default(),
        }
    }
}

impl AgentStatus {
    pub fn in_town(&self) -> bool {
        self.depth == 0
    }

    pub fn can_dig(&self, terrain: Terrain) -> bool {
        if self.hungry || !terrain.is_diggable() {
            return false;
        }
        let needed = if terrain == Terrain::Wall { DIG_SKILL_HARD } else { DIG_SKILL };
        if (self.digger_swap && self.dig_skill >= needed) || self.dig_skill >= needed + 20 {
            return true;
        }
        if terrain == Terrain::Rubble && !self.weak {
            return true;
        }
        self.effects.stone_to_mud
    }

    /// Clumsy low-level characters should walk around traps rather than disarm them.
    pub fn too_clumsy_for_traps(&self) -> bool {
        let level = self.level;
        let skills = [self.disarm_physical, self.disarm_magical];
        skills.iter().any(|&skill| (skill < 30 && level < 20) || (skill < 45 && level < 10))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelStatus {
    pub breeder_level: bool,
    /// Something on this level is worth fleeing from without stopping for traps.
    pub scary_guy_on_level: bool,
    pub unique_on_level: bool,
    pub vault_on_level: bool,
    pub turns_on_level: u32,
    pub turns_this_panel: u32,
    /// Set when the current goal is a shop; other entrances are routed around.
    pub goal_shop: Option<ShopId>,
    /// Climb when standing on up stairs.
    pub take_stairs: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInfo {
    pub pos: Pos,
    pub name: String,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestState {
    Unknown,
    Trapped { power: i32 },
    Disarmed,
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Chest(ChestState),
    /// Weapons and armour that may carry a curse worth probing for.
    Wieldable,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub pos: Pos,
    pub name: String,
    pub kind: ItemKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    DisableTraps,
    DestroyDoors,
    StoneToMud,
    CurseProbe,
}

/// A single turn-consuming primitive issued to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move(Direction),
    Attack(Direction),
    Open(Direction),
    Close(Direction),
    Disarm(Direction),
    Tunnel(Direction),
    EnterShop { dir: Direction, shop: ShopId },
    Ascend,
    Invoke { effect: Effect, target: Pos },
}

pub trait ActionSink {
    fn issue(&mut self, action: Action);
}

impl ActionSink for Vec<Action> {
    fn issue(&mut self, action: Action) {
        self.push(action);
    }
}
