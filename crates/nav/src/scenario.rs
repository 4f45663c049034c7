//! A small self-contained world for tests, the runner and the fuzzer.
//! This module exists so navigation can be exercised without a real game.
//! It does not model monster turns; only the agent's own actions change it.

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use thiserror::Error;

use crate::risk::RiskPolicy;
use crate::types::*;
use crate::world::*;

#[derive(Clone, Debug)]
pub struct ScenarioMap {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Terrain>,
    pub markers: Vec<Option<Marker>>,
    pub danger: Vec<u32>,
}

impl ScenarioMap {
    /// All floor, no border.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            tiles: vec![Terrain::Floor; len],
            markers: vec![None; len],
            danger: vec![0; len],
        }
    }

    /// Floor surrounded by a ring of permanent rock.
    pub fn walled(width: usize, height: usize) -> Self {
        let mut map = Self::new(width, height);
        for x in 0..width as i32 {
            map.set_tile(Pos { y: 0, x }, Terrain::Permanent);
            map.set_tile(Pos { y: height as i32 - 1, x }, Terrain::Permanent);
        }
        for y in 0..height as i32 {
            map.set_tile(Pos { y, x: 0 }, Terrain::Permanent);
            map.set_tile(Pos { y, x: width as i32 - 1 }, Terrain::Permanent);
        }
        map
    }

    /// Seeded cave-like clutter: mostly floor, with walls, rubble, doors, a
    /// little lava, scattered traps and patches of danger.
    pub fn random(width: usize, height: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut map = Self::new(width, height);
        for idx in 0..map.tiles.len() {
            map.tiles[idx] = match rng.next_u64() % 100 {
                0..=21 => Terrain::Wall,
                22..=24 => Terrain::Rubble,
                25..=26 => Terrain::PassableRubble,
                27..=28 => Terrain::ClosedDoor,
                29 => Terrain::Vein,
                30 => Terrain::Lava,
                31 => Terrain::Unknown,
                _ => Terrain::Floor,
            };
            if map.tiles[idx] == Terrain::Floor && rng.next_u64() % 100 < 3 {
                map.markers[idx] = Some(Marker::Trap);
            }
            if rng.next_u64() % 100 < 10 {
                map.danger[idx] = (rng.next_u64() % 80) as u32;
            }
        }
        map
    }

    /// Plain floor squares without markers, in row-major order.
    pub fn open_floor(&self) -> Vec<Pos> {
        (0..self.tiles.len())
            .filter(|&idx| self.tiles[idx] == Terrain::Floor && self.markers[idx].is_none())
            .map(|idx| Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 })
            .collect()
    }

    /// Parses an ASCII layout; returns the map and the `@` square if present.
    pub fn from_rows<R: AsRef<str>>(rows: &[R]) -> Result<(Self, Option<Pos>), ScenarioError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if width == 0 {
            return Err(ScenarioError::EmptyMap);
        }
        let mut map = Self::new(width, height);
        let mut agent = None;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(ScenarioError::RaggedRow { row: y });
            }
            for (x, glyph) in row.chars().enumerate() {
                let pos = Pos { y: y as i32, x: x as i32 };
                let (terrain, marker) = match glyph {
                    '.' => (Terrain::Floor, None),
                    '@' => {
                        agent = Some(pos);
                        (Terrain::Floor, None)
                    }
                    '#' => (Terrain::Wall, None),
                    '%' => (Terrain::Vein, None),
                    ':' => (Terrain::Rubble, None),
                    ';' => (Terrain::PassableRubble, None),
                    '+' => (Terrain::ClosedDoor, None),
                    '\'' => (Terrain::OpenDoor, None),
                    'X' => (Terrain::Permanent, None),
                    'L' => (Terrain::Lava, None),
                    '<' => (Terrain::UpStairs, None),
                    '>' => (Terrain::DownStairs, None),
                    '?' => (Terrain::Unknown, None),
                    '^' => (Terrain::Floor, Some(Marker::Trap)),
                    '=' => (Terrain::Floor, Some(Marker::Ward)),
                    '1'..='9' => (Terrain::Shop(ShopId(glyph as u8 - b'0')), None),
                    _ => return Err(ScenarioError::UnknownGlyph { glyph, pos }),
                };
                map.set_tile(pos, terrain);
                map.set_marker(pos, marker);
            }
        }
        Ok((map, agent))
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn tile_at(&self, pos: Pos) -> Terrain {
        if !self.in_bounds(pos) {
            return Terrain::Permanent;
        }
        self.tiles[self.index(pos)]
    }

    pub fn set_tile(&mut self, pos: Pos, terrain: Terrain) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = terrain;
    }

    pub fn marker_at(&self, pos: Pos) -> Option<Marker> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.markers[self.index(pos)]
    }

    pub fn set_marker(&mut self, pos: Pos, marker: Option<Marker>) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.markers[idx] = marker;
    }

    pub fn danger_at(&self, pos: Pos) -> u32 {
        if !self.in_bounds(pos) {
            return 0;
        }
        self.danger[self.index(pos)]
    }

    pub fn set_danger(&mut self, pos: Pos, danger: u32) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.danger[idx] = danger;
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

pub struct ScenarioWorld {
    pub map: ScenarioMap,
    pub actors: SlotMap<ActorId, ActorInfo>,
    pub items: SlotMap<ItemId, ItemInfo>,
    pub agent: AgentStatus,
    pub level: LevelStatus,
    danger_queries: Cell<u64>,
}

impl ScenarioWorld {
    pub fn new(map: ScenarioMap, agent_pos: Pos) -> Self {
        Self {
            map,
            actors: SlotMap::with_key(),
            items: SlotMap::with_key(),
            agent: AgentStatus { pos: agent_pos, ..AgentStatus::default() },
            level: LevelStatus::default(),
            danger_queries: Cell::new(0),
        }
    }

    pub fn add_actor(&mut self, pos: Pos, name: &str, unique: bool) -> ActorId {
        self.actors.insert(ActorInfo { pos, name: name.to_string(), unique })
    }

    pub fn add_item(&mut self, pos: Pos, name: &str, kind: ItemKind) -> ItemId {
        self.items.insert(ItemInfo { pos, name: name.to_string(), kind })
    }

    /// Times the danger oracle has been consulted.
    pub fn danger_queries(&self) -> u64 {
        self.danger_queries.get()
    }

    /// Plays one action out; returns whether terrain, markers or monsters changed.
    pub fn apply(&mut self, action: &Action) -> bool {
        let here = self.agent.pos;
        match *action {
            Action::Move(dir) | Action::EnterShop { dir, .. } => {
                let dest = here.step(dir);
                let terrain = self.map.tile_at(dest);
                if terrain.is_wall() || terrain == Terrain::ClosedDoor || self.actor_at(dest).is_some()
                {
                    return false;
                }
                self.agent.pos = dest;
                if let Some(id) = self.item_at(dest)
                    && !matches!(self.items[id].kind, ItemKind::Chest(_))
                {
                    self.items.remove(id);
                }
                false
            }
            Action::Attack(dir) => match self.actor_at(here.step(dir)) {
                Some(id) => {
                    self.actors.remove(id);
                    true
                }
                None => false,
            },
            Action::Open(dir) => {
                let dest = here.step(dir);
                if let Some(id) = self.item_at(dest)
                    && let ItemKind::Chest(_) = self.items[id].kind
                {
                    self.items[id].kind = ItemKind::Chest(ChestState::Empty);
                    return false;
                }
                self.swap_tile(dest, Terrain::ClosedDoor, Terrain::OpenDoor)
            }
            Action::Close(dir) => {
                self.swap_tile(here.step(dir), Terrain::OpenDoor, Terrain::ClosedDoor)
            }
            Action::Disarm(dir) => {
                let dest = here.step(dir);
                if let Some(id) = self.item_at(dest)
                    && let ItemKind::Chest(ChestState::Trapped { .. }) = self.items[id].kind
                {
                    self.items[id].kind = ItemKind::Chest(ChestState::Disarmed);
                    return false;
                }
                self.clear_trap(dest)
            }
            Action::Tunnel(dir) => {
                let dest = here.step(dir);
                if !self.map.tile_at(dest).is_diggable() {
                    return false;
                }
                self.map.set_tile(dest, Terrain::Floor);
                true
            }
            Action::Ascend => {
                self.level.take_stairs = false;
                false
            }
            Action::Invoke { effect, target } => match effect {
                Effect::DisableTraps => self.clear_trap(target),
                Effect::DestroyDoors => {
                    self.swap_tile(target, Terrain::ClosedDoor, Terrain::Floor)
                        || self.swap_tile(target, Terrain::OpenDoor, Terrain::Floor)
                }
                Effect::StoneToMud => {
                    let terrain = self.map.tile_at(target);
                    if terrain.is_diggable() || terrain == Terrain::ClosedDoor {
                        self.map.set_tile(target, Terrain::Floor);
                        true
                    } else {
                        false
                    }
                }
                Effect::CurseProbe => false,
            },
        }
    }

    fn actor_at(&self, pos: Pos) -> Option<ActorId> {
        self.actors.iter().find(|(_, actor)| actor.pos == pos).map(|(id, _)| id)
    }

    fn item_at(&self, pos: Pos) -> Option<ItemId> {
        self.items.iter().find(|(_, item)| item.pos == pos).map(|(id, _)| id)
    }

    fn swap_tile(&mut self, pos: Pos, from: Terrain, to: Terrain) -> bool {
        if self.map.tile_at(pos) != from {
            return false;
        }
        self.map.set_tile(pos, to);
        true
    }

    fn clear_trap(&mut self, pos: Pos) -> bool {
        if self.map.marker_at(pos) != Some(Marker::Trap) {
            return false;
        }
        self.map.set_marker(pos, None);
        true
    }
}

impl World for ScenarioWorld {
    fn dimensions(&self) -> (usize, usize) {
        (self.map.width, self.map.height)
    }

    fn terrain(&self, pos: Pos) -> Terrain {
        self.map.tile_at(pos)
    }

    fn marker(&self, pos: Pos) -> Option<Marker> {
        self.map.marker_at(pos)
    }

    fn occupant(&self, pos: Pos) -> Option<Occupant> {
        if let Some(id) = self.actor_at(pos) {
            return Some(Occupant::Actor(id));
        }
        self.item_at(pos).map(Occupant::Item)
    }

    fn danger(&self, pos: Pos, exposure_turns: u32) -> u32 {
        self.danger_queries.set(self.danger_queries.get() + 1);
        self.map.danger_at(pos).saturating_mul(exposure_turns.max(1))
    }

    fn actor(&self, id: ActorId) -> Option<&ActorInfo> {
        self.actors.get(id)
    }

    fn item(&self, id: ItemId) -> Option<&ItemInfo> {
        self.items.get(id)
    }

    fn agent(&self) -> &AgentStatus {
        &self.agent
    }

    fn level(&self) -> &LevelStatus {
        &self.level
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerSpot {
    pub pos: Pos,
    pub danger: u32,
}

/// On-disk description of a navigation problem.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub rows: Vec<String>,
    pub goal: Goal,
    /// Sources to flow toward; empty means every actor for `Kill`, every item for `Take`.
    #[serde(default)]
    pub targets: Vec<Pos>,
    #[serde(default)]
    pub actors: Vec<ActorInfo>,
    #[serde(default)]
    pub items: Vec<ItemInfo>,
    #[serde(default)]
    pub agent: AgentStatus,
    #[serde(default)]
    pub level: LevelStatus,
    #[serde(default)]
    pub dangers: Vec<DangerSpot>,
    #[serde(default)]
    pub policy: RiskPolicy,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scenario map has no rows")]
    EmptyMap,
    #[error("row {row} has a different width than row 0")]
    RaggedRow { row: usize },
    #[error("unknown map glyph {glyph:?} at ({}, {})", pos.y, pos.x)]
    UnknownGlyph { glyph: char, pos: Pos },
    #[error("scenario map has no '@' square for the agent")]
    MissingAgent,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn build(&self) -> Result<ScenarioWorld, ScenarioError> {
        let (mut map, agent_pos) = ScenarioMap::from_rows(&self.rows)?;
        let agent_pos = agent_pos.ok_or(ScenarioError::MissingAgent)?;
        for spot in &self.dangers {
            map.set_danger(spot.pos, spot.danger);
        }
        let mut world = ScenarioWorld::new(map, agent_pos);
        world.agent = AgentStatus { pos: agent_pos, ..self.agent.clone() };
        world.level = self.level.clone();
        for actor in &self.actors {
            world.actors.insert(actor.clone());
        }
        for item in &self.items {
            world.items.insert(item.clone());
        }
        Ok(world)
    }

    /// Resolves the squares to flow toward against the current world.
    pub fn targets_in(&self, world: &ScenarioWorld) -> Vec<Pos> {
        if !self.targets.is_empty() {
            return self.targets.clone();
        }
        match self.goal {
            Goal::Kill => world.actors.values().map(|actor| actor.pos).collect(),
            Goal::Take => world.items.values().map(|item| item.pos).collect(),
            _ => Vec::new(),
        }
    }
}
