use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    pub struct ActorId;
    pub struct ItemId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn step(self, dir: Direction) -> Pos {
        let (dy, dx) = dir.delta();
        Pos { y: self.y + dy, x: self.x + dx }
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.y.abs_diff(other.y).max(self.x.abs_diff(other.x))
    }
}

/// The eight compass steps, in the fixed neighbour expansion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    South,
    North,
    East,
    West,
    SouthEast,
    SouthWest,
    NorthEast,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthEast,
        Direction::NorthWest,
    ];

    /// `(dy, dx)` with y growing southwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::South => (1, 0),
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn is_orthogonal(self) -> bool {
        let (dy, dx) = self.delta();
        dy == 0 || dx == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShopId(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Unknown,
    Floor,
    OpenDoor,
    ClosedDoor,
    PassableRubble,
    Rubble,
    Vein,
    Wall,
    Permanent,
    Lava,
    UpStairs,
    DownStairs,
    Shop(ShopId),
}

/// Static entry cost that no traversal mode can lower.
pub const IMPASSABLE: u8 = 255;

impl Terrain {
    /// Blocks walking unless the agent tunnels through it.
    pub fn is_wall(self) -> bool {
        matches!(self, Terrain::Rubble | Terrain::Vein | Terrain::Wall | Terrain::Permanent)
    }

    pub fn is_diggable(self) -> bool {
        matches!(self, Terrain::Rubble | Terrain::Vein | Terrain::Wall)
    }

    pub fn shop(self) -> Option<ShopId> {
        match self {
            Terrain::Shop(id) => Some(id),
            _ => None,
        }
    }

    pub fn hard_cost(self) -> u8 {
        match self {
            Terrain::Permanent => IMPASSABLE,
            _ => 1,
        }
    }
}

/// Non-terrain features drawn on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    Trap,
    /// A ward the agent placed itself; never hostile to it.
    Ward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupant {
    Actor(ActorId),
    Item(ItemId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    Kill,
    Take,
    Shop,
    Explore,
    Search,
    Leave,
    Flee,
    Vault,
    Recover,
    Digging,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    Afraid,
    TownUnique,
    ItemVanished,
    TrapUnsafe,
    HostileAdjacent,
    DoorRefused,
    CannotDig,
    NoDigWhileExploring,
    DigLoopBreak,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionOutcome {
    Moved,
    Attacked,
    Opened,
    Closed,
    Disarmed,
    Dug,
    Entered,
    Probed,
    Ascended,
    Blocked(BlockReason),
}

impl ActionOutcome {
    /// Whether a game turn was spent.
    pub fn acted(self) -> bool {
        !matches!(self, ActionOutcome::Blocked(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavEvent {
    FlowCommitted { goal: Goal, cost: u16 },
    CommitRejected { goal: Goal },
    GoalAbandoned { goal: Goal },
    QueueOverflow { dropped: u32 },
    HazardsInvalidated,
    Stepped { goal: Goal, dir: Direction, outcome: ActionOutcome },
    AnchorReached { anchor: Pos },
}

/// Host integration faults; never raised for ordinary navigation failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("position ({}, {}) lies outside the navigation grid", pos.y, pos.x)]
    OutOfBounds { pos: Pos },
    #[error("world is {found:?} (w, h) but the grid was built for {expected:?}")]
    DimensionMismatch { expected: (usize, usize), found: (usize, usize) },
}

pub type NavResult<T> = Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_deltas_are_distinct_unit_steps() {
        let origin = Pos { y: 0, x: 0 };
        let mut seen = Vec::new();
        for dir in Direction::ALL {
            let next = origin.step(dir);
            assert_eq!(origin.chebyshev(next), 1, "{dir:?} should be a single step");
            assert!(!seen.contains(&next));
            seen.push(next);
        }
    }

    #[test]
    fn wall_classification_keeps_passable_features_open() {
        for terrain in [Terrain::Rubble, Terrain::Vein, Terrain::Wall, Terrain::Permanent] {
            assert!(terrain.is_wall(), "{terrain:?}");
        }
        for terrain in
            [Terrain::PassableRubble, Terrain::Lava, Terrain::ClosedDoor, Terrain::Shop(ShopId(1))]
        {
            assert!(!terrain.is_wall(), "{terrain:?}");
        }
        assert!(!Terrain::Permanent.is_diggable());
        assert_eq!(Terrain::Permanent.hard_cost(), IMPASSABLE);
    }
}
