//! Roster types: sessions, colors, players, and resource accounting.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::Resource;
use crate::rules::StructureKind;

/// Transport-assigned identity of one connection. Opaque to the rules; the
/// sync layer decides its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Seat colors, in assignment order. A room never seats more players than
/// there are colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    White,
    Orange,
}

impl PlayerColor {
    /// The palette, in the order seats are handed out.
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::White,
        PlayerColor::Orange,
    ];
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::White => "white",
            PlayerColor::Orange => "orange",
        };
        f.write_str(name)
    }
}

/// A typed hand of resources. Counts never go negative; `debit` asserts the
/// hand was checked with `can_afford` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        match resource {
            Resource::Wood => self.wood += amount,
            Resource::Brick => self.brick += amount,
            Resource::Sheep => self.sheep += amount,
            Resource::Wheat => self.wheat += amount,
            Resource::Ore => self.ore += amount,
        }
    }

    pub fn add_set(&mut self, other: &ResourceSet) {
        self.wood += other.wood;
        self.brick += other.brick;
        self.sheep += other.sheep;
        self.wheat += other.wheat;
        self.ore += other.ore;
    }

    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn can_afford(&self, cost: &ResourceSet) -> bool {
        self.wood >= cost.wood
            && self.brick >= cost.brick
            && self.sheep >= cost.sheep
            && self.wheat >= cost.wheat
            && self.ore >= cost.ore
    }

    /// Remove `cost` from the hand. Callers must check `can_afford` first.
    pub fn debit(&mut self, cost: &ResourceSet) {
        assert!(self.can_afford(cost), "debit without affordability check");
        self.wood -= cost.wood;
        self.brick -= cost.brick;
        self.sheep -= cost.sheep;
        self.wheat -= cost.wheat;
        self.ore -= cost.ore;
    }
}

/// Build costs.
pub mod costs {
    use super::ResourceSet;
    use crate::rules::StructureKind;

    pub const fn road() -> ResourceSet {
        ResourceSet::with_amounts(1, 1, 0, 0, 0)
    }

    pub const fn settlement() -> ResourceSet {
        ResourceSet::with_amounts(1, 1, 1, 1, 0)
    }

    pub const fn city() -> ResourceSet {
        ResourceSet::with_amounts(0, 0, 0, 2, 3)
    }

    pub const fn cost_of(kind: StructureKind) -> ResourceSet {
        match kind {
            StructureKind::Road => road(),
            StructureKind::Settlement => settlement(),
            StructureKind::City => city(),
        }
    }
}

/// Per-player piece pool limit.
pub const fn piece_cap(kind: StructureKind) -> usize {
    match kind {
        StructureKind::Road => 15,
        StructureKind::Settlement => 5,
        StructureKind::City => 4,
    }
}

/// One seated player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub session_id: SessionId,
    pub name: String,
    pub color: PlayerColor,
    pub resources: ResourceSet,
    pub victory_points: u32,
    pub ready: bool,
    pub is_host: bool,
}

impl Player {
    pub fn new(session_id: SessionId, name: String, color: PlayerColor, is_host: bool) -> Self {
        Self {
            session_id,
            name,
            color,
            resources: ResourceSet::new(),
            victory_points: 0,
            ready: false,
            is_host,
        }
    }

    /// Wipe per-game state when a new game starts from the lobby.
    pub fn reset_for_start(&mut self) {
        self.resources = ResourceSet::new();
        self.victory_points = 0;
        self.ready = false;
    }
}
