//! Placement rules: structure kinds, placed pieces, and the two pure
//! validators for settlements and roads.
//!
//! The validators answer only the geometric/connectivity question. Occupancy
//! of the target location, its existence on the grid, and turn/phase gating
//! are checked by the room before these run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::grid::{EdgeId, Grid, ParseLocationError, VertexId};
use crate::player::PlayerColor;

/// The kinds of pieces a player can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Road,
    Settlement,
    City,
}

impl StructureKind {
    /// Settlements and cities occupy vertices; roads occupy edges.
    pub fn is_building(&self) -> bool {
        matches!(self, StructureKind::Settlement | StructureKind::City)
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructureKind::Road => "road",
            StructureKind::Settlement => "settlement",
            StructureKind::City => "city",
        };
        f.write_str(name)
    }
}

/// Where a piece sits: a vertex for buildings, an edge for roads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationId {
    Vertex(VertexId),
    Edge(EdgeId),
}

impl LocationId {
    pub fn as_vertex(&self) -> Option<VertexId> {
        match self {
            LocationId::Vertex(v) => Some(*v),
            LocationId::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<EdgeId> {
        match self {
            LocationId::Edge(e) => Some(*e),
            LocationId::Vertex(_) => None,
        }
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationId::Vertex(v) => v.fmt(f),
            LocationId::Edge(e) => e.fmt(f),
        }
    }
}

impl FromStr for LocationId {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('|') {
            Ok(LocationId::Edge(s.parse()?))
        } else {
            Ok(LocationId::Vertex(s.parse()?))
        }
    }
}

impl Serialize for LocationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A piece on the board. The placement list is append-only for the lifetime
/// of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedStructure {
    pub id: Uuid,
    pub kind: StructureKind,
    pub color: PlayerColor,
    pub location: LocationId,
}

impl PlacedStructure {
    pub fn new(kind: StructureKind, color: PlayerColor, location: LocationId) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            color,
            location,
        }
    }
}

/// Whether `color` may place a settlement at `vertex`.
///
/// The distance rule holds in every phase: no building (any color) may sit on
/// an adjacent vertex. Outside setup the settlement must also touch one of
/// the player's own roads.
pub fn settlement_allowed(
    vertex: VertexId,
    color: PlayerColor,
    structures: &[PlacedStructure],
    grid: &Grid,
    is_setup: bool,
) -> bool {
    let neighbors = grid.neighbors(vertex);
    let blocked = structures.iter().any(|s| {
        s.kind.is_building()
            && matches!(s.location, LocationId::Vertex(v) if neighbors.contains(&v))
    });
    if blocked {
        return false;
    }

    if is_setup {
        return true;
    }

    structures.iter().any(|s| {
        s.color == color
            && s.kind == StructureKind::Road
            && matches!(s.location, LocationId::Edge(e) if e.touches(vertex))
    })
}

/// Whether `color` may place a road on `edge`.
///
/// The edge must exist on the grid and the player must already be present at
/// one of its endpoints, either with a building or with another road. The
/// same rule applies during setup and regular play.
pub fn road_allowed(
    edge: EdgeId,
    color: PlayerColor,
    structures: &[PlacedStructure],
    grid: &Grid,
) -> bool {
    if grid.edge(&edge).is_none() {
        return false;
    }

    let (a, b) = edge.endpoints();
    structures.iter().filter(|s| s.color == color).any(|s| match s.location {
        LocationId::Vertex(v) => s.kind.is_building() && (v == a || v == b),
        LocationId::Edge(e) => s.kind == StructureKind::Road && (e.touches(a) || e.touches(b)),
    })
}
