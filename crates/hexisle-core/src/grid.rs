//! Grid derivation: the deduplicated vertex/edge graph of a board.
//!
//! Vertices are identified by their snapped planar position so that corners
//! computed from different hexes collapse to a single node, and edges by the
//! sorted pair of their endpoint vertices. For the standard 19-hex board this
//! yields exactly 54 vertices and 72 edges.

use crate::board::{Board, HexCoord};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::f64::consts::{FRAC_PI_3, FRAC_PI_6};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Snap precision: positions are kept in milli-units (3 decimal places),
/// which is enough to merge floating-point-adjacent corners of neighboring
/// hexes into one key.
const SNAP_SCALE: f64 = 1000.0;

/// A location id string could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed location id")]
pub struct ParseLocationError;

/// Identity of a vertex: its planar position snapped to fixed precision.
///
/// Renders as `"x.xxx,z.zzz"`, the form clients echo back in placement
/// commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId {
    x_milli: i32,
    z_milli: i32,
}

impl VertexId {
    /// Snap a raw planar position to its canonical id.
    pub fn snap(x: f64, z: f64) -> Self {
        Self {
            x_milli: (x * SNAP_SCALE).round() as i32,
            z_milli: (z * SNAP_SCALE).round() as i32,
        }
    }

    pub fn x(&self) -> f64 {
        f64::from(self.x_milli) / SNAP_SCALE
    }

    pub fn z(&self) -> f64 {
        f64::from(self.z_milli) / SNAP_SCALE
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3},{:.3}", self.x(), self.z())
    }
}

impl FromStr for VertexId {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, z) = s.split_once(',').ok_or(ParseLocationError)?;
        let x: f64 = x.trim().parse().map_err(|_| ParseLocationError)?;
        let z: f64 = z.trim().parse().map_err(|_| ParseLocationError)?;
        Ok(Self::snap(x, z))
    }
}

impl Serialize for VertexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VertexId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Identity of an undirected edge: the sorted pair of its endpoint vertices.
///
/// Renders as `"v1|v2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId {
    a: VertexId,
    b: VertexId,
}

impl EdgeId {
    /// Build the canonical id for an edge between two vertices, in either
    /// order.
    pub fn new(v1: VertexId, v2: VertexId) -> Self {
        if v1 <= v2 {
            Self { a: v1, b: v2 }
        } else {
            Self { a: v2, b: v1 }
        }
    }

    /// The two endpoint vertices, in canonical order.
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.a, self.b)
    }

    /// Whether `vertex` is one of this edge's endpoints.
    pub fn touches(&self, vertex: VertexId) -> bool {
        self.a == vertex || self.b == vertex
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.a, self.b)
    }
}

impl FromStr for EdgeId {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (v1, v2) = s.split_once('|').ok_or(ParseLocationError)?;
        Ok(Self::new(v1.parse()?, v2.parse()?))
    }
}

impl Serialize for EdgeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// A deduplicated corner shared by up to three hexes. Immutable after
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub x: f64,
    pub z: f64,
    /// Hexes touching this corner (1-3 on the standard board).
    pub adjacent_hexes: BTreeSet<HexCoord>,
}

/// A deduplicated side shared by at most two hexes. The midpoint and
/// rotation are presentation data for clients and play no part in the rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub v1: VertexId,
    pub v2: VertexId,
    pub x: f64,
    pub z: f64,
    pub rotation: f64,
}

/// The vertex/edge graph derived from a board. Pure function of the hex
/// layout.
#[derive(Debug, Clone)]
pub struct Grid {
    vertices: HashMap<VertexId, Vertex>,
    edges: HashMap<EdgeId, Edge>,
}

impl Grid {
    /// Derive the deduplicated graph from a board.
    ///
    /// Uses the pointy-top projection `x = sqrt(3) * (q + r/2)`, `z = 1.5 * r`
    /// with unit circumradius; corners sit at 60-degree increments offset by
    /// 30 degrees.
    pub fn build(board: &Board) -> Self {
        let mut vertices: HashMap<VertexId, Vertex> = HashMap::new();
        let mut edges: HashMap<EdgeId, Edge> = HashMap::new();

        for hex in board.hexes() {
            let cx = 3f64.sqrt() * (f64::from(hex.coord.q) + f64::from(hex.coord.r) / 2.0);
            let cz = 1.5 * f64::from(hex.coord.r);

            let mut corners = Vec::with_capacity(6);
            for i in 0..6 {
                let angle = f64::from(i) * FRAC_PI_3 + FRAC_PI_6;
                let id = VertexId::snap(cx + angle.cos(), cz + angle.sin());
                corners.push(id);

                vertices
                    .entry(id)
                    .or_insert_with(|| Vertex {
                        id,
                        x: id.x(),
                        z: id.z(),
                        adjacent_hexes: BTreeSet::new(),
                    })
                    .adjacent_hexes
                    .insert(hex.coord);
            }

            for i in 0..6 {
                let v1 = corners[i];
                let v2 = corners[(i + 1) % 6];
                let id = EdgeId::new(v1, v2);
                edges.entry(id).or_insert_with(|| {
                    let (dx, dz) = (v2.x() - v1.x(), v2.z() - v1.z());
                    Edge {
                        id,
                        v1,
                        v2,
                        x: (v1.x() + v2.x()) / 2.0,
                        z: (v1.z() + v2.z()) / 2.0,
                        rotation: -dz.atan2(dx),
                    }
                });
            }
        }

        Self { vertices, edges }
    }

    pub fn vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges incident to a vertex.
    pub fn edges_at(&self, vertex: VertexId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.id.touches(vertex))
    }

    /// Vertices exactly one edge away from `vertex`.
    pub fn neighbors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.edges_at(vertex)
            .map(|e| if e.v1 == vertex { e.v2 } else { e.v1 })
            .collect()
    }
}
