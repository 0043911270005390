//! Board generation: the fixed 19-hex layout with randomized terrain and
//! number tokens.
//!
//! Only the terrain assignment is random. The token sequence is fixed and is
//! consumed in coordinate-scan order, skipping the desert, so where each
//! token lands is entirely determined by where the terrain shuffle puts the
//! desert.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Radius of the standard board (hexes satisfy `|q|,|r|,|q+r| <= 2`).
pub const BOARD_RADIUS: i32 = 2;

/// Number token layout, consumed in scan order over the non-desert hexes.
pub const TOKEN_SEQUENCE: [u8; 18] = [5, 2, 6, 3, 8, 10, 9, 12, 11, 4, 8, 10, 9, 4, 5, 6, 3, 11];

/// Axial coordinate of a hex tile.
///
/// `q` increases going east, `r` increases going southeast.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Stable string key, `"q,r"`, used to cross-reference vertices and hexes
    /// in the state exposed to clients.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// One of five producible resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types.
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// Terrain of a hex tile. Exactly one desert per board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Forest,
    Pasture,
    Fields,
    Hills,
    Mountains,
    Desert,
}

impl Terrain {
    /// The resource this terrain produces, if any.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Forest => Some(Resource::Wood),
            Terrain::Pasture => Some(Resource::Sheep),
            Terrain::Fields => Some(Resource::Wheat),
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Desert => None,
        }
    }

    /// Terrain pool for a standard board, in insertion order before the
    /// shuffle.
    fn pool() -> Vec<Terrain> {
        let counts = [
            (Terrain::Forest, 4),
            (Terrain::Pasture, 4),
            (Terrain::Fields, 4),
            (Terrain::Hills, 3),
            (Terrain::Mountains, 3),
            (Terrain::Desert, 1),
        ];
        let mut pool = Vec::with_capacity(19);
        for (terrain, count) in counts {
            pool.extend(std::iter::repeat(terrain).take(count));
        }
        pool
    }
}

/// A single hex tile. Immutable once the board is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub coord: HexCoord,
    pub terrain: Terrain,
    /// Dice total that makes this hex produce (2-12, never for desert).
    pub number_token: Option<u8>,
}

/// The generated terrain/token layout for one game. Immutable after
/// generation; structures live in the room state, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    hexes: Vec<Hex>,
}

impl Board {
    /// Generate a random standard board.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self::generate_with_rng(&mut rng)
    }

    /// Generate a board with a provided RNG, for deterministic layouts.
    pub fn generate_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut pool = Terrain::pool();
        pool.shuffle(rng);

        let mut tokens = TOKEN_SEQUENCE.iter().copied();
        let mut terrains = pool.into_iter();
        let mut hexes = Vec::with_capacity(19);

        for q in -BOARD_RADIUS..=BOARD_RADIUS {
            let r_min = (-BOARD_RADIUS).max(-q - BOARD_RADIUS);
            let r_max = BOARD_RADIUS.min(-q + BOARD_RADIUS);
            for r in r_min..=r_max {
                let terrain = terrains.next().unwrap_or(Terrain::Desert);
                let number_token = if terrain == Terrain::Desert {
                    None
                } else {
                    tokens.next()
                };
                hexes.push(Hex {
                    coord: HexCoord::new(q, r),
                    terrain,
                    number_token,
                });
            }
        }

        Self { hexes }
    }

    /// All hexes in coordinate-scan order.
    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.iter()
    }

    pub fn hex_count(&self) -> usize {
        self.hexes.len()
    }

    /// Look up a hex by coordinate.
    pub fn hex_at(&self, coord: &HexCoord) -> Option<&Hex> {
        self.hexes.iter().find(|h| h.coord == *coord)
    }
}
