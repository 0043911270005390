//! Resource distribution for a dice roll.

use std::collections::HashMap;

use crate::board::Board;
use crate::grid::Grid;
use crate::player::{PlayerColor, ResourceSet};
use crate::rules::{LocationId, PlacedStructure, StructureKind};

/// Resources produced by `roll`, accumulated per color.
///
/// Every non-desert hex whose token matches the roll pays each building on
/// one of its corners: one card per settlement, two per city. Roads never
/// produce. The map is empty when no building borders a matching hex.
pub fn resources_for_roll(
    roll: u8,
    board: &Board,
    structures: &[PlacedStructure],
    grid: &Grid,
) -> HashMap<PlayerColor, ResourceSet> {
    let mut gained: HashMap<PlayerColor, ResourceSet> = HashMap::new();

    for hex in board.hexes().filter(|h| h.number_token == Some(roll)) {
        let Some(resource) = hex.terrain.resource() else {
            continue;
        };

        for structure in structures {
            let amount = match structure.kind {
                StructureKind::Road => continue,
                StructureKind::Settlement => 1,
                StructureKind::City => 2,
            };
            let LocationId::Vertex(vertex_id) = structure.location else {
                continue;
            };
            let Some(vertex) = grid.vertex(&vertex_id) else {
                continue;
            };
            if vertex.adjacent_hexes.contains(&hex.coord) {
                gained
                    .entry(structure.color)
                    .or_default()
                    .add(resource, amount);
            }
        }
    }

    gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{HexCoord, Terrain};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Board, Grid) {
        let board = Board::generate();
        let grid = Grid::build(&board);
        (board, grid)
    }

    /// A producing hex with its token, and one of its corner vertices.
    fn producing_corner(board: &Board, grid: &Grid) -> (HexCoord, u8, Terrain, crate::grid::VertexId) {
        let hex = board
            .hexes()
            .find(|h| h.number_token.is_some())
            .expect("board always has producing hexes");
        let vertex = grid
            .vertices()
            .find(|v| v.adjacent_hexes.contains(&hex.coord))
            .expect("every hex has corners");
        (hex.coord, hex.number_token.unwrap(), hex.terrain, vertex.id)
    }

    #[test]
    fn settlement_earns_one_city_earns_two() {
        let (board, grid) = fixture();
        let (_, roll, terrain, vertex) = producing_corner(&board, &grid);
        let resource = terrain.resource().unwrap();

        let settlement = vec![PlacedStructure::new(
            StructureKind::Settlement,
            PlayerColor::Red,
            LocationId::Vertex(vertex),
        )];
        let gained = resources_for_roll(roll, &board, &settlement, &grid);
        assert_eq!(gained[&PlayerColor::Red].get(resource), 1);

        let city = vec![PlacedStructure::new(
            StructureKind::City,
            PlayerColor::Red,
            LocationId::Vertex(vertex),
        )];
        let gained = resources_for_roll(roll, &board, &city, &grid);
        assert_eq!(gained[&PlayerColor::Red].get(resource), 2);
    }

    #[test]
    fn roads_never_produce() {
        let (board, grid) = fixture();
        let edge = grid.edges().next().unwrap();
        let placed = vec![PlacedStructure::new(
            StructureKind::Road,
            PlayerColor::Blue,
            LocationId::Edge(edge.id),
        )];

        for roll in 2..=12 {
            assert!(resources_for_roll(roll, &board, &placed, &grid).is_empty());
        }
    }

    #[test]
    fn no_structures_means_no_distribution() {
        let (board, grid) = fixture();
        for roll in 2..=12 {
            assert!(resources_for_roll(roll, &board, &[], &grid).is_empty());
        }
    }

    #[test]
    fn non_matching_roll_pays_nothing() {
        let (board, grid) = fixture();
        let (_, roll, _, vertex) = producing_corner(&board, &grid);

        // Pick a roll value no adjacent hex carries.
        let adjacent_tokens: Vec<u8> = grid
            .vertex(&vertex)
            .unwrap()
            .adjacent_hexes
            .iter()
            .filter_map(|c| board.hex_at(c).and_then(|h| h.number_token))
            .collect();
        let other_roll = (2..=12).find(|r| *r != roll && !adjacent_tokens.contains(r));

        if let Some(other_roll) = other_roll {
            let placed = vec![PlacedStructure::new(
                StructureKind::Settlement,
                PlayerColor::White,
                LocationId::Vertex(vertex),
            )];
            let gained = resources_for_roll(other_roll, &board, &placed, &grid);
            assert!(gained.get(&PlayerColor::White).is_none());
        }
    }

    #[test]
    fn duplicate_tokens_accumulate() {
        let (board, grid) = fixture();

        // 8 appears twice in the token layout; seat a settlement on a corner
        // of each and confirm both pay on the same roll.
        let eights: Vec<_> = board
            .hexes()
            .filter(|h| h.number_token == Some(8))
            .collect();
        assert_eq!(eights.len(), 2);

        let mut placed = Vec::new();
        let mut expected = ResourceSet::new();
        for (i, hex) in eights.iter().enumerate() {
            let other = eights[1 - i].coord;
            let vertex = grid
                .vertices()
                .find(|v| {
                    v.adjacent_hexes.contains(&hex.coord) && !v.adjacent_hexes.contains(&other)
                })
                .unwrap();
            placed.push(PlacedStructure::new(
                StructureKind::Settlement,
                PlayerColor::Orange,
                LocationId::Vertex(vertex.id),
            ));
            expected.add(hex.terrain.resource().unwrap(), 1);
        }

        let gained = resources_for_roll(8, &board, &placed, &grid);
        assert_eq!(gained[&PlayerColor::Orange], expected);
    }
}
