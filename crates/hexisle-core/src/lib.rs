//! Authoritative rules engine for Hexisle, a multiplayer
//! territory-and-resource board game on a hexagonal map.
//!
//! The crate is transport-agnostic: a sync layer feeds [`Command`]s into a
//! [`Room`] and broadcasts the [`RoomSnapshot`] after every applied command.
//! The room is the single source of truth; clients send intents, never
//! state.

pub mod board;
pub mod command;
pub mod grid;
pub mod player;
pub mod production;
pub mod room;
pub mod rules;
pub mod snapshot;

pub use board::{Board, Hex, HexCoord, Resource, Terrain};
pub use command::Command;
pub use grid::{Edge, EdgeId, Grid, ParseLocationError, Vertex, VertexId};
pub use player::{costs, piece_cap, Player, PlayerColor, ResourceSet, SessionId};
pub use production::resources_for_roll;
pub use room::{GamePhase, Outcome, Room, RoomError, TurnPhase, GAME_LOG_CAP, MAX_PLAYERS};
pub use rules::{
    road_allowed, settlement_allowed, LocationId, PlacedStructure, StructureKind,
};
pub use snapshot::RoomSnapshot;
