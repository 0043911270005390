//! Wire-shaped read-only state. The sync layer broadcasts one of these after
//! every applied command; clients never see the room itself.
//!
//! Field names and sentinel values follow the client schema: camelCase keys,
//! ids and hex keys as strings, `diceRoll` of -1 when nothing has been
//! rolled, empty `hostSessionId` when the room has no host.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::player::{PlayerColor, ResourceSet, SessionId};
use crate::room::{GamePhase, Room, TurnPhase};
use crate::rules::StructureKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexSnapshot {
    pub q: i32,
    pub r: i32,
    pub terrain: crate::board::Terrain,
    /// -1 for the desert.
    pub number_token: i8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexSnapshot {
    pub id: String,
    pub x: f64,
    pub z: f64,
    /// Keys of the hexes touching this corner, `"q,r"`.
    pub adjacent_hexes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSnapshot {
    pub id: String,
    pub v1: String,
    pub v2: String,
    pub x: f64,
    pub z: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub session_id: SessionId,
    pub name: String,
    pub color: PlayerColor,
    pub resources: ResourceSet,
    pub victory_points: u32,
    pub ready: bool,
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSnapshot {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: StructureKind,
    pub color: PlayerColor,
    pub location_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub board: Vec<HexSnapshot>,
    pub vertices: Vec<VertexSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub players: HashMap<SessionId, PlayerSnapshot>,
    pub turn_order: Vec<SessionId>,
    pub placed_structures: Vec<StructureSnapshot>,
    pub last_distributed_resources: HashMap<PlayerColor, ResourceSet>,
    pub game_log: Vec<String>,
    pub game_phase: GamePhase,
    pub turn_phase: TurnPhase,
    pub current_player_index: usize,
    /// -1 until the current player rolls.
    pub dice_roll: i16,
    /// Empty string when the room has no host.
    pub host_session_id: String,
    pub room_code: String,
}

impl RoomSnapshot {
    pub fn capture(room: &Room) -> Self {
        let board = room
            .board()
            .hexes()
            .map(|h| HexSnapshot {
                q: h.coord.q,
                r: h.coord.r,
                terrain: h.terrain,
                number_token: h.number_token.map_or(-1, |t| t as i8),
            })
            .collect();

        // Grid maps have no stable iteration order; sort by id so snapshots
        // of the same room compare equal.
        let mut vertices: Vec<_> = room.grid().vertices().collect();
        vertices.sort_by_key(|v| v.id);
        let vertices = vertices
            .into_iter()
            .map(|v| VertexSnapshot {
                id: v.id.to_string(),
                x: v.x,
                z: v.z,
                adjacent_hexes: v.adjacent_hexes.iter().map(|c| c.key()).collect(),
            })
            .collect();

        let mut edges: Vec<_> = room.grid().edges().collect();
        edges.sort_by_key(|e| e.id);
        let edges = edges
            .into_iter()
            .map(|e| EdgeSnapshot {
                id: e.id.to_string(),
                v1: e.v1.to_string(),
                v2: e.v2.to_string(),
                x: e.x,
                z: e.z,
                rotation: e.rotation,
            })
            .collect();

        let players = room
            .players()
            .iter()
            .map(|(id, p)| {
                (
                    id.clone(),
                    PlayerSnapshot {
                        session_id: p.session_id.clone(),
                        name: p.name.clone(),
                        color: p.color,
                        resources: p.resources,
                        victory_points: p.victory_points,
                        ready: p.ready,
                        is_host: p.is_host,
                    },
                )
            })
            .collect();

        let placed_structures = room
            .placed_structures()
            .iter()
            .map(|s| StructureSnapshot {
                id: s.id,
                kind: s.kind,
                color: s.color,
                location_id: s.location.to_string(),
            })
            .collect();

        Self {
            board,
            vertices,
            edges,
            players,
            turn_order: room.turn_order().to_vec(),
            placed_structures,
            last_distributed_resources: room.last_distributed().clone(),
            game_log: room.game_log().map(str::to_owned).collect(),
            game_phase: room.game_phase(),
            turn_phase: room.turn_phase(),
            current_player_index: room.current_player_index(),
            dice_roll: room.dice_roll().map_or(-1, i16::from),
            host_session_id: room
                .host_session_id()
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default(),
            room_code: room.room_code().to_owned(),
        }
    }
}
