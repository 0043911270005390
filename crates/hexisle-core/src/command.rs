//! The closed command surface. Every message a client can send is one
//! variant here; the room dispatches them through a single exhaustive match,
//! so an unhandled command cannot exist.

use serde::{Deserialize, Serialize};

use crate::rules::StructureKind;

/// A client request against a room. Location ids travel as strings and are
/// parsed at the room boundary; a malformed id drops the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Command {
    /// Take a seat in the lobby. A missing or blank name gets a default.
    Join {
        name: Option<String>,
    },
    /// Give up the seat (also sent by the transport on disconnect).
    Leave,
    ToggleReady,
    /// Host-only; needs at least two seated players, all ready.
    StartGame,
    PlaceStructure {
        #[serde(rename = "type")]
        kind: StructureKind,
        #[serde(rename = "locationId")]
        location_id: String,
    },
    RollDice,
    EndTurn,
}

impl Command {
    /// Wire name of the command, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Join { .. } => "join",
            Command::Leave => "leave",
            Command::ToggleReady => "toggle_ready",
            Command::StartGame => "start_game",
            Command::PlaceStructure { .. } => "place_structure",
            Command::RollDice => "roll_dice",
            Command::EndTurn => "end_turn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_use_tagged_wire_form() {
        let json = serde_json::to_value(&Command::Join {
            name: Some("Ada".to_owned()),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "join", "payload": {"name": "Ada"}})
        );

        let json = serde_json::to_value(&Command::RollDice).unwrap();
        assert_eq!(json, serde_json::json!({"type": "roll_dice"}));
    }

    #[test]
    fn place_structure_decodes_client_payload() {
        let command: Command = serde_json::from_value(serde_json::json!({
            "type": "place_structure",
            "payload": {"type": "settlement", "locationId": "0.866,0.500"}
        }))
        .unwrap();
        assert_eq!(
            command,
            Command::PlaceStructure {
                kind: StructureKind::Settlement,
                location_id: "0.866,0.500".to_owned(),
            }
        );
    }
}
