//! The room: one authoritative game in progress, from lobby to play.
//!
//! All mutation goes through [`Room::apply`], which never fails and never
//! panics. Commands that are out of turn, out of phase, or malformed are
//! dropped; the only request a client is ever told "no" about is joining a
//! full room. Player-visible events go to the bounded game log, which is
//! domain state, not diagnostics.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

use crate::board::Board;
use crate::command::Command;
use crate::grid::Grid;
use crate::player::{costs, piece_cap, Player, PlayerColor, ResourceSet, SessionId};
use crate::production::resources_for_roll;
use crate::rules::{
    road_allowed, settlement_allowed, LocationId, PlacedStructure, StructureKind,
};
use crate::snapshot::RoomSnapshot;

/// Seats available in a room, one per color.
pub const MAX_PLAYERS: usize = 4;

/// Most recent entries kept in the game log.
pub const GAME_LOG_CAP: usize = 50;

/// Where the room is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[serde(rename = "LOBBY")]
    Lobby,
    #[serde(rename = "SETUP_ROUND_1")]
    SetupRound1,
    #[serde(rename = "SETUP_ROUND_2")]
    SetupRound2,
    #[serde(rename = "PLAY_TURN")]
    PlayTurn,
    /// Reserved for win detection.
    #[serde(rename = "GAME_OVER")]
    GameOver,
}

impl GamePhase {
    pub fn is_setup(&self) -> bool {
        matches!(self, GamePhase::SetupRound1 | GamePhase::SetupRound2)
    }
}

/// Where the current player is within their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnPhase {
    Lobby,
    RollDice,
    /// Reserved for trading.
    Trading,
    Building,
}

/// The one failure a client is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room is full")]
    RoomFull,
}

/// Result of applying a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (possibly only the game log).
    Applied,
    /// Dropped as a no-op.
    Ignored,
    /// Actively rejected; the sender should be told why.
    Refused(RoomError),
    /// The last player left; the room should be torn down.
    Closed,
}

/// One game room. Owns its board, grid, roster, and RNG; self-contained
/// apart from the transport that feeds it commands.
#[derive(Debug)]
pub struct Room {
    room_code: String,
    board: Board,
    grid: Grid,
    players: HashMap<SessionId, Player>,
    turn_order: Vec<SessionId>,
    current_player_index: usize,
    game_phase: GamePhase,
    turn_phase: TurnPhase,
    dice_roll: Option<u8>,
    host_session_id: Option<SessionId>,
    placed_structures: Vec<PlacedStructure>,
    last_distributed: HashMap<PlayerColor, ResourceSet>,
    game_log: VecDeque<String>,
    rng: StdRng,
}

impl Room {
    /// Open a room with a freshly generated board.
    pub fn new(room_code: impl Into<String>) -> Self {
        Self::with_rng(room_code, StdRng::from_entropy())
    }

    /// Open a room with a provided RNG, for deterministic boards and dice.
    pub fn with_rng(room_code: impl Into<String>, mut rng: StdRng) -> Self {
        let board = Board::generate_with_rng(&mut rng);
        let grid = Grid::build(&board);
        Self {
            room_code: room_code.into(),
            board,
            grid,
            players: HashMap::new(),
            turn_order: Vec::new(),
            current_player_index: 0,
            game_phase: GamePhase::Lobby,
            turn_phase: TurnPhase::Lobby,
            dice_roll: None,
            host_session_id: None,
            placed_structures: Vec::new(),
            last_distributed: HashMap::new(),
            game_log: VecDeque::new(),
            rng,
        }
    }

    /// Apply one client command. Total: every input maps to an [`Outcome`].
    pub fn apply(&mut self, session_id: &SessionId, command: Command) -> Outcome {
        let command_name = command.name();
        let outcome = match command {
            Command::Join { name } => self.handle_join(session_id, name),
            Command::Leave => self.handle_leave(session_id),
            Command::ToggleReady => self.handle_toggle_ready(session_id),
            Command::StartGame => self.handle_start_game(session_id),
            Command::PlaceStructure { kind, location_id } => {
                self.handle_place_structure(session_id, kind, &location_id)
            }
            Command::RollDice => self.handle_roll_dice(session_id),
            Command::EndTurn => self.handle_end_turn(session_id),
        };
        if outcome == Outcome::Ignored {
            tracing::debug!(session = %session_id, command = command_name, "command dropped");
        }
        outcome
    }

    fn handle_join(&mut self, session_id: &SessionId, name: Option<String>) -> Outcome {
        if self.players.contains_key(session_id) {
            return Outcome::Ignored;
        }
        if self.players.len() >= MAX_PLAYERS {
            return Outcome::Refused(RoomError::RoomFull);
        }

        let name = sanitize_name(name, self.players.len() + 1);
        let color = PlayerColor::ALL
            .into_iter()
            .find(|c| self.players.values().all(|p| p.color != *c))
            .unwrap_or(PlayerColor::Red);
        let is_host = self.players.is_empty();
        if is_host {
            self.host_session_id = Some(session_id.clone());
        }

        self.players.insert(
            session_id.clone(),
            Player::new(session_id.clone(), name.clone(), color, is_host),
        );
        self.turn_order.push(session_id.clone());
        self.log(format!("{name} joined the lobby."));
        Outcome::Applied
    }

    fn handle_leave(&mut self, session_id: &SessionId) -> Outcome {
        let Some(player) = self.players.remove(session_id) else {
            return Outcome::Ignored;
        };
        let leaving_index = self.turn_order.iter().position(|s| s == session_id);
        if let Some(i) = leaving_index {
            self.turn_order.remove(i);
        }

        if self.players.is_empty() {
            self.host_session_id = None;
            return Outcome::Closed;
        }

        // Keep the turn pointer on the same logical player when someone at
        // or before it leaves; clamp if it fell off the end.
        if let Some(i) = leaving_index {
            if i <= self.current_player_index && self.current_player_index > 0 {
                self.current_player_index -= 1;
            }
        }
        if self.current_player_index >= self.turn_order.len() {
            self.current_player_index = self.turn_order.len() - 1;
        }

        if self.host_session_id.as_ref() == Some(session_id) {
            self.elect_new_host();
        }

        self.log(format!("{} left the room.", player.name));
        Outcome::Applied
    }

    fn handle_toggle_ready(&mut self, session_id: &SessionId) -> Outcome {
        if self.game_phase != GamePhase::Lobby {
            return Outcome::Ignored;
        }
        let Some(player) = self.players.get_mut(session_id) else {
            return Outcome::Ignored;
        };
        player.ready = !player.ready;
        Outcome::Applied
    }

    fn handle_start_game(&mut self, session_id: &SessionId) -> Outcome {
        if self.game_phase != GamePhase::Lobby {
            return Outcome::Ignored;
        }
        if !self.players.get(session_id).is_some_and(|p| p.is_host) {
            return Outcome::Ignored;
        }
        if self.players.len() < 2 {
            self.log("Need at least two players to start.".to_owned());
            return Outcome::Applied;
        }
        if !self.players.values().all(|p| p.ready) {
            self.log("All players must be ready.".to_owned());
            return Outcome::Applied;
        }

        for player in self.players.values_mut() {
            player.reset_for_start();
        }
        self.placed_structures.clear();
        self.last_distributed.clear();
        self.dice_roll = None;
        self.current_player_index = 0;
        self.game_phase = GamePhase::SetupRound1;
        self.turn_phase = TurnPhase::Building;
        self.log("Setup Round 1 started.".to_owned());
        Outcome::Applied
    }

    fn handle_place_structure(
        &mut self,
        session_id: &SessionId,
        kind: StructureKind,
        location_id: &str,
    ) -> Outcome {
        let Ok(location) = location_id.parse::<LocationId>() else {
            return Outcome::Ignored;
        };
        if !self.is_current_player(session_id) {
            return Outcome::Ignored;
        }

        match self.game_phase {
            GamePhase::SetupRound1 | GamePhase::SetupRound2 => {
                self.place_setup_structure(session_id, kind, location)
            }
            GamePhase::PlayTurn => self.place_play_structure(session_id, kind, location),
            GamePhase::Lobby | GamePhase::GameOver => Outcome::Ignored,
        }
    }

    fn place_setup_structure(
        &mut self,
        session_id: &SessionId,
        kind: StructureKind,
        location: LocationId,
    ) -> Outcome {
        // Each setup round places exactly one settlement then one road;
        // `expected` is what the player already holds entering the round.
        let expected = match self.game_phase {
            GamePhase::SetupRound1 => 0,
            _ => 1,
        };
        let (color, name) = {
            let player = &self.players[session_id];
            (player.color, player.name.clone())
        };

        match kind {
            StructureKind::Settlement => {
                if self.count_pieces(color, StructureKind::Settlement) > expected {
                    return Outcome::Ignored;
                }
                let Some(vertex_id) = location.as_vertex() else {
                    return Outcome::Ignored;
                };
                if self.grid.vertex(&vertex_id).is_none()
                    || self.location_occupied(&location)
                    || !settlement_allowed(
                        vertex_id,
                        color,
                        &self.placed_structures,
                        &self.grid,
                        true,
                    )
                {
                    return Outcome::Ignored;
                }

                // The second settlement seeds the starting hand: one card per
                // adjacent producing hex.
                let mut starting_hand = ResourceSet::new();
                if self.game_phase == GamePhase::SetupRound2 {
                    if let Some(vertex) = self.grid.vertex(&vertex_id) {
                        for coord in &vertex.adjacent_hexes {
                            if let Some(resource) = self
                                .board
                                .hex_at(coord)
                                .and_then(|h| h.terrain.resource())
                            {
                                starting_hand.add(resource, 1);
                            }
                        }
                    }
                }

                self.placed_structures
                    .push(PlacedStructure::new(kind, color, location));
                if let Some(player) = self.players.get_mut(session_id) {
                    player.victory_points += 1;
                    player.resources.add_set(&starting_hand);
                }
                self.log(format!("{name} placed a settlement."));
                Outcome::Applied
            }
            StructureKind::Road => {
                if self.count_pieces(color, StructureKind::Road) > expected {
                    return Outcome::Ignored;
                }
                // Settlement first within the round.
                if self.count_pieces(color, StructureKind::Settlement) == expected {
                    return Outcome::Ignored;
                }
                let Some(edge_id) = location.as_edge() else {
                    return Outcome::Ignored;
                };
                if self.location_occupied(&location)
                    || !road_allowed(edge_id, color, &self.placed_structures, &self.grid)
                {
                    return Outcome::Ignored;
                }

                self.placed_structures
                    .push(PlacedStructure::new(kind, color, location));
                self.log(format!("{name} placed a road."));

                if self.count_pieces(color, StructureKind::Settlement) == expected + 1
                    && self.count_pieces(color, StructureKind::Road) == expected + 1
                {
                    self.advance_setup_turn();
                }
                Outcome::Applied
            }
            StructureKind::City => Outcome::Ignored,
        }
    }

    fn place_play_structure(
        &mut self,
        session_id: &SessionId,
        kind: StructureKind,
        location: LocationId,
    ) -> Outcome {
        if self.turn_phase != TurnPhase::Building {
            return Outcome::Ignored;
        }
        if kind == StructureKind::City {
            return Outcome::Ignored;
        }
        let (color, name) = {
            let player = &self.players[session_id];
            (player.color, player.name.clone())
        };

        let valid = match (kind, location) {
            (StructureKind::Settlement, LocationId::Vertex(vertex_id)) => {
                self.grid.vertex(&vertex_id).is_some()
                    && !self.location_occupied(&location)
                    && settlement_allowed(
                        vertex_id,
                        color,
                        &self.placed_structures,
                        &self.grid,
                        false,
                    )
            }
            (StructureKind::Road, LocationId::Edge(edge_id)) => {
                !self.location_occupied(&location)
                    && road_allowed(edge_id, color, &self.placed_structures, &self.grid)
            }
            _ => false,
        };
        if !valid {
            return Outcome::Ignored;
        }

        if self.count_pieces(color, kind) >= piece_cap(kind) {
            self.log(format!("{name} has no {kind} pieces left."));
            return Outcome::Applied;
        }

        let cost = costs::cost_of(kind);
        {
            let player = &self.players[session_id];
            if !player.resources.can_afford(&cost) {
                self.log(format!("{name} cannot afford a {kind}."));
                return Outcome::Applied;
            }
        }

        if let Some(player) = self.players.get_mut(session_id) {
            player.resources.debit(&cost);
            if kind == StructureKind::Settlement {
                player.victory_points += 1;
            }
        }
        self.placed_structures
            .push(PlacedStructure::new(kind, color, location));
        self.log(format!("{name} built a {kind}."));
        Outcome::Applied
    }

    fn handle_roll_dice(&mut self, session_id: &SessionId) -> Outcome {
        if self.game_phase != GamePhase::PlayTurn
            || self.turn_phase != TurnPhase::RollDice
            || !self.is_current_player(session_id)
        {
            return Outcome::Ignored;
        }
        let d1 = self.rng.gen_range(1..=6);
        let d2 = self.rng.gen_range(1..=6);
        self.resolve_roll(d1, d2)
    }

    /// Apply a resolved dice pair. Split from the RNG draw so the
    /// distribution path is testable with fixed dice.
    fn resolve_roll(&mut self, d1: u8, d2: u8) -> Outcome {
        let roll = d1 + d2;
        self.dice_roll = Some(roll);
        self.last_distributed.clear();

        let name = self.current_player_name();
        self.log(format!("{name} rolled {roll} ({d1}+{d2})."));

        if roll == 7 {
            self.log("Robber triggered (not implemented).".to_owned());
        } else {
            let gained = resources_for_roll(roll, &self.board, &self.placed_structures, &self.grid);
            for (color, set) in gained {
                let recipient = self.players.values_mut().find(|p| p.color == color);
                if let Some(player) = recipient {
                    player.resources.add_set(&set);
                    self.last_distributed.insert(color, set);
                }
            }
        }

        // Rolling always opens the build phase, even on a seven.
        self.turn_phase = TurnPhase::Building;
        Outcome::Applied
    }

    fn handle_end_turn(&mut self, session_id: &SessionId) -> Outcome {
        if !self.is_current_player(session_id) {
            return Outcome::Ignored;
        }
        match self.game_phase {
            GamePhase::SetupRound1 | GamePhase::SetupRound2 => {
                self.advance_setup_turn();
                Outcome::Applied
            }
            GamePhase::PlayTurn => {
                self.advance_play_turn();
                Outcome::Applied
            }
            GamePhase::Lobby | GamePhase::GameOver => Outcome::Ignored,
        }
    }

    /// Snake-draft setup order: forward through round one, the last player
    /// goes again, then backward through round two into regular play.
    fn advance_setup_turn(&mut self) {
        match self.game_phase {
            GamePhase::SetupRound1 => {
                if self.current_player_index + 1 < self.turn_order.len() {
                    self.current_player_index += 1;
                } else {
                    self.game_phase = GamePhase::SetupRound2;
                    self.log("Setup Round 2 (reverse order).".to_owned());
                }
            }
            GamePhase::SetupRound2 => {
                if self.current_player_index > 0 {
                    self.current_player_index -= 1;
                } else {
                    self.game_phase = GamePhase::PlayTurn;
                    self.turn_phase = TurnPhase::RollDice;
                    self.dice_roll = None;
                    self.current_player_index = 0;
                    let name = self.current_player_name();
                    self.log(format!("{name} starts the game."));
                }
            }
            _ => {}
        }
    }

    fn advance_play_turn(&mut self) {
        if !self.turn_order.is_empty() {
            self.current_player_index = (self.current_player_index + 1) % self.turn_order.len();
        }
        self.turn_phase = TurnPhase::RollDice;
        self.dice_roll = None;
        self.last_distributed.clear();
        let name = self.current_player_name();
        self.log(format!("{name}'s turn."));
    }

    fn elect_new_host(&mut self) {
        for player in self.players.values_mut() {
            player.is_host = false;
        }
        self.host_session_id = self.turn_order.first().cloned();
        if let Some(host) = &self.host_session_id {
            if let Some(player) = self.players.get_mut(host) {
                player.is_host = true;
            }
        }
    }

    fn count_pieces(&self, color: PlayerColor, kind: StructureKind) -> usize {
        self.placed_structures
            .iter()
            .filter(|s| s.color == color && s.kind == kind)
            .count()
    }

    fn location_occupied(&self, location: &LocationId) -> bool {
        self.placed_structures.iter().any(|s| s.location == *location)
    }

    fn current_session(&self) -> Option<&SessionId> {
        self.turn_order.get(self.current_player_index)
    }

    fn is_current_player(&self, session_id: &SessionId) -> bool {
        self.current_session() == Some(session_id)
    }

    fn current_player_name(&self) -> String {
        self.current_session()
            .and_then(|s| self.players.get(s))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Player".to_owned())
    }

    /// Prepend a player-visible event, keeping the newest entries.
    fn log(&mut self, line: String) {
        self.game_log.push_front(line);
        self.game_log.truncate(GAME_LOG_CAP);
    }

    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn players(&self) -> &HashMap<SessionId, Player> {
        &self.players
    }

    pub fn player(&self, session_id: &SessionId) -> Option<&Player> {
        self.players.get(session_id)
    }

    pub fn turn_order(&self) -> &[SessionId] {
        &self.turn_order
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn game_phase(&self) -> GamePhase {
        self.game_phase
    }

    pub fn turn_phase(&self) -> TurnPhase {
        self.turn_phase
    }

    pub fn dice_roll(&self) -> Option<u8> {
        self.dice_roll
    }

    pub fn host_session_id(&self) -> Option<&SessionId> {
        self.host_session_id.as_ref()
    }

    pub fn placed_structures(&self) -> &[PlacedStructure] {
        &self.placed_structures
    }

    pub fn last_distributed(&self) -> &HashMap<PlayerColor, ResourceSet> {
        &self.last_distributed
    }

    pub fn game_log(&self) -> impl Iterator<Item = &str> {
        self.game_log.iter().map(String::as_str)
    }

    /// The full read-only state the sync layer broadcasts after each applied
    /// command.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot::capture(self)
    }
}

fn sanitize_name(name: Option<String>, seat_number: usize) -> String {
    let trimmed = name
        .as_deref()
        .map(str::trim)
        .unwrap_or("");
    if trimmed.is_empty() {
        format!("Player {seat_number}")
    } else {
        trimmed.chars().take(24).collect()
    }
}
