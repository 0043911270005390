//! End-to-end room flow through the public command API: lobby, snake-draft
//! setup, and the first regular turns.

use hexisle_core::{
    settlement_allowed, Command, GamePhase, LocationId, Outcome, PlayerColor, ResourceSet, Room,
    SessionId, StructureKind, TurnPhase, VertexId,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_room() -> Room {
    Room::with_rng("FLOW", StdRng::seed_from_u64(99))
}

fn join(room: &mut Room, session: &str, name: &str) -> SessionId {
    let id = SessionId::from(session);
    assert_eq!(
        room.apply(&id, Command::Join { name: Some(name.to_owned()) }),
        Outcome::Applied
    );
    id
}

fn start_two_player_game(room: &mut Room) -> (SessionId, SessionId) {
    let a = join(room, "s1", "Ada");
    let b = join(room, "s2", "Brin");
    room.apply(&a, Command::ToggleReady);
    room.apply(&b, Command::ToggleReady);
    assert_eq!(room.apply(&a, Command::StartGame), Outcome::Applied);
    (a, b)
}

fn vertex_free(room: &Room, vertex: VertexId) -> bool {
    !room
        .placed_structures()
        .iter()
        .any(|s| s.location == LocationId::Vertex(vertex))
}

fn free_settlement_spot(room: &Room, color: PlayerColor) -> VertexId {
    room.grid()
        .vertices()
        .map(|v| v.id)
        .find(|v| {
            vertex_free(room, *v)
                && settlement_allowed(*v, color, room.placed_structures(), room.grid(), true)
        })
        .expect("a legal setup spot remains")
}

/// Place the current player's settlement-and-road pair, returning who placed
/// and where the settlement went.
fn place_pair(room: &mut Room) -> (SessionId, VertexId) {
    let sid = room.turn_order()[room.current_player_index()].clone();
    let color = room.player(&sid).unwrap().color;

    let vertex = free_settlement_spot(room, color);
    assert_eq!(
        room.apply(
            &sid,
            Command::PlaceStructure {
                kind: StructureKind::Settlement,
                location_id: vertex.to_string(),
            },
        ),
        Outcome::Applied
    );

    let edge = room
        .grid()
        .edges_at(vertex)
        .map(|e| e.id)
        .find(|e| {
            !room
                .placed_structures()
                .iter()
                .any(|s| s.location == LocationId::Edge(*e))
        })
        .expect("a free edge at the new settlement");
    assert_eq!(
        room.apply(
            &sid,
            Command::PlaceStructure {
                kind: StructureKind::Road,
                location_id: edge.to_string(),
            },
        ),
        Outcome::Applied
    );

    (sid, vertex)
}

/// One card per producing hex adjacent to `vertex`.
fn starting_hand(room: &Room, vertex: VertexId) -> ResourceSet {
    let mut hand = ResourceSet::new();
    let v = room.grid().vertex(&vertex).unwrap();
    for coord in &v.adjacent_hexes {
        if let Some(resource) = room
            .board()
            .hex_at(coord)
            .and_then(|h| h.terrain.resource())
        {
            hand.add(resource, 1);
        }
    }
    hand
}

#[test]
fn two_player_game_reaches_play_through_the_snake_draft() {
    let mut room = seeded_room();
    let (a, b) = start_two_player_game(&mut room);

    assert_eq!(room.game_phase(), GamePhase::SetupRound1);
    assert_eq!(room.current_player_index(), 0);

    // Round one runs forward: Ada, then Brin.
    let (first, _) = place_pair(&mut room);
    assert_eq!(first, a);
    assert_eq!(room.game_phase(), GamePhase::SetupRound1);
    assert_eq!(room.current_player_index(), 1);

    let (second, _) = place_pair(&mut room);
    assert_eq!(second, b);

    // The draft snakes: Brin goes again immediately in round two.
    assert_eq!(room.game_phase(), GamePhase::SetupRound2);
    assert_eq!(room.current_player_index(), 1);

    let (third, brin_spot) = place_pair(&mut room);
    assert_eq!(third, b);
    assert_eq!(room.current_player_index(), 0);

    let (fourth, ada_spot) = place_pair(&mut room);
    assert_eq!(fourth, a);

    // Setup complete: back to the first player for regular play.
    assert_eq!(room.game_phase(), GamePhase::PlayTurn);
    assert_eq!(room.turn_phase(), TurnPhase::RollDice);
    assert_eq!(room.current_player_index(), 0);
    assert_eq!(room.dice_roll(), None);

    // Two settlements and two roads each, one point per settlement.
    for sid in [&a, &b] {
        let player = room.player(sid).unwrap();
        assert_eq!(player.victory_points, 2);
        let color = player.color;
        let count = |kind| {
            room.placed_structures()
                .iter()
                .filter(|s| s.color == color && s.kind == kind)
                .count()
        };
        assert_eq!(count(StructureKind::Settlement), 2);
        assert_eq!(count(StructureKind::Road), 2);
    }

    // Only the second settlement seeds the hand.
    assert_eq!(
        room.player(&a).unwrap().resources,
        starting_hand(&room, ada_spot)
    );
    assert_eq!(
        room.player(&b).unwrap().resources,
        starting_hand(&room, brin_spot)
    );

    // First turn: roll, then pass.
    assert_eq!(room.apply(&a, Command::RollDice), Outcome::Applied);
    let roll = room.dice_roll().unwrap();
    assert!((2..=12).contains(&roll));
    assert_eq!(room.turn_phase(), TurnPhase::Building);

    assert_eq!(room.apply(&a, Command::EndTurn), Outcome::Applied);
    assert_eq!(room.current_player_index(), 1);
    assert_eq!(room.turn_phase(), TurnPhase::RollDice);
    assert_eq!(room.dice_roll(), None);
}

#[test]
fn setup_drops_out_of_turn_and_misordered_placements() {
    let mut room = seeded_room();
    let (a, b) = start_two_player_game(&mut room);

    let a_color = room.player(&a).unwrap().color;
    let b_color = room.player(&b).unwrap().color;

    // Brin cannot place while it is Ada's setup turn.
    let spot = free_settlement_spot(&room, b_color);
    assert_eq!(
        room.apply(
            &b,
            Command::PlaceStructure {
                kind: StructureKind::Settlement,
                location_id: spot.to_string(),
            },
        ),
        Outcome::Ignored
    );

    // The road must follow the settlement within the round.
    let edge = room.grid().edges().next().unwrap().id;
    assert_eq!(
        room.apply(
            &a,
            Command::PlaceStructure {
                kind: StructureKind::Road,
                location_id: edge.to_string(),
            },
        ),
        Outcome::Ignored
    );

    // Cities cannot be placed during setup.
    let spot = free_settlement_spot(&room, a_color);
    assert_eq!(
        room.apply(
            &a,
            Command::PlaceStructure {
                kind: StructureKind::City,
                location_id: spot.to_string(),
            },
        ),
        Outcome::Ignored
    );

    assert!(room.placed_structures().is_empty());
}

#[test]
fn setup_enforces_the_distance_rule_across_players() {
    let mut room = seeded_room();
    let (a, b) = start_two_player_game(&mut room);

    let (placer, spot) = place_pair(&mut room);
    assert_eq!(placer, a);

    // Brin may not settle next door to Ada.
    let neighbor = room.grid().neighbors(spot)[0];
    assert_eq!(
        room.apply(
            &b,
            Command::PlaceStructure {
                kind: StructureKind::Settlement,
                location_id: neighbor.to_string(),
            },
        ),
        Outcome::Ignored
    );

    // Nor reuse the occupied vertex itself.
    assert_eq!(
        room.apply(
            &b,
            Command::PlaceStructure {
                kind: StructureKind::Settlement,
                location_id: spot.to_string(),
            },
        ),
        Outcome::Ignored
    );
}

#[test]
fn second_settlement_of_a_round_is_dropped() {
    let mut room = seeded_room();
    let (a, _) = start_two_player_game(&mut room);
    let color = room.player(&a).unwrap().color;

    let spot = free_settlement_spot(&room, color);
    room.apply(
        &a,
        Command::PlaceStructure {
            kind: StructureKind::Settlement,
            location_id: spot.to_string(),
        },
    );

    // A second settlement before the road is a silent no-op.
    let another = free_settlement_spot(&room, color);
    assert_eq!(
        room.apply(
            &a,
            Command::PlaceStructure {
                kind: StructureKind::Settlement,
                location_id: another.to_string(),
            },
        ),
        Outcome::Ignored
    );
    assert_eq!(room.placed_structures().len(), 1);
}

#[test]
fn leaving_mid_setup_keeps_the_turn_order_consistent() {
    let mut room = seeded_room();
    let a = join(&mut room, "s1", "Ada");
    let b = join(&mut room, "s2", "Brin");
    let c = join(&mut room, "s3", "Cass");
    for sid in [&a, &b, &c] {
        room.apply(sid, Command::ToggleReady);
    }
    room.apply(&a, Command::StartGame);

    // Ada and Brin place; it is Cass's turn when Ada leaves.
    place_pair(&mut room);
    place_pair(&mut room);
    assert_eq!(room.current_player_index(), 2);

    assert_eq!(room.apply(&a, Command::Leave), Outcome::Applied);

    // The pointer still rests on Cass, and the host moved to Brin.
    assert_eq!(room.turn_order(), [b.clone(), c.clone()]);
    assert_eq!(room.current_player_index(), 1);
    assert_eq!(room.host_session_id(), Some(&b));
    assert!(room.player(&b).unwrap().is_host);
}
