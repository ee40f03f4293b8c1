/// Board records decoded by ics-core, checked against shakmaty.
mod common;

use common::*;
use ics_core::{classify, NotationFields, Position, ServerEvent, Side, TimingSnapshot};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position as _};

fn decode(record: &str) -> Position {
    Position::decode(&NotationFields::parse(record).unwrap()).unwrap()
}

#[test]
fn test_encoded_positions_are_legal() {
    for record in [START, AFTER_E4, AFTER_E5, AFTER_NF3, AFTER_NC3] {
        let fen: Fen = decode(record).encode().parse().unwrap();
        let pos: Chess = fen
            .into_position(CastlingMode::Standard)
            .unwrap_or_else(|e| panic!("{record}: {e}"));
        assert!(!pos.legal_moves().is_empty());
    }
}

#[test]
fn test_predicted_move_is_legal_in_ponder_position() {
    let fen: Fen = decode(AFTER_E5).encode().parse().unwrap();
    let pos: Chess = fen.into_position(CastlingMode::Standard).unwrap();
    let uci: shakmaty::uci::UciMove = "g1f3".parse().unwrap();
    assert!(uci.to_move(&pos).is_ok());
}

#[test]
fn test_last_move_and_side() {
    let pos = decode(AFTER_NF3);
    assert_eq!(pos.side_to_move, Side::Black);
    assert_eq!(pos.last_move.as_deref(), Some("g1f3"));
    assert_eq!(pos.halfmove_clock, 1);
    assert_eq!(pos.fullmove_number, 2);

    assert_eq!(decode(START).last_move, None);
}

#[test]
fn test_timing_uses_shared_increment() {
    let timing = TimingSnapshot::extract(&NotationFields::parse(AFTER_NF3).unwrap()).unwrap();
    assert_eq!(
        timing.go_args(),
        "wtime 116000 btime 117000 winc 12000 binc 12000"
    );
}

#[test]
fn test_classify_session_lines() {
    assert!(matches!(classify(AFTER_E4), ServerEvent::Board(_)));
    assert_eq!(
        classify(CREATING),
        ServerEvent::GameCreated {
            white: "GuestABCD".into(),
            white_rating: "1500".into(),
            black: "PonderBot".into(),
            black_rating: "1650".into(),
        }
    );
    // Quoted protocol text in a tell is chat, not a game event.
    assert!(matches!(
        classify("GuestXYZ tells you: Creating: a (1) b (2)"),
        ServerEvent::Tell { .. }
    ));
}
