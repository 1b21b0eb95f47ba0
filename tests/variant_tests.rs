//! Variant play through the engine facade.

use variant_chess_engine::board::search::KNOWN_WIN;
use variant_chess_engine::engine::time::TimeControl;
use variant_chess_engine::{Color, Engine, Figure, GameStatus, Piece, Position, Variant};

fn engine_for(variant: Variant) -> Engine {
    let mut engine = Engine::default();
    engine
        .set_option("UCI_Variant", Some(variant.name()))
        .expect("variant option");
    engine
}

#[test]
fn every_variant_searches_from_the_start() {
    for variant in Variant::ALL {
        let mut engine = engine_for(variant);
        assert_eq!(engine.position().to_fen(), variant.start_fen());

        let result = engine.search(TimeControl::Depth { depth: 2 });
        let best = result.best_move.expect("start position has moves");
        let mut pos = engine.position().clone();
        assert!(pos.legal_moves().contains(&best), "{variant}: {best}");
    }
}

#[test]
fn atomic_engine_blows_up_the_king() {
    let mut engine = engine_for(Variant::Atomic);
    engine
        .set_position(Some("4k3/4q3/8/8/8/8/4R3/4K3 w - - 0 1"), &[])
        .unwrap();
    let result = engine.search(TimeControl::Depth { depth: 2 });
    assert_eq!(result.best_move.map(|m| m.uci(false)).as_deref(), Some("e2e7"));
    assert!(result.score > KNOWN_WIN);

    engine
        .set_position(Some("4k3/4q3/8/8/8/8/4R3/4K3 w - - 0 1"), &["e2e7"])
        .unwrap();
    let mut pos = engine.position().clone();
    assert_eq!(pos.game_status(), GameStatus::Checkmate { winner: Color::White });
}

#[test]
fn seirawan_position_command_accepts_gating_moves() {
    let mut engine = engine_for(Variant::Seirawan);
    engine
        .set_position(None, &["g1f3h", "b8c6e", "e2e4"])
        .unwrap();
    let pos = engine.position();
    assert_eq!(
        pos.piece_at("g1".parse().unwrap()),
        Some(Piece::new(Color::White, Figure::Hawk))
    );
    assert_eq!(
        pos.piece_at("b8".parse().unwrap()),
        Some(Piece::new(Color::Black, Figure::Elephant))
    );
    assert_eq!(pos.hand(Color::White, Figure::Hawk), 0);
    assert_eq!(pos.hand(Color::Black, Figure::Elephant), 0);
}

#[test]
fn eightpiece_fen_roundtrips_through_the_engine() {
    let mut engine = engine_for(Variant::EightPiece);
    let fen = "4k3/8/8/8/8/2n5/8/S3K3 w - - 0 1 -";
    engine.set_position(Some(fen), &["a1c3a2"]).unwrap();
    assert_eq!(engine.position().to_fen(), "4k3/8/8/8/8/2S5/n7/4K3 b - - 0 1 a2a1");

    let mut pos = Position::from_fen(&engine.position().to_fen(), Variant::EightPiece).unwrap();
    assert!(!pos.legal_moves().iter().any(|m| m.uci(false) == "a2a1"));
}

#[test]
fn chess960_option_switches_castling_notation() {
    let mut engine = Engine::default();
    engine.set_option("UCI_Chess960", Some("true")).unwrap();
    engine
        .set_position(Some("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"), &["e1h1"])
        .unwrap();
    assert_eq!(
        engine.position().piece_at("g1".parse().unwrap()),
        Some(Piece::new(Color::White, Figure::King))
    );
}
