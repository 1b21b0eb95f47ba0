//! Make/unmake move tests.

use rand::prelude::*;

use super::{find, random_playout};
use crate::board::{Color, Figure, MoveKind, Piece, Position, Square, Variant};

/// Every pseudo-legal move, legal or not, must undo to the identical
/// position.
fn assert_all_moves_undo(pos: &mut Position) {
    let fen = pos.to_fen();
    let hash = pos.zobrist();
    let mut moves = Vec::new();
    pos.generate(MoveKind::All, &mut moves);
    for m in moves {
        pos.do_move(m);
        pos.assert_consistent();
        pos.undo_move();
        assert_eq!(pos.zobrist(), hash, "{m:?} in {fen}");
        assert_eq!(pos.to_fen(), fen, "{m:?}");
    }
}

#[test]
fn test_random_games_undo_in_every_variant() {
    for variant in Variant::ALL {
        let mut rng = StdRng::seed_from_u64(0x5EED ^ variant as u64);
        for _ in 0..6 {
            let mut pos = Position::start(variant);
            let start = pos.to_fen();
            let mut played = 0;
            for _ in 0..40 {
                assert_all_moves_undo(&mut pos);
                if random_playout(&mut pos, &mut rng, 1) == 0 {
                    break;
                }
                played += 1;
                pos.assert_consistent();
            }
            for _ in 0..played {
                pos.undo_move();
            }
            assert_eq!(pos.to_fen(), start, "{variant}");
        }
    }
}

#[test]
fn test_en_passant_make_unmake() {
    let mut pos = Position::from_fen(
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        Variant::Standard,
    )
    .unwrap();
    let hash = pos.zobrist();
    let ep = pos.en_passant();
    let m = find(&mut pos, "e5f6");
    pos.do_move(m);
    assert_eq!(pos.en_passant(), None);
    pos.undo_move();
    assert_eq!(pos.zobrist(), hash);
    assert_eq!(pos.en_passant(), ep);
}

#[test]
fn test_promotion_make_unmake() {
    let mut pos = Position::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1", Variant::Standard).unwrap();
    let hash = pos.zobrist();
    let pawn_hash = pos.pawn_king_hash();
    let m = find(&mut pos, "a7a8q");
    pos.do_move(m);
    assert_ne!(pos.pawn_king_hash(), pawn_hash);
    pos.undo_move();
    assert_eq!(pos.zobrist(), hash);
    assert_eq!(pos.pawn_king_hash(), pawn_hash);
    assert_eq!(
        pos.piece_at(Square::new(6, 0)),
        Some(Piece::new(Color::White, Figure::Pawn))
    );
}

#[test]
fn test_null_move_make_unmake_restores_hash_and_ep() {
    let mut pos = Position::from_fen(
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        Variant::Standard,
    )
    .unwrap();
    let hash = pos.zobrist();
    pos.do_null_move();
    assert_eq!(pos.en_passant(), None);
    assert_eq!(pos.side_to_move(), Color::Black);
    assert_ne!(pos.zobrist(), hash);
    assert!(pos.last_move().is_null());
    pos.assert_consistent();
    pos.undo_null_move();
    assert_eq!(pos.zobrist(), hash);
    assert_eq!(pos.en_passant(), Some(Square::new(5, 5)));
}

#[test]
fn test_castling_make_unmake() {
    let mut pos =
        Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", Variant::Standard).unwrap();
    let fen = pos.to_fen();
    let m = find(&mut pos, "e1c1");
    pos.do_move(m);
    assert_eq!(
        pos.piece_at(Square::new(0, 2)),
        Some(Piece::new(Color::White, Figure::King))
    );
    assert_eq!(
        pos.piece_at(Square::new(0, 3)),
        Some(Piece::new(Color::White, Figure::Rook))
    );
    assert_eq!(pos.to_fen(), "r3k2r/8/8/8/8/8/8/2KR3R b kq - 1 1");
    pos.undo_move();
    assert_eq!(pos.to_fen(), fen);
}
