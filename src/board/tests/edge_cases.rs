//! Edge case tests for special chess positions and moves.

use super::{fen, find, play};
use crate::board::{
    CastleSide, Color, Figure, GameStatus, MoveKind, MoveType, Piece, Square, Variant,
};
use crate::board::{FenError, Position};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

#[test]
fn test_stalemate_position() {
    let mut pos = fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(!pos.is_checked(Color::Black));
    assert!(pos.legal_moves().is_empty());
    assert_eq!(pos.game_status(), GameStatus::Stalemate);
}

#[test]
fn test_underpromotions() {
    let mut pos = fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1");
    let promotions: Vec<Figure> = pos
        .legal_moves()
        .into_iter()
        .filter_map(|m| m.promotion())
        .collect();
    assert_eq!(promotions.len(), 4);
    for figure in [Figure::Knight, Figure::Bishop, Figure::Rook, Figure::Queen] {
        assert!(promotions.contains(&figure), "{figure:?} missing");
    }

    let m = find(&mut pos, "a7a8n");
    pos.do_move(m);
    assert_eq!(
        pos.piece_at(sq("a8")),
        Some(Piece::new(Color::White, Figure::Knight))
    );
    pos.undo_move();
    assert_eq!(
        pos.piece_at(sq("a7")),
        Some(Piece::new(Color::White, Figure::Pawn))
    );
}

#[test]
fn test_en_passant_removes_correct_pawn() {
    let mut pos = fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1");
    let ep = pos
        .legal_moves()
        .into_iter()
        .find(|m| m.move_type() == MoveType::Enpassant)
        .expect("en passant should be available");
    assert_eq!(ep.to(), sq("d6"));
    assert_eq!(ep.capture(), Some(Piece::new(Color::Black, Figure::Pawn)));

    pos.do_move(ep);
    assert_eq!(pos.piece_at(sq("d5")), None, "captured pawn should be removed");
    assert_eq!(
        pos.piece_at(sq("d6")),
        Some(Piece::new(Color::White, Figure::Pawn))
    );
    assert_eq!(pos.piece_at(sq("e5")), None);

    pos.undo_move();
    assert_eq!(
        pos.piece_at(sq("d5")),
        Some(Piece::new(Color::Black, Figure::Pawn))
    );
    assert_eq!(
        pos.piece_at(sq("e5")),
        Some(Piece::new(Color::White, Figure::Pawn))
    );
    assert_eq!(pos.piece_at(sq("d6")), None);
}

#[test]
fn test_no_castling_in_quiet_generation_when_in_check() {
    let pos = fen("r3k2r/8/8/8/4Q3/8/8/R3K2R b KQkq - 0 1");
    assert!(pos.is_checked(Color::Black));
    let mut quiet = Vec::new();
    pos.generate(MoveKind::Quiet, &mut quiet);
    assert!(!quiet.is_empty());
    assert!(quiet.iter().all(|m| !m.is_castling()));
}

#[test]
fn test_castling_with_attacked_rook_is_allowed() {
    // The b1 square may be attacked for long castling; only the king's path matters.
    let mut pos = fen("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    let sides: Vec<CastleSide> = pos
        .legal_moves()
        .into_iter()
        .filter_map(|m| m.castle_side())
        .collect();
    assert!(sides.contains(&CastleSide::King));
    assert!(sides.contains(&CastleSide::Queen));
}

#[test]
fn test_double_check_only_king_can_move() {
    let mut pos = fen("4k3/8/8/8/3R4/5n1R/8/r3K3 w - - 0 1");
    assert_eq!(pos.checkers().popcount(), 2);
    let legal = pos.legal_moves();
    assert!(legal.iter().all(|m| m.from() == sq("e1")));
    let mut uci: Vec<String> = legal.iter().map(|m| m.uci(false)).collect();
    uci.sort();
    assert_eq!(uci, vec!["e1e2", "e1f2"]);
}

#[test]
fn test_single_check_must_be_blocked_or_evaded() {
    let mut pos = fen("4k3/4r3/8/8/8/8/R7/4K3 w - - 0 1");
    let blocks: Vec<String> = pos
        .legal_moves()
        .into_iter()
        .filter(|m| m.piece().figure != Figure::King)
        .map(|m| m.uci(false))
        .collect();
    assert_eq!(blocks, vec!["a2e2"]);
}

#[test]
fn test_pinned_piece_cannot_leave_the_line() {
    let mut pos = fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
    assert!(pos
        .legal_moves()
        .iter()
        .all(|m| m.piece().figure != Figure::Bishop));
}

#[test]
fn test_checkmate_back_rank() {
    let mut pos = fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
    play(&mut pos, &["a1a8"]);
    assert_eq!(
        pos.game_status(),
        GameStatus::Checkmate {
            winner: Color::White
        }
    );
}

#[test]
fn test_fen_parsing_errors() {
    for bad in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
        "rnbxkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
    ] {
        assert!(
            Position::from_fen(bad, Variant::Standard).is_err(),
            "{bad} should be rejected"
        );
    }
    assert!(matches!(
        Position::from_fen("8/8/8/8/8/8/8/8", Variant::Standard),
        Err(FenError::TooFewParts { .. })
    ));
}

#[test]
fn test_square_parsing() {
    assert_eq!(sq("a1"), Square::new(0, 0));
    assert_eq!(sq("h8"), Square::new(7, 7));
    assert_eq!(sq("e4"), Square::new(3, 4));
    for bad in ["i1", "a9", "", "a"] {
        assert!(bad.parse::<Square>().is_err(), "{bad}");
    }
}

#[test]
fn test_chess960_castling_uci() {
    let mut pos = Position::from_fen(
        "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9",
        Variant::Standard,
    )
    .unwrap();
    assert!(pos.is_chess960());
    let castles: Vec<String> = pos
        .legal_moves()
        .into_iter()
        .filter(|m| m.is_castling())
        .map(|m| m.uci(true))
        .collect();
    assert!(castles.iter().all(|s| s.starts_with("g1")));
}
