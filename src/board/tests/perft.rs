//! Perft (performance test) for move generation correctness.

use std::time::Instant;

use crate::board::{Position, Variant};

struct TestPosition {
    name: &'static str,
    variant: Variant,
    fen: &'static str,
    depths: &'static [(u32, u64)],
}

const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "Position 6",
        variant: Variant::Standard,
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        depths: &[(1, 46), (2, 2079), (3, 89890)],
    },
    TestPosition {
        name: "En Passant Capture",
        variant: Variant::Standard,
        fen: "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        depths: &[(1, 31), (2, 707), (3, 21637)],
    },
    TestPosition {
        name: "Promotion",
        variant: Variant::Standard,
        fen: "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        depths: &[(1, 24), (2, 496), (3, 9483)],
    },
    TestPosition {
        name: "Castling",
        variant: Variant::Standard,
        fen: "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        depths: &[(1, 26), (2, 568), (3, 13744)],
    },
    TestPosition {
        name: "Atomic start",
        variant: Variant::Atomic,
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197_326)],
    },
    TestPosition {
        name: "Seirawan start",
        variant: Variant::Seirawan,
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[HEhe] w KQBCDFGkqbcdfg - 0 1",
        depths: &[(1, 28), (2, 784)],
    },
    TestPosition {
        name: "Sentry pushes out of check",
        variant: Variant::EightPiece,
        fen: "4k3/8/8/8/8/2b5/8/S3K3 w - - 0 1 -",
        depths: &[(1, 13)],
    },
];

const EIGHTPIECE_WALKS: &[(&str, u32)] = &[
    ("jl(s)sqkbnr/pppppppp/8/8/8/8/PPPPPPPP/JL(n)SQKBNR w Kk - 0 1 -", 3),
    ("4k3/8/8/8/8/2b5/8/S3K3 w - - 0 1 -", 3),
    ("j3k2r/1p1n1ppp/2s5/3p4/4P3/2b2N2/PP1S1PPP/L(ne)2JK2R w Kk - 0 1 -", 2),
];

/// Perft that checks the board after every make and every unmake.
fn checked_walk(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let fen = pos.to_fen();
    let zobrist = pos.zobrist();
    let mut nodes = 0;
    for m in pos.legal_moves() {
        pos.do_move(m);
        pos.assert_consistent();
        nodes += checked_walk(pos, depth - 1);
        pos.undo_move();
        assert_eq!(pos.to_fen(), fen, "after undoing {m}");
        assert_eq!(pos.zobrist(), zobrist, "after undoing {m}");
    }
    nodes
}

#[test]
fn test_all_perft_positions() {
    for position in TEST_POSITIONS {
        let mut pos = Position::from_fen(position.fen, position.variant).unwrap();

        for &(depth, expected) in position.depths {
            let start = Instant::now();
            let nodes = pos.perft(depth);
            let duration = start.elapsed();

            println!("  {} depth {}: {} nodes in {:?}", position.name, depth, nodes, duration);

            assert_eq!(
                nodes, expected,
                "Perft failed for position '{}' at depth {}",
                position.name, depth
            );
        }
    }
}

#[test]
fn test_divide_matches_perft_in_every_variant() {
    for variant in Variant::ALL {
        let mut pos = Position::start(variant);
        let divided: u64 = pos.divide(3).iter().map(|(_, n)| n).sum();
        assert_eq!(divided, pos.perft(3), "{variant}");
        assert_eq!(pos.to_fen(), variant.start_fen());
    }
}

#[test]
fn test_eightpiece_walk_stays_consistent() {
    for &(fen, depth) in EIGHTPIECE_WALKS {
        let mut pos = Position::from_fen(fen, Variant::EightPiece).unwrap();
        let walked = checked_walk(&mut pos, depth);
        assert_eq!(walked, pos.perft(depth), "{fen}");
        let divided: u64 = pos.divide(depth).iter().map(|(_, n)| n).sum();
        assert_eq!(divided, walked, "{fen}");
    }
}
