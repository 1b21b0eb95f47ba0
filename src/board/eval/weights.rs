//! Evaluation weights.
//!
//! Every term has a midgame and an endgame value; the evaluator blends them
//! by game phase. Piece-square tables are indexed from White's side (a1 = 0)
//! and mirrored vertically for Black.

use crate::board::types::Figure;

/// Phase value of the full standard army, both sides.
pub(super) const PHASE_TOTAL: i32 = 24;

/// Material by figure, `[midgame, endgame]`.
pub(super) const fn material(figure: Figure) -> (i32, i32) {
    match figure {
        Figure::Pawn => (82, 94),
        Figure::Knight => (337, 281),
        Figure::Bishop => (365, 297),
        Figure::Rook => (477, 512),
        Figure::Queen => (1025, 936),
        Figure::King => (0, 0),
        Figure::Hawk => (850, 800),
        Figure::Elephant => (925, 900),
        Figure::Sentry => (350, 300),
        Figure::Jailer => (425, 450),
        _ => (290, 270),
    }
}

/// Contribution to the game phase counter.
pub(super) const fn phase_weight(figure: Figure) -> i32 {
    match figure {
        Figure::Pawn | Figure::King => 0,
        Figure::Rook | Figure::Jailer => 2,
        Figure::Hawk => 3,
        Figure::Queen | Figure::Elephant => 4,
        _ => 1,
    }
}

/// Row of the piece-square tables used by `figure`.
pub(super) const fn pst_row(figure: Figure) -> usize {
    match figure {
        Figure::Pawn => 0,
        Figure::Bishop | Figure::Sentry => 2,
        Figure::Rook | Figure::Jailer => 3,
        Figure::Queen | Figure::Elephant => 4,
        Figure::King => 5,
        // knights, hawks and lancers
        _ => 1,
    }
}

pub(super) const KNIGHT_MOB_MG: [i32; 9] = [-28, -14, -2, 4, 8, 12, 17, 21, 25];
pub(super) const KNIGHT_MOB_EG: [i32; 9] = [-28, -18, -8, 0, 6, 10, 14, 18, 22];
pub(super) const BISHOP_MOB_MG: [i32; 14] = [-30, -18, -8, 0, 6, 12, 17, 21, 24, 27, 29, 31, 33, 35];
pub(super) const BISHOP_MOB_EG: [i32; 14] = [-30, -18, -8, 0, 6, 10, 14, 17, 20, 22, 24, 26, 28, 30];
pub(super) const ROOK_MOB_MG: [i32; 15] = [-14, -8, -3, 0, 3, 6, 9, 12, 14, 16, 18, 20, 21, 22, 23];
pub(super) const ROOK_MOB_EG: [i32; 15] = [-28, -16, -8, 0, 6, 12, 17, 21, 25, 28, 31, 34, 36, 38, 40];
pub(super) const QUEEN_MOB_MG: [i32; 28] = [
    -14, -10, -6, -3, 0, 2, 4, 6, 8, 10, 11, 12, 13, 14, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20,
    20, 20, 21, 21,
];
pub(super) const QUEEN_MOB_EG: [i32; 28] = [
    -28, -18, -10, -4, 0, 4, 8, 11, 14, 17, 19, 21, 23, 25, 26, 27, 28, 29, 30, 31, 32, 32, 33, 33,
    34, 34, 35, 35,
];

// Pawn structure
pub(super) const DOUBLED_PAWN: (i32, i32) = (-10, -20);
pub(super) const ISOLATED_PAWN: (i32, i32) = (-7, -9);
pub(super) const BACKWARD_PAWN: (i32, i32) = (-6, -4);
pub(super) const RAMMED_PAWN: (i32, i32) = (-4, -8);
/// Connected (phalanx or defended) pawn bonus by relative rank.
pub(super) const CONNECTED_MG: [i32; 8] = [0, 0, 4, 6, 12, 22, 40, 0];
pub(super) const CONNECTED_EG: [i32; 8] = [0, 0, 2, 4, 8, 14, 25, 0];
pub(super) const PASSED_MG: [i32; 8] = [0, 5, 10, 15, 30, 55, 90, 0];
pub(super) const PASSED_EG: [i32; 8] = [0, 10, 15, 25, 45, 80, 130, 0];
/// Endgame bonus per step of king distance to a passed pawn's stop square,
/// scaled by the pawn's rank (enemy king far: good, own king near: good).
pub(super) const PASSED_ENEMY_KING_DISTANCE: i32 = 5;
pub(super) const PASSED_OWN_KING_DISTANCE: i32 = 2;

// King safety
/// Pawn shelter in front of the king: one, two and three or more ranks ahead.
pub(super) const SHELTER_NEAR: i32 = 18;
pub(super) const SHELTER_FRONT: i32 = 9;
pub(super) const SHELTER_FAR: i32 = 3;
/// Midgame penalty by number of enemy pieces hitting the king zone (0, 1, 2, 3+).
pub(super) const KING_ATTACKERS: [i32; 4] = [0, -12, -40, -85];
/// Midgame bonus per step a queen stands closer than 7 to the enemy king.
pub(super) const QUEEN_TROPISM: i32 = 3;

// Pieces
pub(super) const ROOK_OPEN_FILE: (i32, i32) = (40, 20);
pub(super) const ROOK_SEMI_OPEN_FILE: (i32, i32) = (14, 20);
pub(super) const BISHOP_PAIR: (i32, i32) = (30, 50);

pub(super) const PST_MG: [[i32; 64]; 6] = [
    // pawn
    [
           0,    0,    0,    0,    0,    0,    0,    0,
         -35,   -1,  -20,  -23,  -15,   24,   38,  -22,
         -26,   -4,   -4,  -10,    3,    3,   33,  -12,
         -27,   -2,   -5,   12,   17,    6,   10,  -25,
         -14,   13,    6,   21,   23,   12,   17,  -23,
          -6,    7,   26,   31,   65,   56,   25,  -20,
          98,  134,   61,   95,   68,  126,   34,  -11,
           0,    0,    0,    0,    0,    0,    0,    0,
    ],
    // knight
    [
        -105,  -21,  -58,  -33,  -17,  -28,  -19,  -23,
         -29,  -53,  -12,   -3,   -1,   18,  -14,  -19,
         -23,   -9,   12,   10,   19,   17,   25,  -16,
         -13,    4,   16,   13,   28,   19,   21,   -8,
          -9,   17,   19,   53,   37,   69,   18,   22,
         -47,   60,   37,   65,   84,  129,   73,   44,
         -73,  -41,   72,   36,   23,   62,    7,  -17,
        -167,  -89,  -34,  -49,   61,  -97,  -15, -107,
    ],
    // bishop
    [
         -33,   -3,  -14,  -21,  -13,  -12,  -39,  -21,
           4,   15,   16,    0,    7,   21,   33,    1,
           0,   15,   15,   15,   14,   27,   18,   10,
          -6,   13,   13,   26,   34,   12,   10,    4,
          -4,    5,   19,   50,   37,   37,    7,   -2,
         -16,   37,   43,   40,   35,   50,   37,   -2,
         -26,   16,  -18,  -13,   30,   59,   18,  -47,
         -29,    4,  -82,  -37,  -25,  -42,    7,   -8,
    ],
    // rook
    [
         -19,  -13,    1,   17,   16,    7,  -37,  -26,
         -44,  -16,  -20,   -9,   -1,   11,   -6,  -71,
         -45,  -25,  -16,  -17,    3,    0,   -5,  -33,
         -36,  -26,  -12,   -1,    9,   -7,    6,  -23,
         -24,  -11,    7,   26,   24,   35,   -8,  -20,
          -5,   19,   26,   36,   17,   45,   61,   16,
          27,   32,   58,   62,   80,   67,   26,   44,
          32,   42,   32,   51,   63,    9,   31,   43,
    ],
    // queen
    [
          -1,  -18,   -9,   10,  -15,  -25,  -31,  -50,
         -35,   -8,   11,    2,    8,   15,   -3,    1,
         -14,    2,  -11,   -2,   -5,    2,   14,    5,
          -9,  -26,   -9,  -10,   -2,   -4,    3,   -3,
         -27,  -27,  -16,  -16,   -1,   17,   -2,    1,
         -13,  -17,    7,    8,   29,   56,   47,   57,
         -24,  -39,   -5,    1,  -16,   57,   28,   54,
         -28,    0,   29,   12,   59,   44,   43,   45,
    ],
    // king
    [
         -15,   36,   12,  -54,    8,  -28,   34,   14,
           1,    7,   -8,  -64,  -43,  -16,    9,    8,
         -14,  -14,  -22,  -46,  -44,  -30,  -15,  -27,
         -49,   -1,  -27,  -39,  -46,  -44,  -33,  -51,
         -17,  -20,  -12,  -27,  -30,  -25,  -14,  -36,
          -9,   24,    2,  -16,  -20,    6,   22,  -22,
          29,   -1,  -20,   -7,   -8,   -4,  -38,  -29,
         -65,   23,   16,  -15,  -56,  -34,    2,   13,
    ],
];

pub(super) const PST_EG: [[i32; 64]; 6] = [
    // pawn
    [
           0,    0,    0,    0,    0,    0,    0,    0,
          13,    8,    8,   10,   13,    0,    2,   -7,
           4,    7,   -6,    1,    0,   -5,   -1,   -8,
          13,    9,   -3,   -7,   -7,   -8,    3,   -1,
          32,   24,   13,    5,   -2,    4,   17,   17,
          94,  100,   85,   67,   56,   53,   82,   84,
         178,  173,  158,  134,  147,  132,  165,  187,
           0,    0,    0,    0,    0,    0,    0,    0,
    ],
    // knight
    [
         -29,  -51,  -23,  -15,  -22,  -18,  -50,  -64,
         -42,  -20,  -10,   -5,   -2,  -20,  -23,  -44,
         -23,   -3,   -1,   15,   10,   -3,  -20,  -22,
         -18,   -6,   16,   25,   16,   17,    4,  -18,
         -17,    3,   22,   22,   22,   11,    8,  -18,
         -24,  -20,   10,    9,   -1,   -9,  -19,  -41,
         -25,   -8,  -25,   -2,   -9,  -25,  -24,  -52,
         -58,  -38,  -13,  -28,  -31,  -27,  -63,  -99,
    ],
    // bishop
    [
         -23,   -9,  -23,   -5,   -9,  -16,   -5,  -17,
         -14,  -18,   -7,   -1,    4,   -9,  -15,  -27,
         -12,   -3,    8,   10,   13,    3,   -7,  -15,
          -6,    3,   13,   19,    7,   10,   -3,   -9,
          -3,    9,   12,    9,   14,   10,    3,    2,
           2,   -8,    0,   -1,   -2,    6,    0,    4,
          -8,   -4,    7,  -12,   -3,  -13,   -4,  -14,
         -14,  -21,  -11,   -8,   -7,   -9,  -17,  -24,
    ],
    // rook
    [
          -9,    2,    3,   -1,   -5,  -13,    4,  -20,
          -6,   -6,    0,    2,   -9,   -9,  -11,   -3,
          -4,    0,   -5,   -1,   -7,  -12,   -8,  -16,
           3,    5,    8,    4,   -5,   -6,   -8,  -11,
           4,    3,   13,    1,    2,    1,   -1,    2,
           7,    7,    7,    5,    4,   -3,   -5,   -3,
          11,   13,   13,   11,   -3,    3,    8,    3,
          13,   10,   18,   15,   12,   12,    8,    5,
    ],
    // queen
    [
         -33,  -28,  -22,  -43,   -5,  -32,  -20,  -41,
         -22,  -23,  -30,  -16,  -16,  -23,  -36,  -32,
         -16,  -27,   15,    6,    9,   17,   10,    5,
         -18,   28,   19,   47,   31,   34,   39,   23,
           3,   22,   24,   45,   57,   40,   57,   36,
         -20,    6,    9,   49,   47,   35,   19,    9,
         -17,   20,   32,   41,   58,   25,   30,    0,
          -9,   22,   22,   27,   27,   19,   10,   20,
    ],
    // king
    [
         -53,  -34,  -21,  -11,  -28,  -14,  -24,  -43,
         -27,  -11,    4,   13,   14,    4,   -5,  -17,
         -19,   -3,   11,   21,   23,   16,    7,   -9,
         -18,   -4,   21,   24,   27,   23,    9,  -11,
          -8,   22,   24,   27,   26,   33,   26,    3,
          10,   17,   23,   15,   20,   45,   44,   13,
         -12,   17,   14,   17,   17,   38,   23,   11,
         -74,  -35,  -18,  -18,  -11,   15,    4,  -17,
    ],
];
