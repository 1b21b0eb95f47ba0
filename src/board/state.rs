use std::cell::Cell;
use std::fmt;

use super::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, ray_attacks, rook_attacks,
};
use super::types::{
    Bitboard, CastleSide, CastlingRights, Color, Direction, Figure, Move, Piece, Square, Variant,
};
use crate::zobrist::{hand_key, piece_key, ZERO_SUBSTITUTE, ZOBRIST};

/// Pieces removed around the destination by an atomic capture.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Explosion {
    pub(crate) removed: [Option<(Square, Piece)>; 8],
    pub(crate) len: usize,
}

impl Explosion {
    pub(crate) fn push(&mut self, sq: Square, piece: Piece) {
        self.removed[self.len] = Some((sq, piece));
        self.len += 1;
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.removed[..self.len].iter().flatten().copied()
    }
}

/// Everything `undo_move` cannot recompute from the move itself.
#[derive(Clone, Debug)]
pub(crate) struct StateInfo {
    pub(crate) zobrist: u64,
    pub(crate) pawn_king: u64,
    pub(crate) castling: CastlingRights,
    /// Set only when a pawn of the side to move can capture there.
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    /// Move that produced this state.
    pub(crate) last_move: Move,
    /// `hands[color][hawk=0 | elephant=1]`
    pub(crate) hands: [[u8; 2]; 2],
    pub(crate) gates: Bitboard,
    pub(crate) disabled: Option<(Square, Square)>,
    pub(crate) explosion: Explosion,
    /// Cached check status of the side to move.
    pub(crate) checked: Cell<Option<bool>>,
}

impl StateInfo {
    fn root() -> Self {
        StateInfo {
            zobrist: 0,
            pawn_king: 0,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            last_move: Move::NULL,
            hands: [[0; 2]; 2],
            gates: Bitboard::EMPTY,
            disabled: None,
            explosion: Explosion::default(),
            checked: Cell::new(None),
        }
    }
}

/// Terminal state of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    /// The side to move is mated, or has lost its king.
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
    /// Both kings exploded.
    BothKingsGone,
}

/// A chess position for any supported variant, with its undo history.
#[derive(Clone)]
pub struct Position {
    pub(crate) pieces: [Option<Piece>; 64],
    pub(crate) by_color: [Bitboard; 2],
    pub(crate) by_figure: [Bitboard; Figure::COUNT],
    pub(crate) side_to_move: Color,
    pub(crate) variant: Variant,
    pub(crate) chess960: bool,
    /// Rook origin per castling right slot.
    pub(crate) castle_rooks: [Option<Square>; 4],
    /// Rights lost when a square is vacated or captured on.
    pub(crate) castle_mask: [CastlingRights; 64],
    pub(crate) states: Vec<StateInfo>,
    pub(crate) check_hint: Cell<Option<(Move, bool)>>,
}

impl Position {
    /// An empty board with White to move.
    pub(crate) fn empty(variant: Variant) -> Self {
        let mut states = Vec::with_capacity(256);
        states.push(StateInfo::root());
        Position {
            pieces: [None; 64],
            by_color: [Bitboard::EMPTY; 2],
            by_figure: [Bitboard::EMPTY; Figure::COUNT],
            side_to_move: Color::White,
            variant,
            chess960: false,
            castle_rooks: [None; 4],
            castle_mask: [CastlingRights::NONE; 64],
            states,
            check_hint: Cell::new(None),
        }
    }

    /// The start position of `variant`.
    #[must_use]
    pub fn start(variant: Variant) -> Self {
        Position::from_fen(variant.start_fen(), variant)
            .expect("built-in start FEN is valid")
    }

    #[inline]
    pub(crate) fn state(&self) -> &StateInfo {
        &self.states[self.states.len() - 1]
    }

    #[inline]
    pub(crate) fn state_mut(&mut self) -> &mut StateInfo {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    // ---- piece placement ----

    /// Place `piece` on the empty square `sq`, updating both hashes.
    pub(crate) fn put(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.pieces[sq.index()].is_none(), "put on occupied {sq}");
        let bb = sq.bitboard();
        self.pieces[sq.index()] = Some(piece);
        self.by_color[piece.color.index()] |= bb;
        self.by_figure[piece.figure.index()] |= bb;
        self.hash_piece(sq, piece);
    }

    /// Remove `piece` from `sq`, updating both hashes.
    pub(crate) fn remove(&mut self, sq: Square, piece: Piece) {
        debug_assert_eq!(self.pieces[sq.index()], Some(piece), "remove mismatch on {sq}");
        let bb = sq.bitboard();
        self.pieces[sq.index()] = None;
        self.by_color[piece.color.index()] ^= bb;
        self.by_figure[piece.figure.index()] ^= bb;
        self.hash_piece(sq, piece);
    }

    fn hash_piece(&mut self, sq: Square, piece: Piece) {
        let key = piece_key(piece, sq);
        let st = self.state_mut();
        st.zobrist ^= key;
        if matches!(piece.figure, Figure::Pawn | Figure::King) {
            st.pawn_king ^= key;
        }
    }

    pub(crate) fn set_castling(&mut self, rights: CastlingRights) {
        let st = self.state_mut();
        st.zobrist ^= ZOBRIST.castling[st.castling.bits()] ^ ZOBRIST.castling[rights.bits()];
        st.castling = rights;
    }

    pub(crate) fn set_en_passant(&mut self, sq: Option<Square>) {
        let st = self.state_mut();
        if let Some(old) = st.en_passant {
            st.zobrist ^= ZOBRIST.en_passant[old.file()];
        }
        if let Some(new) = sq {
            st.zobrist ^= ZOBRIST.en_passant[new.file()];
        }
        st.en_passant = sq;
    }

    pub(crate) fn set_hand(&mut self, color: Color, figure: Figure, count: u8) {
        let slot = hand_slot(figure);
        let st = self.state_mut();
        let old = st.hands[color.index()][slot];
        st.zobrist ^= hand_key(color, figure, old) ^ hand_key(color, figure, count);
        st.hands[color.index()][slot] = count;
    }

    pub(crate) fn set_gates(&mut self, gates: Bitboard) {
        let st = self.state_mut();
        for sq in st.gates ^ gates {
            st.zobrist ^= ZOBRIST.gates[sq.index()];
        }
        st.gates = gates;
    }

    pub(crate) fn set_disabled(&mut self, disabled: Option<(Square, Square)>) {
        let st = self.state_mut();
        if let Some((from, to)) = st.disabled {
            st.zobrist ^= ZOBRIST.disabled_from[from.index()] ^ ZOBRIST.disabled_to[to.index()];
        }
        if let Some((from, to)) = disabled {
            st.zobrist ^= ZOBRIST.disabled_from[from.index()] ^ ZOBRIST.disabled_to[to.index()];
        }
        st.disabled = disabled;
    }

    pub(crate) fn flip_side(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
        self.state_mut().zobrist ^= ZOBRIST.black_to_move;
    }

    /// Record a castling right for `color` with the rook starting on `rook`.
    pub(crate) fn add_castling_right(&mut self, color: Color, side: CastleSide, rook: Square) {
        let right = CastlingRights::right(color, side);
        self.castle_rooks[CastlingRights::slot(color, side)] = Some(rook);
        self.castle_mask[rook.index()] = self.castle_mask[rook.index()].union(right);
        if let Some(king) = self.king_square(color) {
            self.castle_mask[king.index()] = self.castle_mask[king.index()].union(right);
        }
        let rights = self.castling().union(right);
        self.set_castling(rights);
    }

    // ---- queries ----

    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.pieces[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    #[must_use]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    pub fn set_chess960(&mut self, chess960: bool) {
        self.chess960 = chess960;
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.by_color[0] | self.by_color[1]
    }

    #[inline]
    #[must_use]
    pub fn by_color(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn by_figure(&self, figure: Figure) -> Bitboard {
        self.by_figure[figure.index()]
    }

    #[inline]
    #[must_use]
    pub fn by_piece(&self, color: Color, figure: Figure) -> Bitboard {
        self.by_color[color.index()] & self.by_figure[figure.index()]
    }

    /// All lancers regardless of facing.
    #[must_use]
    pub fn lancers(&self) -> Bitboard {
        Direction::ALL
            .iter()
            .fold(Bitboard::EMPTY, |acc, &d| acc | self.by_figure(Figure::lancer(d)))
    }

    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.by_piece(color, Figure::King).lsb()
    }

    #[inline]
    #[must_use]
    pub fn castling(&self) -> CastlingRights {
        self.state().castling
    }

    #[inline]
    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.state().en_passant
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.state().halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.state().fullmove_number
    }

    /// The move that led to this position, or null at the root.
    #[inline]
    #[must_use]
    pub fn last_move(&self) -> Move {
        self.state().last_move
    }

    /// Hawks or elephants `color` still holds in hand.
    #[inline]
    #[must_use]
    pub fn hand(&self, color: Color, figure: Figure) -> u8 {
        match figure {
            Figure::Hawk | Figure::Elephant => self.state().hands[color.index()][hand_slot(figure)],
            _ => 0,
        }
    }

    /// Seirawan gate squares still open.
    #[inline]
    #[must_use]
    pub fn gates(&self) -> Bitboard {
        self.state().gates
    }

    /// Eightpiece move the side to move may not play.
    #[inline]
    #[must_use]
    pub fn disabled_move(&self) -> Option<(Square, Square)> {
        self.state().disabled
    }

    /// Rook origin of a castling right, if held.
    #[must_use]
    pub fn castling_rook(&self, color: Color, side: CastleSide) -> Option<Square> {
        if self.castling().contains(CastlingRights::right(color, side)) {
            self.castle_rooks[CastlingRights::slot(color, side)]
        } else {
            None
        }
    }

    /// Number of moves played since the position was set up.
    #[inline]
    #[must_use]
    pub fn ply(&self) -> usize {
        self.states.len() - 1
    }

    /// Position hash. Never zero.
    #[inline]
    #[must_use]
    pub fn zobrist(&self) -> u64 {
        match self.state().zobrist {
            0 => ZERO_SUBSTITUTE,
            z => z,
        }
    }

    /// Hash of pawns and kings only.
    #[inline]
    #[must_use]
    pub fn pawn_king_hash(&self) -> u64 {
        self.state().pawn_king
    }

    /// Both hashes recomputed from scratch.
    #[must_use]
    pub fn compute_zobrist(&self) -> (u64, u64) {
        let mut zobrist = 0;
        let mut pawn_king = 0;
        for sq in self.occupied() {
            if let Some(piece) = self.piece_at(sq) {
                let key = piece_key(piece, sq);
                zobrist ^= key;
                if matches!(piece.figure, Figure::Pawn | Figure::King) {
                    pawn_king ^= key;
                }
            }
        }
        let st = self.state();
        if self.side_to_move == Color::Black {
            zobrist ^= ZOBRIST.black_to_move;
        }
        zobrist ^= ZOBRIST.castling[st.castling.bits()];
        if let Some(ep) = st.en_passant {
            zobrist ^= ZOBRIST.en_passant[ep.file()];
        }
        for color in Color::ALL {
            for figure in [Figure::Hawk, Figure::Elephant] {
                zobrist ^= hand_key(color, figure, self.hand(color, figure));
            }
        }
        for sq in st.gates {
            zobrist ^= ZOBRIST.gates[sq.index()];
        }
        if let Some((from, to)) = st.disabled {
            zobrist ^= ZOBRIST.disabled_from[from.index()] ^ ZOBRIST.disabled_to[to.index()];
        }
        (zobrist, pawn_king)
    }

    // ---- attacks ----

    /// Pieces of `color` that cannot move or attack because an enemy jailer
    /// stands orthogonally next to them.
    #[must_use]
    pub fn jailed(&self, color: Color) -> Bitboard {
        if self.variant != Variant::EightPiece {
            return Bitboard::EMPTY;
        }
        let jailers = self.by_piece(color.opponent(), Figure::Jailer);
        jailers.orthogonal_neighbours() & self.by_color(color)
    }

    /// Pieces of `by` attacking `sq` given occupancy `occ`.
    ///
    /// Sentries and jailers never capture, so they attack nothing. Atomic
    /// kings do not capture either. Jailed pieces are excluded.
    #[must_use]
    pub fn attackers_to(&self, sq: Square, occ: Bitboard, by: Color) -> Bitboard {
        let ours = self.by_color(by) & !self.jailed(by);
        let knights = self.by_figure(Figure::Knight)
            | self.by_figure(Figure::Hawk)
            | self.by_figure(Figure::Elephant);
        let diagonal = self.by_figure(Figure::Bishop)
            | self.by_figure(Figure::Queen)
            | self.by_figure(Figure::Hawk);
        let straight = self.by_figure(Figure::Rook)
            | self.by_figure(Figure::Queen)
            | self.by_figure(Figure::Elephant);

        let mut attackers = pawn_attacks(by.opponent(), sq) & self.by_figure(Figure::Pawn)
            | knight_attacks(sq) & knights
            | bishop_attacks(sq, occ) & diagonal
            | rook_attacks(sq, occ) & straight;
        if self.variant != Variant::Atomic {
            attackers |= king_attacks(sq) & self.by_figure(Figure::King);
        }
        if self.variant == Variant::EightPiece {
            for dir in Direction::ALL {
                let lancers = self.by_figure(Figure::lancer(dir));
                if lancers.any() {
                    attackers |= ray_attacks(dir.opposite(), sq, occ) & lancers;
                }
            }
        }
        attackers & ours
    }

    /// True if any piece of `by` attacks `sq`.
    #[inline]
    #[must_use]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers_to(sq, self.occupied(), by).any()
    }

    /// Whether `color`'s king is attacked. Cached for the side to move.
    #[must_use]
    pub fn is_checked(&self, color: Color) -> bool {
        if color != self.side_to_move {
            return self.compute_checked(color);
        }
        let st = self.state();
        if let Some(checked) = st.checked.get() {
            return checked;
        }
        let checked = self.compute_checked(color);
        st.checked.set(Some(checked));
        checked
    }

    fn compute_checked(&self, color: Color) -> bool {
        let Some(king) = self.king_square(color) else {
            return false;
        };
        if self.variant == Variant::Atomic {
            match self.king_square(color.opponent()) {
                None => return false,
                Some(enemy) if king_attacks(king).contains(enemy) => return false,
                Some(_) => {}
            }
        }
        self.is_attacked(king, color.opponent())
    }

    /// Pieces giving check to the side to move.
    #[must_use]
    pub fn checkers(&self) -> Bitboard {
        let us = self.side_to_move;
        match self.king_square(us) {
            Some(king) if self.is_checked(us) => {
                self.attackers_to(king, self.occupied(), us.opponent())
            }
            _ => Bitboard::EMPTY,
        }
    }

    /// Whether playing `m` leaves the opponent in check. The answer is
    /// remembered so the following `do_move(m)` can reuse it.
    pub fn gives_check(&mut self, m: Move) -> bool {
        let them = self.side_to_move.opponent();
        self.do_move(m);
        let checked = self.is_checked(them);
        self.undo_move();
        self.check_hint.set(Some((m, checked)));
        checked
    }

    // ---- draw detection ----

    /// Occurrences of the current position in the reversible history,
    /// including the current one.
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        let current = self.state().zobrist;
        let reversible = self.state().halfmove_clock as usize;
        let len = self.states.len();
        let limit = reversible.min(len - 1);
        1 + (4..=limit)
            .step_by(2)
            .filter(|&back| self.states[len - 1 - back].zobrist == current)
            .count()
    }

    /// True if the position appeared at least `times` times.
    #[must_use]
    pub fn is_repetition(&self, times: usize) -> bool {
        self.repetition_count() >= times
    }

    #[inline]
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.state().halfmove_clock >= 100
    }

    /// Lone kings, a single knight, or bishops all on one square color.
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.occupied()
            & !(self.by_figure(Figure::King)
                | self.by_figure(Figure::Knight)
                | self.by_figure(Figure::Bishop));
        if heavy.any() || self.state().hands != [[0; 2]; 2] {
            return false;
        }
        let knights = self.by_figure(Figure::Knight);
        let bishops = self.by_figure(Figure::Bishop);
        match (knights.popcount(), bishops.popcount()) {
            (0, 0) | (1, 0) | (0, 1) => true,
            (0, _) => (bishops & Bitboard::LIGHT_SQUARES).is_empty()
                || (bishops & Bitboard::DARK_SQUARES).is_empty(),
            _ => false,
        }
    }

    /// Result of the game in the current position.
    pub fn game_status(&mut self) -> GameStatus {
        let us = self.side_to_move;
        match (self.king_square(us), self.king_square(us.opponent())) {
            (None, None) => return GameStatus::BothKingsGone,
            (None, Some(_)) => return GameStatus::Checkmate { winner: us.opponent() },
            (Some(_), None) => return GameStatus::Checkmate { winner: us },
            _ => {}
        }
        if self.legal_moves().is_empty() {
            return if self.is_checked(us) {
                GameStatus::Checkmate { winner: us.opponent() }
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_fifty_move_draw() {
            GameStatus::FiftyMoveRule
        } else if self.is_repetition(3) {
            GameStatus::ThreefoldRepetition
        } else if self.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::Ongoing
        }
    }

    /// Debug check that the redundant board views agree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut by_color = [Bitboard::EMPTY; 2];
        let mut by_figure = [Bitboard::EMPTY; Figure::COUNT];
        for sq in Square::all() {
            if let Some(p) = self.piece_at(sq) {
                by_color[p.color.index()] |= sq.bitboard();
                by_figure[p.figure.index()] |= sq.bitboard();
            }
        }
        assert_eq!(by_color, self.by_color);
        assert_eq!(by_figure, self.by_figure);
        let (zobrist, pawn_king) = self.compute_zobrist();
        assert_eq!(zobrist, self.state().zobrist, "zobrist drift in {}", self.to_fen());
        assert_eq!(pawn_king, self.state().pawn_king);
    }
}

#[inline]
pub(crate) const fn hand_slot(figure: Figure) -> usize {
    match figure {
        Figure::Elephant => 1,
        _ => 0,
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start(Variant::Standard)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.piece_at(Square::new(rank, file)) {
                    Some(p) => write!(f, " {}", p.to_char())?,
                    None => f.write_str(" .")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}
