//! Evaluator accumulator (§4.5 SUPPLEMENT): a ply-indexed stack of tapered
//! material+PST snapshots, each derived from the previous ply's snapshot plus
//! the current move's dirty-piece delta instead of a full board scan. Mirrors
//! `examples/Beanie496-Crab/src/board/accumulators.rs`'s add/remove hook
//! pattern, adapted from Beanie496's per-color fields to a single own-minus-
//! enemy value (this crate has no color axis to index by — see
//! `board::Position`) and from a push/pop pair to a flat ply-indexed stack, as
//! §9 "Ownership of accumulators and repetition history" requires: owned by
//! the search, sized to the hard maximum depth, never copied along with a
//! `Position` clone.
//!
//! Positional terms outside material+PST (mobility, pawn structure, king
//! safety, mop-up) are not incrementalized here — they're cheap enough to
//! recompute fresh every node, same as the teacher's `eval.rs` does for all
//! of its terms. Only the accumulator's piece-square component is carried
//! incrementally.

use crate::board::{Piece, Position};
use crate::moves::execute::{DirtyPiece, DirtyPieces};
use crate::search::pesto;

/// Hard maximum search depth the accumulator stack is sized for (§5's
/// "fixed-capacity stack, capacity = search's hard maximum depth").
pub const MAX_PLY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accumulator {
    pub mg: i32,
    pub eg: i32,
}

fn material(piece: Piece) -> (i32, i32) {
    match piece {
        Piece::Pawn => pesto::PAWN_VAL,
        Piece::Knight => pesto::KNIGHT_VAL,
        Piece::Bishop => pesto::BISHOP_VAL,
        Piece::Rook => pesto::ROOK_VAL,
        Piece::Queen => pesto::QUEEN_VAL,
        Piece::King => pesto::KING_VAL,
    }
}

fn tables(piece: Piece) -> (&'static pesto::Table, &'static pesto::Table) {
    match piece {
        Piece::Pawn => (&pesto::PAWN_MG, &pesto::PAWN_EG),
        Piece::Knight => (&pesto::KNIGHT_MG, &pesto::KNIGHT_EG),
        Piece::Bishop => (&pesto::BISHOP_MG, &pesto::BISHOP_EG),
        Piece::Rook => (&pesto::ROOK_MG, &pesto::ROOK_EG),
        Piece::Queen => (&pesto::QUEEN_MG, &pesto::QUEEN_EG),
        Piece::King => (&pesto::KING_MG, &pesto::KING_EG),
    }
}

#[inline(always)]
fn mirror_vert(sq: u8) -> usize {
    (sq ^ 56) as usize
}

/// Signed (mg, eg) contribution of one piece, positive if it belongs to
/// `own`. `own`'s table index is vertically mirrored (matching the teacher's
/// `mirror_vert` treatment of White) so one set of tables serves both
/// perspectives.
fn contribution(piece: Piece, sq: crate::square::Square, is_own: bool) -> (i32, i32) {
    let (mg_val, eg_val) = material(piece);
    let (mg_table, eg_table) = tables(piece);
    let idx = if is_own { mirror_vert(sq.index()) } else { sq.index() as usize };
    let mg = mg_val + mg_table[idx];
    let eg = eg_val + eg_table[idx];
    if is_own {
        (mg, eg)
    } else {
        (-mg, -eg)
    }
}

impl Accumulator {
    /// Full recomputation from a position's bitboards — the accumulator's
    /// only non-incremental path, used once at the search root.
    pub fn compute_from_scratch(pos: &Position) -> Self {
        let mut mg = 0;
        let mut eg = 0;
        for piece in [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            let mut own_bb = piece_bitboard(pos, piece) & pos.own_pieces;
            while let Some(idx) = crate::bitboard::BitboardExt::pop_lsb(&mut own_bb) {
                let (m, e) = contribution(piece, crate::square::Square::from_index(idx), true);
                mg += m;
                eg += e;
            }
            let mut enemy_bb = piece_bitboard(pos, piece) & pos.enemy_pieces;
            while let Some(idx) = crate::bitboard::BitboardExt::pop_lsb(&mut enemy_bb) {
                let (m, e) = contribution(piece, crate::square::Square::from_index(idx), false);
                mg += m;
                eg += e;
            }
        }
        Accumulator { mg, eg }
    }

    /// Tapered material+PST score, `own` minus `enemy`, from `own`'s
    /// perspective (positive = own is better).
    pub fn tapered(&self, phase: i32, total_phase: i32) -> i32 {
        (self.mg * phase + self.eg * (total_phase - phase)) / total_phase
    }
}

fn piece_bitboard(pos: &Position, piece: Piece) -> u64 {
    match piece {
        Piece::Pawn => pos.pawns(),
        Piece::Knight => pos.knights(),
        Piece::Bishop => pos.bishops(),
        Piece::Rook => pos.rooks(),
        Piece::Queen => pos.queens(),
        Piece::King => pos.own_king.bit() | pos.enemy_king.bit(),
    }
}

/// Ply-indexed stack of accumulator snapshots, owned by the search — never
/// part of `Position`, never copied along with it (§9).
pub struct AccumulatorStack {
    slots: Vec<Accumulator>,
}

impl Default for AccumulatorStack {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatorStack {
    pub fn new() -> Self {
        Self { slots: vec![Accumulator::default(); MAX_PLY] }
    }

    pub fn get(&self, ply: usize) -> Accumulator {
        self.slots[ply]
    }

    /// Seeds ply 0 (the search root) with a from-scratch recomputation.
    pub fn init_root(&mut self, pos: &Position) {
        self.slots[0] = Accumulator::compute_from_scratch(pos);
    }

    /// Derives `ply`'s accumulator from `ply - 1`'s plus the dirty-piece
    /// delta `apply` produced. `dirty` records additions/removals in the
    /// pre-move frame (before the position mirrors); negating the summed
    /// total after applying the delta models that mirror exactly, since a
    /// piece's contribution magnitude at a given square is invariant under
    /// the simultaneous (owner flips, square mirrors) transform that
    /// `Position::mirror` performs — see the `accumulator_matches_full_recompute_after_move`
    /// test below.
    pub fn push_from_dirty(&mut self, ply: usize, dirty: &DirtyPieces) {
        let prev = self.slots[ply - 1];
        let mut mg = prev.mg;
        let mut eg = prev.eg;
        for entry in dirty {
            let (owner_is_enemy, piece, sq, sign) = match *entry {
                DirtyPiece::Added { owner_is_enemy, piece, sq } => (owner_is_enemy, piece, sq, 1),
                DirtyPiece::Removed { owner_is_enemy, piece, sq } => (owner_is_enemy, piece, sq, -1),
            };
            let (m, e) = contribution(piece, sq, !owner_is_enemy);
            mg += sign * m;
            eg += sign * e;
        }
        self.slots[ply] = Accumulator { mg: -mg, eg: -eg };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::execute::apply;
    use crate::moves::magic::loader::load_magic_tables;
    use crate::moves::movegen::generate_pseudo_legal;
    use crate::moves::types::Move;
    use std::str::FromStr;

    #[test]
    fn startpos_material_pst_is_symmetric() {
        let pos = Position::new_game();
        let acc = Accumulator::compute_from_scratch(&pos);
        assert_eq!(acc.mg, 0);
        assert_eq!(acc.eg, 0);
    }

    #[test]
    fn accumulator_matches_full_recompute_after_move() {
        let tables = load_magic_tables();
        let pos = Position::new_game();
        let mut buf: Vec<Move> = Vec::new();
        generate_pseudo_legal(&pos, &tables, &mut buf);

        let mut stack = AccumulatorStack::new();
        stack.init_root(&pos);

        for mv in buf.iter().copied() {
            let (next, dirty) = apply(&pos, mv);
            let mut one_ply = AccumulatorStack::new();
            one_ply.slots[0] = stack.get(0);
            one_ply.push_from_dirty(1, &dirty);
            let incremental = one_ply.get(1);
            let from_scratch = Accumulator::compute_from_scratch(&next);
            assert_eq!(incremental, from_scratch, "mismatch after {mv}");
        }
    }

    #[test]
    fn queen_capture_updates_both_sides() {
        let tables = load_magic_tables();
        let pos = Position::from_str("4k3/8/8/3q4/8/8/8/3QK3 w - - 0 1").unwrap();
        let mut buf: Vec<Move> = Vec::new();
        generate_pseudo_legal(&pos, &tables, &mut buf);
        let capture = buf.iter().copied().find(|m| m.is_capture()).expect("queen takes queen");
        let (next, dirty) = apply(&pos, capture);
        let mut stack = AccumulatorStack::new();
        stack.init_root(&pos);
        stack.push_from_dirty(1, &dirty);
        assert_eq!(stack.get(1), Accumulator::compute_from_scratch(&next));
    }
}
