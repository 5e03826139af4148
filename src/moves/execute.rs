//! Applies a move to produce the resulting position (§4.4). `Position` is a
//! cheap `Copy` value carrying no undo state (contrast the teacher's
//! `Undo`/`NullMoveUndo`): the search clones the parent and keeps it around
//! instead of reversing a child back into existence. `apply` both executes
//! the move and mirrors the result, since the mover's perspective always
//! flips after a move (see `board::Position::mirror`).

use crate::board::{Piece, Position, CASTLE_ENEMY_K, CASTLE_ENEMY_Q, CASTLE_OWN_K, CASTLE_OWN_Q};
use crate::hash::zobrist::{ep_file_to_hash, piece_square_key, xor_castling_rights_delta, zobrist_keys};
use crate::moves::types::Move;
use crate::square::Square;
use arrayvec::ArrayVec;

/// A single piece placement or removal `apply` performed, in the order it
/// happened — feeds directly into the evaluator's accumulator (§4.5), which
/// only needs to know what changed, not how to recompute a whole position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyPiece {
    Removed { owner_is_enemy: bool, piece: Piece, sq: Square },
    Added { owner_is_enemy: bool, piece: Piece, sq: Square },
}

/// At most four entries: a non-capturing king move plus its castling rook.
pub type DirtyPieces = ArrayVec<DirtyPiece, 4>;

const OWN_ROOK_KINGSIDE: u8 = 7;
const OWN_ROOK_QUEENSIDE: u8 = 0;
const ENEMY_ROOK_KINGSIDE: u8 = 63;
const ENEMY_ROOK_QUEENSIDE: u8 = 56;

#[inline(always)]
fn toggle_piece_bitboards(pos: &mut Position, piece: Piece, bit: u64) {
    match piece {
        Piece::Pawn => pos.pawns_en_passant ^= bit,
        Piece::Bishop => pos.bishop_queens ^= bit,
        Piece::Rook => pos.rook_queens ^= bit,
        Piece::Queen => {
            pos.rook_queens ^= bit;
            pos.bishop_queens ^= bit;
        }
        Piece::Knight | Piece::King => {}
    }
}

#[inline]
fn remove_own_piece(pos: &mut Position, dirty: &mut DirtyPieces, piece: Piece, sq: Square) {
    let bit = sq.bit();
    pos.own_pieces &= !bit;
    toggle_piece_bitboards(pos, piece, bit);
    pos.zobrist ^= piece_square_key(zobrist_keys(), false, piece, sq);
    dirty.push(DirtyPiece::Removed { owner_is_enemy: false, piece, sq });
}

#[inline]
fn add_own_piece(pos: &mut Position, dirty: &mut DirtyPieces, piece: Piece, sq: Square) {
    let bit = sq.bit();
    pos.own_pieces |= bit;
    toggle_piece_bitboards(pos, piece, bit);
    pos.zobrist ^= piece_square_key(zobrist_keys(), false, piece, sq);
    dirty.push(DirtyPiece::Added { owner_is_enemy: false, piece, sq });
}

#[inline]
fn remove_enemy_piece(pos: &mut Position, dirty: &mut DirtyPieces, piece: Piece, sq: Square) {
    let bit = sq.bit();
    pos.enemy_pieces &= !bit;
    toggle_piece_bitboards(pos, piece, bit);
    pos.zobrist ^= piece_square_key(zobrist_keys(), true, piece, sq);
    dirty.push(DirtyPiece::Removed { owner_is_enemy: true, piece, sq });
}

#[inline]
fn castling_rook_squares(mv: Move) -> Option<(Square, Square)> {
    if mv.is_kingside_castle() {
        Some((Square::from_index(OWN_ROOK_KINGSIDE), Square::from_index(5)))
    } else if mv.is_queenside_castle() {
        Some((Square::from_index(OWN_ROOK_QUEENSIDE), Square::from_index(3)))
    } else {
        None
    }
}

/// Applies `mv` (assumed legal) to `pos`, returning the resulting position —
/// already mirrored so the opponent is "own" again — and the dirty-piece log
/// for the evaluator's accumulator.
pub fn apply(pos: &Position, mv: Move) -> (Position, DirtyPieces) {
    let keys = zobrist_keys();
    let mut next = *pos;
    let mut dirty = DirtyPieces::new();

    if let Some(file) = ep_file_to_hash(pos) {
        next.zobrist ^= keys.ep_file[file as usize];
    }
    next.ep_target = None;

    let from = mv.from;
    let to = mv.to;

    let captured_enemy = if mv.is_en_passant() {
        let cap_sq = Square::from_index(to.index() - 8);
        remove_enemy_piece(&mut next, &mut dirty, Piece::Pawn, cap_sq);
        true
    } else if mv.is_capture() {
        let (_, cap_piece) = pos.piece_at(to).expect("capture target must hold a piece");
        remove_enemy_piece(&mut next, &mut dirty, cap_piece, to);
        true
    } else {
        false
    };

    let old_rights = pos.castling_rights;
    let mut new_rights = old_rights;
    if mv.piece == Piece::King {
        new_rights &= !(CASTLE_OWN_K | CASTLE_OWN_Q);
    }
    if mv.piece == Piece::Rook {
        match from.index() {
            OWN_ROOK_KINGSIDE => new_rights &= !CASTLE_OWN_K,
            OWN_ROOK_QUEENSIDE => new_rights &= !CASTLE_OWN_Q,
            _ => {}
        }
    }
    if captured_enemy {
        match to.index() {
            ENEMY_ROOK_KINGSIDE => new_rights &= !CASTLE_ENEMY_K,
            ENEMY_ROOK_QUEENSIDE => new_rights &= !CASTLE_ENEMY_Q,
            _ => {}
        }
    }
    if new_rights != old_rights {
        xor_castling_rights_delta(&mut next.zobrist, keys, old_rights, new_rights);
        next.castling_rights = new_rights;
    }

    if mv.piece == Piece::King {
        remove_own_piece(&mut next, &mut dirty, Piece::King, from);
        add_own_piece(&mut next, &mut dirty, Piece::King, to);
        next.own_king = to;
    } else if let Some(promotion) = mv.promotion {
        remove_own_piece(&mut next, &mut dirty, Piece::Pawn, from);
        add_own_piece(&mut next, &mut dirty, promotion, to);
    } else {
        remove_own_piece(&mut next, &mut dirty, mv.piece, from);
        add_own_piece(&mut next, &mut dirty, mv.piece, to);
    }

    if let Some((rook_from, rook_to)) = castling_rook_squares(mv) {
        remove_own_piece(&mut next, &mut dirty, Piece::Rook, rook_from);
        add_own_piece(&mut next, &mut dirty, Piece::Rook, rook_to);
    }

    if mv.is_double_pawn_push() {
        next.ep_target = Some(Square::from_index(from.index() + 8));
    }

    if let Some(file) = ep_file_to_hash(&next) {
        next.zobrist ^= keys.ep_file[file as usize];
    }

    next.halfmove_clock = if captured_enemy || mv.piece == Piece::Pawn {
        0
    } else {
        pos.halfmove_clock + 1
    };
    if pos.is_flipped {
        next.fullmove_number = pos.fullmove_number + 1;
    }
    next.ply = pos.ply + 1;

    next.mirror();
    (next, dirty)
}

/// A null move: no piece moves, only the side to move and the en-passant
/// target change. Used by search's null-move pruning, never by movegen.
pub fn apply_null_move(pos: &Position) -> Position {
    let keys = zobrist_keys();
    let mut next = *pos;
    if let Some(file) = ep_file_to_hash(pos) {
        next.zobrist ^= keys.ep_file[file as usize];
    }
    next.ep_target = None;
    next.ply = pos.ply + 1;
    next.mirror();
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;
    use crate::moves::movegen::generate_pseudo_legal;
    use crate::moves::types::MoveBuffer;
    use std::str::FromStr;

    #[test]
    fn apply_matches_full_zobrist_recompute() {
        let tables = load_magic_tables();
        let pos = Position::new_game();
        let mut buf: Vec<Move> = Vec::new();
        generate_pseudo_legal(&pos, &tables, &mut buf);
        for mv in buf.iter().copied() {
            let (next, _) = apply(&pos, mv);
            assert_eq!(next.zobrist, next.compute_zobrist_full(), "mismatch for {mv}");
        }
    }

    #[test]
    fn ep_capturable_position_hashes_the_ep_file() {
        // Black to move, d-file pawn just double-pushed to d4 and c4 can take
        // it en passant (spec.md §8 scenario 5, mirrored to Black-to-move).
        let pos = Position::from_str("8/8/8/2k5/2pP4/8/B7/4K3 b - d3 0 1").unwrap();
        assert_eq!(pos.zobrist, pos.compute_zobrist_full());
        assert!(ep_file_to_hash(&pos).is_some(), "c4 pawn should make the ep file live");

        let keys = zobrist_keys();
        let ep_file = ep_file_to_hash(&pos).unwrap();
        let without_ep = Position::from_str("8/8/8/2k5/2pP4/8/B7/4K3 b - - 0 1").unwrap();
        assert_eq!(pos.zobrist ^ without_ep.zobrist, keys.ep_file[ep_file as usize]);
    }

    #[test]
    fn double_push_sets_ep_target_mirrored_for_opponent() {
        let pos = Position::new_game();
        let mv = Move {
            from: Square::from_str("e2").unwrap(),
            to: Square::from_str("e4").unwrap(),
            piece: Piece::Pawn,
            promotion: None,
            flags: crate::moves::types::DOUBLE_PAWN_PUSH,
        };
        let (next, _) = apply(&pos, mv);
        // `next` is mirrored (opponent to move); the ep target should be e3
        // mirrored to e6 in the opponent's own-up frame.
        assert_eq!(next.ep_target, Some(Square::from_str("e6").unwrap()));
    }

    #[test]
    fn capturing_corner_rook_clears_enemy_castling_right() {
        let pos = Position::from_str("r3k3/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
        let tables = load_magic_tables();
        let mut buf: Vec<Move> = Vec::new();
        generate_pseudo_legal(&pos, &tables, &mut buf);
        let rxa8 = buf
            .iter()
            .copied()
            .find(|m| m.to == Square::from_str("a8").unwrap() && m.piece == Piece::Rook)
            .expect("Ra1xa8 should be pseudo-legal");
        let (next, _) = apply(&pos, rxa8);
        // next is mirrored (black to move): black's rights now sit in the
        // "own" slot, and black had only the queenside right to begin with.
        assert_eq!(next.castling_rights & (CASTLE_OWN_K | CASTLE_OWN_Q), 0);
    }

    #[test]
    fn null_move_only_flips_side_and_clears_ep() {
        let pos = Position::new_game();
        let next = apply_null_move(&pos);
        assert!(next.is_flipped);
        assert_eq!(next.ep_target, None);
        assert_eq!(next.zobrist, next.compute_zobrist_full());
    }
}
