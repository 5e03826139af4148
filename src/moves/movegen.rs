//! Pseudo-legal move generation from the mover's perspective (§4.2): own
//! always advances toward increasing rank, so pawn pushes/captures are a
//! handful of shift-and-mask bitboard formulas instead of a per-color
//! branch. Captures and quiets are generated by separate entry points
//! (`MovePicker` needs captures first for MVV/LVA and quiescence); legality
//! with respect to check — including castling-through-check — is *not*
//! tested here (§4.2), it is the legality filter's job (`moves::legality`).

use crate::bitboard::{BitboardExt, NOT_FILE_A, NOT_FILE_H, RANK_3, RANK_8};
use crate::board::{Piece, Position, CASTLE_OWN_K, CASTLE_OWN_Q};
use crate::moves::attacks::{bishop_attacks, king_attacks, knight_attacks, queen_attacks, rook_attacks};
use crate::moves::magic::MagicTables;
use crate::moves::types::{
    Move, MoveBuffer, CAPTURE, DOUBLE_PAWN_PUSH, EN_PASSANT, KINGSIDE_CASTLE, PROMOTION,
    PROMOTION_CAPTURE, QUEENSIDE_CASTLE, QUIET_MOVE,
};
use crate::square::Square;

const PROMO_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

const OWN_KING_HOME: u8 = 4;
const OWN_KINGSIDE_BETWEEN: u64 = (1u64 << 5) | (1u64 << 6);
const OWN_QUEENSIDE_BETWEEN: u64 = (1u64 << 1) | (1u64 << 2) | (1u64 << 3);

#[inline(always)]
fn push(buf: &mut impl MoveBuffer, from: u8, to: u8, piece: Piece, promotion: Option<Piece>, flags: u8) {
    buf.push(Move {
        from: Square::from_index(from),
        to: Square::from_index(to),
        piece,
        promotion,
        flags,
    });
}

fn generate_pawn_captures(pos: &Position, buf: &mut impl MoveBuffer) {
    let pawns = pos.pawns() & pos.own_pieces;
    let ep_bit = pos.ep_target.map(Square::bit).unwrap_or(0);
    let targets = pos.enemy_pieces | ep_bit;

    let mut left = (pawns << 7) & targets & NOT_FILE_H;
    while let Some(to) = left.pop_lsb() {
        let from = to - 7;
        emit_pawn_capture(buf, from, to, ep_bit);
    }
    let mut right = (pawns << 9) & targets & NOT_FILE_A;
    while let Some(to) = right.pop_lsb() {
        let from = to - 9;
        emit_pawn_capture(buf, from, to, ep_bit);
    }
}

#[inline]
fn emit_pawn_capture(buf: &mut impl MoveBuffer, from: u8, to: u8, ep_bit: u64) {
    let to_bit = 1u64 << to;
    if to_bit & RANK_8 != 0 {
        for &promo in &PROMO_PIECES {
            push(buf, from, to, Piece::Pawn, Some(promo), PROMOTION_CAPTURE);
        }
    } else if to_bit & ep_bit != 0 {
        push(buf, from, to, Piece::Pawn, None, EN_PASSANT);
    } else {
        push(buf, from, to, Piece::Pawn, None, CAPTURE);
    }
}

fn generate_pawn_quiets(pos: &Position, buf: &mut impl MoveBuffer) {
    let pawns = pos.pawns() & pos.own_pieces;
    let occ = pos.occupied();

    let single_push = (pawns << 8) & !occ;
    let mut promos = single_push & RANK_8;
    while let Some(to) = promos.pop_lsb() {
        let from = to - 8;
        for &promo in &PROMO_PIECES {
            push(buf, from, to, Piece::Pawn, Some(promo), PROMOTION);
        }
    }
    let mut quiet = single_push & !RANK_8;
    while let Some(to) = quiet.pop_lsb() {
        push(buf, to - 8, to, Piece::Pawn, None, QUIET_MOVE);
    }

    let mut double = ((single_push & RANK_3) << 8) & !occ;
    while let Some(to) = double.pop_lsb() {
        push(buf, to - 16, to, Piece::Pawn, None, DOUBLE_PAWN_PUSH);
    }
}

#[inline(always)]
fn leaper_moves(
    buf: &mut impl MoveBuffer,
    piece: Piece,
    mut bb: u64,
    attacks_of: impl Fn(u8) -> u64,
    own: u64,
    enemy: u64,
    captures_only: bool,
) {
    while let Some(from) = bb.pop_lsb() {
        let attacks = attacks_of(from) & !own;
        let mut targets = if captures_only { attacks & enemy } else { attacks & !enemy };
        while let Some(to) = targets.pop_lsb() {
            let flags = if (1u64 << to) & enemy != 0 { CAPTURE } else { QUIET_MOVE };
            push(buf, from, to, piece, None, flags);
        }
    }
}

fn generate_knight_moves(pos: &Position, buf: &mut impl MoveBuffer, captures_only: bool) {
    leaper_moves(
        buf,
        Piece::Knight,
        pos.knights() & pos.own_pieces,
        knight_attacks,
        pos.own_pieces,
        pos.enemy_pieces,
        captures_only,
    );
}

fn generate_king_leaper_moves(pos: &Position, buf: &mut impl MoveBuffer, captures_only: bool) {
    leaper_moves(
        buf,
        Piece::King,
        pos.own_king.bit(),
        king_attacks,
        pos.own_pieces,
        pos.enemy_pieces,
        captures_only,
    );
}

#[inline(always)]
fn slider_moves(
    buf: &mut impl MoveBuffer,
    piece: Piece,
    mut bb: u64,
    attacks_of: impl Fn(u8, u64, &MagicTables) -> u64,
    own: u64,
    enemy: u64,
    occ: u64,
    tables: &MagicTables,
    captures_only: bool,
) {
    while let Some(from) = bb.pop_lsb() {
        let attacks = attacks_of(from, occ, tables) & !own;
        let mut targets = if captures_only { attacks & enemy } else { attacks & !enemy };
        while let Some(to) = targets.pop_lsb() {
            let flags = if (1u64 << to) & enemy != 0 { CAPTURE } else { QUIET_MOVE };
            push(buf, from, to, piece, None, flags);
        }
    }
}

fn generate_bishop_moves(pos: &Position, tables: &MagicTables, buf: &mut impl MoveBuffer, captures_only: bool) {
    slider_moves(
        buf,
        Piece::Bishop,
        pos.bishops() & pos.own_pieces,
        bishop_attacks,
        pos.own_pieces,
        pos.enemy_pieces,
        pos.occupied(),
        tables,
        captures_only,
    );
}

fn generate_rook_moves(pos: &Position, tables: &MagicTables, buf: &mut impl MoveBuffer, captures_only: bool) {
    slider_moves(
        buf,
        Piece::Rook,
        pos.rooks() & pos.own_pieces,
        rook_attacks,
        pos.own_pieces,
        pos.enemy_pieces,
        pos.occupied(),
        tables,
        captures_only,
    );
}

fn generate_queen_moves(pos: &Position, tables: &MagicTables, buf: &mut impl MoveBuffer, captures_only: bool) {
    slider_moves(
        buf,
        Piece::Queen,
        pos.queens() & pos.own_pieces,
        queen_attacks,
        pos.own_pieces,
        pos.enemy_pieces,
        pos.occupied(),
        tables,
        captures_only,
    );
}

/// Castling is a quiet move; legality w.r.t. check is rechecked by the
/// legality filter, not here.
fn generate_castling(pos: &Position, buf: &mut impl MoveBuffer) {
    if pos.own_king.index() != OWN_KING_HOME {
        return;
    }
    let occ = pos.occupied();
    if pos.castling_rights & CASTLE_OWN_K != 0 && occ & OWN_KINGSIDE_BETWEEN == 0 {
        push(buf, OWN_KING_HOME, 6, Piece::King, None, KINGSIDE_CASTLE);
    }
    if pos.castling_rights & CASTLE_OWN_Q != 0 && occ & OWN_QUEENSIDE_BETWEEN == 0 {
        push(buf, OWN_KING_HOME, 2, Piece::King, None, QUEENSIDE_CASTLE);
    }
}

pub fn generate_pseudo_legal_captures(pos: &Position, tables: &MagicTables, buf: &mut impl MoveBuffer) {
    generate_pawn_captures(pos, buf);
    generate_knight_moves(pos, buf, true);
    generate_bishop_moves(pos, tables, buf, true);
    generate_rook_moves(pos, tables, buf, true);
    generate_queen_moves(pos, tables, buf, true);
    generate_king_leaper_moves(pos, buf, true);
}

pub fn generate_pseudo_legal_quiets(pos: &Position, tables: &MagicTables, buf: &mut impl MoveBuffer) {
    generate_pawn_quiets(pos, buf);
    generate_knight_moves(pos, buf, false);
    generate_bishop_moves(pos, tables, buf, false);
    generate_rook_moves(pos, tables, buf, false);
    generate_queen_moves(pos, tables, buf, false);
    generate_king_leaper_moves(pos, buf, false);
    generate_castling(pos, buf);
}

/// Captures first (MVV/LVA, quiescence), then quiets.
pub fn generate_pseudo_legal(pos: &Position, tables: &MagicTables, buf: &mut impl MoveBuffer) {
    generate_pseudo_legal_captures(pos, tables, buf);
    generate_pseudo_legal_quiets(pos, tables, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;

    fn tables() -> MagicTables {
        load_magic_tables()
    }

    #[test]
    fn startpos_has_twenty_pseudo_legal_moves() {
        let pos = Position::new_game();
        let mut buf: Vec<Move> = Vec::new();
        generate_pseudo_legal(&pos, &tables(), &mut buf);
        assert_eq!(buf.len(), 20);
    }

    #[test]
    fn promotion_generates_four_underpromotions_and_queen() {
        use std::str::FromStr;
        let pos = Position::from_str("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut buf: Vec<Move> = Vec::new();
        generate_pseudo_legal_quiets(&pos, &tables(), &mut buf);
        let promos: Vec<_> = buf.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 4);
    }

    #[test]
    fn en_passant_capture_is_generated() {
        use std::str::FromStr;
        let pos = Position::from_str("8/8/8/2k5/2pP4/8/B7/4K3 b - d3 0 1").unwrap();
        let mut buf: Vec<Move> = Vec::new();
        generate_pseudo_legal_captures(&pos, &tables(), &mut buf);
        assert!(buf.iter().any(|m| m.is_en_passant()));
    }
}
