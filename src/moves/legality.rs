//! Pin-accelerated legality filter (§4.3): rather than applying every
//! pseudo-legal move and rescanning for check, this computes the set of
//! pinned own pieces and (when in check) the check-evasion mask once per
//! position, then checks each candidate move against those sets directly.
//! King moves and en passant still fall back to a cheaper-than-naive but
//! still direct check: king destinations are tested against attackers with
//! the king itself removed from the occupancy, and en passant — the one
//! case where two pawns leave the same rank at once and can open a
//! discovered check no static ray test conveniently captures — is verified
//! by actually applying the move and asking whether the mover's king is
//! still attacked afterward.

use crate::bitboard::BitboardExt;
use crate::board::Piece;
use crate::board::Position;
use crate::moves::attacks::{bishop_attacks, king_attacks, knight_attacks, own_pawn_attacks, rook_attacks};
use crate::moves::execute::apply;
use crate::moves::magic::MagicTables;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::square_control::{castling_transit_is_safe, is_in_check};
use crate::moves::types::{Move, MoveBuffer};
use crate::square::Square;
use arrayvec::ArrayVec;

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Enemy squares currently attacking the own king.
fn checkers(pos: &Position, tables: &MagicTables) -> u64 {
    let king = pos.own_king.index();
    let occ = pos.occupied();
    let mut result = 0u64;
    result |= rook_attacks(king, occ, tables) & pos.enemy_pieces & pos.rook_queens;
    result |= bishop_attacks(king, occ, tables) & pos.enemy_pieces & pos.bishop_queens;
    result |= knight_attacks(king) & pos.enemy_pieces & pos.knights();
    result |= own_pawn_attacks(king) & pos.enemy_pieces & pos.pawns();
    result
}

/// Scans one ray from the king outward; returns `Some((pinned_square, ray))`
/// if exactly one own piece sits on the ray before an enemy slider of the
/// matching type, where `ray` is every square from the king (exclusive) to
/// the pinner (inclusive) — the pinned piece's only legal destinations.
fn scan_for_pin(pos: &Position, king_rank: i8, king_file: i8, dr: i8, df: i8, slider_mask: u64) -> Option<(Square, u64)> {
    let mut ray = 0u64;
    let mut pinned: Option<Square> = None;
    let mut r = king_rank + dr;
    let mut f = king_file + df;
    while (0..8).contains(&r) && (0..8).contains(&f) {
        let sq = Square::new(f as u8, r as u8);
        let bit = sq.bit();
        ray |= bit;
        let is_own = pos.own_pieces & bit != 0;
        let is_enemy = pos.enemy_pieces & bit != 0;
        match pinned {
            None => {
                if is_own {
                    pinned = Some(sq);
                } else if is_enemy {
                    return None;
                }
            }
            Some(candidate) => {
                if is_own {
                    return None;
                } else if is_enemy {
                    return if slider_mask & bit != 0 { Some((candidate, ray)) } else { None };
                }
            }
        }
        r += dr;
        f += df;
    }
    None
}

struct PinSet {
    pins: ArrayVec<(Square, u64), 8>,
}

impl PinSet {
    fn ray_for(&self, sq: Square) -> Option<u64> {
        self.pins.iter().find(|(s, _)| *s == sq).map(|(_, ray)| *ray)
    }
}

fn compute_pins(pos: &Position) -> PinSet {
    let king = pos.own_king;
    let kr = king.rank() as i8;
    let kf = king.file() as i8;
    let mut pins = ArrayVec::new();
    for &(dr, df) in ROOK_DIRS.iter() {
        if let Some(p) = scan_for_pin(pos, kr, kf, dr, df, pos.rook_queens) {
            pins.push(p);
        }
    }
    for &(dr, df) in BISHOP_DIRS.iter() {
        if let Some(p) = scan_for_pin(pos, kr, kf, dr, df, pos.bishop_queens) {
            pins.push(p);
        }
    }
    PinSet { pins }
}

/// Every square strictly between `king` and `target` plus `target` itself.
/// Only meaningful when the two squares share a rank, file, or diagonal.
fn ray_between_inclusive(king: Square, target: Square) -> u64 {
    let (kr, kf) = (king.rank() as i8, king.file() as i8);
    let (tr, tf) = (target.rank() as i8, target.file() as i8);
    let dr = (tr - kr).signum();
    let df = (tf - kf).signum();
    let mut mask = 0u64;
    let mut r = kr + dr;
    let mut f = kf + df;
    while r != tr || f != tf {
        mask |= Square::new(f as u8, r as u8).bit();
        r += dr;
        f += df;
    }
    mask | target.bit()
}

/// A king destination is safe if, with the king itself removed from the
/// board (so a slider's ray doesn't stop short at the square it's vacating),
/// no enemy piece attacks it.
fn king_destination_is_safe(pos: &Position, dest: Square, tables: &MagicTables) -> bool {
    let occ = pos.occupied() & !pos.own_king.bit();
    let enemy = pos.enemy_pieces;
    if king_attacks(dest.index()) & enemy & pos.enemy_king.bit() != 0 {
        return false;
    }
    if rook_attacks(dest.index(), occ, tables) & enemy & pos.rook_queens != 0 {
        return false;
    }
    if bishop_attacks(dest.index(), occ, tables) & enemy & pos.bishop_queens != 0 {
        return false;
    }
    if knight_attacks(dest.index()) & enemy & pos.knights() != 0 {
        return false;
    }
    if own_pawn_attacks(dest.index()) & enemy & pos.pawns() != 0 {
        return false;
    }
    true
}

/// Applies `mv` and checks whether the mover's own king is still attacked
/// afterward — used only where a static ray test is awkward (en passant's
/// discovered-check case).
fn leaves_own_king_in_check(pos: &Position, mv: Move, tables: &MagicTables) -> bool {
    let (next, _) = apply(pos, mv);
    let mut unflipped = next;
    unflipped.mirror();
    is_in_check(&unflipped, tables)
}

struct CheckState {
    count: u32,
    /// Squares a non-king move must land on to resolve a single check:
    /// the checker's square, plus any blocking squares if it's a slider.
    evasion_mask: u64,
}

fn check_state(pos: &Position, tables: &MagicTables) -> CheckState {
    let checkers_bb = checkers(pos, tables);
    let count = checkers_bb.count_ones();
    let evasion_mask = if count == 1 {
        let checker_idx = checkers_bb.trailing_zeros() as u8;
        let checker_sq = Square::from_index(checker_idx);
        let bit = checker_sq.bit();
        if pos.rook_queens & bit != 0 || pos.bishop_queens & bit != 0 {
            ray_between_inclusive(pos.own_king, checker_sq)
        } else {
            bit
        }
    } else {
        0
    };
    CheckState { count, evasion_mask }
}

fn is_legal(pos: &Position, mv: Move, tables: &MagicTables, pins: &PinSet, check: &CheckState) -> bool {
    if mv.piece == Piece::King {
        return if mv.is_castling() {
            castling_transit_is_safe(pos, mv, tables)
        } else {
            king_destination_is_safe(pos, mv.to, tables)
        };
    }

    if check.count >= 2 {
        return false;
    }

    if mv.is_en_passant() {
        return !leaves_own_king_in_check(pos, mv, tables);
    }

    if check.count == 1 && check.evasion_mask & mv.to.bit() == 0 {
        return false;
    }

    if let Some(ray) = pins.ray_for(mv.from) {
        return ray & mv.to.bit() != 0;
    }

    true
}

/// Generates fully legal moves into `moves`, using `scratch` as pseudo-legal
/// working storage.
pub fn generate_legal(pos: &Position, tables: &MagicTables, moves: &mut impl MoveBuffer, scratch: &mut impl MoveBuffer) {
    scratch.clear();
    generate_pseudo_legal(pos, tables, scratch);
    moves.clear();

    let pins = compute_pins(pos);
    let check = check_state(pos, tables);

    for mv in scratch.iter().copied() {
        if is_legal(pos, mv, tables, &pins, &check) {
            moves.push(mv);
        }
    }
}

/// Whether a single pseudo-legal move is legal, without generating the rest.
/// More expensive per-call than `generate_legal` when checking many moves
/// from the same position (it recomputes pins/check state every time); used
/// by the UCI `position ... moves ...` parser, which only checks a handful.
pub fn is_legal_move(pos: &Position, mv: Move, tables: &MagicTables) -> bool {
    let pins = compute_pins(pos);
    let check = check_state(pos, tables);
    is_legal(pos, mv, tables, &pins, &check)
}
