//! Game-outcome classification (§8 SUPPLEMENT): draw detection beyond the
//! search's own `DRAW_SCORE` shortcut, plus checkmate/stalemate. Lives
//! outside `board` so `Position` never needs to import move generation
//! (mirrors the teacher's own free-function placement, "prevents board →
//! status imports").
//!
//! Threefold/fivefold repetition needs the search-owned `RepetitionHistory`
//! (§9: repetition tracking does not live on `Position`), so every draw
//! check here takes it as an explicit parameter rather than reading it off
//! the position.

use crate::board::Position;
use crate::moves::legality::generate_legal;
use crate::moves::magic::MagicTables;
use crate::moves::square_control::is_in_check;
use crate::search::repetition::RepetitionHistory;
use arrayvec::ArrayVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    DrawFivefold,
    DrawSeventyFiveMove,
    DrawThreefold,
    DrawFiftyMove,
    DrawDeadPosition,
    Stalemate,
    Checkmate,
}

pub fn is_draw_by_threefold(history: &RepetitionHistory, current_key: u64) -> bool {
    history.is_threefold(current_key)
}

pub fn is_fivefold(history: &RepetitionHistory, current_key: u64) -> bool {
    history.count_repetitions(current_key) >= 4
}

pub fn is_draw_by_fifty_move(pos: &Position) -> bool {
    pos.halfmove_clock >= 100
}

pub fn is_seventyfive_move(pos: &Position) -> bool {
    pos.halfmove_clock >= 150
}

/// Square color (light/dark) parity: `(file + rank) % 2`. Bishops confined
/// to one color can never deliver checkmate together (§8: "K+B vs K+B when
/// all bishops share a square color").
#[inline]
fn is_light_square(bit: u64) -> bool {
    let idx = bit.trailing_zeros();
    ((idx / 8) + (idx % 8)) % 2 == 0
}

/// True when neither side holds enough material to force checkmate: K-vs-K,
/// K+N-vs-K, K+B-vs-K, K+B-vs-K+B with same-colored bishops (§8, the literal
/// list), plus K+N+N-vs-K (two knights alone cannot force mate either, a
/// well-known fifth case the literal list omits but does not contradict).
/// Any pawn, rook, or queen on the board means mate remains reachable; so
/// does any other two-minor split (opposite-colored bishops, or a knight
/// paired with anything, on opposite sides).
pub fn is_insufficient_material(pos: &Position) -> bool {
    let pawns_rooks_queens = pos.pawns() | pos.rooks() | pos.queens();
    if pawns_rooks_queens != 0 {
        return false;
    }

    let own_bishops_bb = pos.bishops() & pos.own_pieces;
    let enemy_bishops_bb = pos.bishops() & pos.enemy_pieces;
    let own_knights = (pos.knights() & pos.own_pieces).count_ones();
    let enemy_knights = (pos.knights() & pos.enemy_pieces).count_ones();
    let own_bishops = own_bishops_bb.count_ones();
    let enemy_bishops = enemy_bishops_bb.count_ones();

    let own_minors = own_knights + own_bishops;
    let enemy_minors = enemy_knights + enemy_bishops;
    let total_minors = own_minors + enemy_minors;

    match total_minors {
        0 => true,
        1 => true,
        2 => {
            if own_knights == 2 || enemy_knights == 2 {
                return true;
            }
            if own_bishops == 1 && enemy_bishops == 1 {
                return is_light_square(own_bishops_bb) == is_light_square(enemy_bishops_bb);
            }
            false
        }
        _ => false,
    }
}

/// Full classification, checked in FIDE priority order: automatic draws
/// first (fivefold, 75-move), then dead position, then the claimable draws
/// (threefold, 50-move), then checkmate/stalemate/in-play.
pub fn position_status(pos: &Position, tables: &MagicTables, history: &RepetitionHistory) -> GameStatus {
    if is_fivefold(history, pos.zobrist) {
        return GameStatus::DrawFivefold;
    }
    if is_seventyfive_move(pos) {
        return GameStatus::DrawSeventyFiveMove;
    }
    if is_insufficient_material(pos) {
        return GameStatus::DrawDeadPosition;
    }
    if is_draw_by_threefold(history, pos.zobrist) {
        return GameStatus::DrawThreefold;
    }
    if is_draw_by_fifty_move(pos) {
        return GameStatus::DrawFiftyMove;
    }

    let mut legal: ArrayVec<crate::moves::types::Move, 256> = ArrayVec::new();
    let mut scratch: ArrayVec<crate::moves::types::Move, 256> = ArrayVec::new();
    generate_legal(pos, tables, &mut legal, &mut scratch);

    if legal.is_empty() {
        if is_in_check(pos, tables) {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    } else {
        GameStatus::InPlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn bare_kings_are_insufficient_material() {
        let pos = Position::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_insufficient_material(&pos));
    }

    #[test]
    fn king_and_single_minor_is_insufficient_material() {
        let pos = Position::from_str("4k3/8/8/8/8/8/8/3NK3 w - - 0 1").unwrap();
        assert!(is_insufficient_material(&pos));
    }

    #[test]
    fn king_and_two_knights_is_insufficient_material() {
        let pos = Position::from_str("4k3/8/8/8/8/8/8/2N1KN2 w - - 0 1").unwrap();
        assert!(is_insufficient_material(&pos));
    }

    #[test]
    fn bishop_pair_is_sufficient_material() {
        let pos = Position::from_str("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1").unwrap();
        assert!(!is_insufficient_material(&pos));
    }

    #[test]
    fn opposite_bishops_one_per_side_is_sufficient_material() {
        let pos = Position::from_str("2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(!is_insufficient_material(&pos));
    }

    #[test]
    fn same_color_bishops_one_per_side_is_insufficient_material() {
        let pos = Position::from_str("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(is_insufficient_material(&pos));
    }

    #[test]
    fn lone_pawn_is_sufficient_material() {
        let pos = Position::from_str("4k3/8/8/8/8/8/P7/4K3 w - - 0 1").unwrap();
        assert!(!is_insufficient_material(&pos));
    }

    #[test]
    fn fifty_move_rule_triggers_at_100_halfmoves() {
        let mut pos = Position::new_game();
        pos.halfmove_clock = 100;
        assert!(is_draw_by_fifty_move(&pos));
        pos.halfmove_clock = 99;
        assert!(!is_draw_by_fifty_move(&pos));
    }

    #[test]
    fn threefold_status_matches_repetition_history() {
        // The last entry always stands in for the position being checked,
        // so three total occurrences (the check plus two earlier repeats)
        // needs five same-key pushes at this stride.
        let mut history = RepetitionHistory::new();
        let key = 0x42;
        for _ in 0..5 {
            history.push(key, false);
        }
        assert!(is_draw_by_threefold(&history, key));
    }
}
