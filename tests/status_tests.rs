//! Full game-status classification (§8 SUPPLEMENT): `position_status` ties
//! together draw detection and legal move generation, so it is exercised
//! here at the integration level against FEN-named positions. The individual
//! draw predicates already have thorough unit coverage inline in
//! `status.rs`; this file covers the priority ordering between them and the
//! checkmate/stalemate terminal cases that require a real legal-move scan.

use std::str::FromStr;

use vantage::board::Position;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::search::repetition::RepetitionHistory;
use vantage::status::{position_status, GameStatus};

fn status_of(fen: &str) -> GameStatus {
    let tables = load_magic_tables();
    let pos = Position::from_str(fen).unwrap();
    let mut history = RepetitionHistory::new();
    history.push(pos.zobrist, false);
    position_status(&pos, &tables, &history)
}

#[test]
fn startpos_is_in_play() {
    assert_eq!(status_of("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"), GameStatus::InPlay);
}

#[test]
fn scholars_mate_is_checkmate() {
    let fen = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1";
    assert_eq!(status_of(fen), GameStatus::Checkmate);
}

#[test]
fn classic_king_and_queen_stalemate_is_stalemate() {
    // Black king boxed into a8 with no legal move and not in check.
    let fen = "k7/2Q5/1K6/8/8/8/8/8 b - - 0 1";
    assert_eq!(status_of(fen), GameStatus::Stalemate);
}

#[test]
fn bare_kings_is_a_dead_position_draw() {
    assert_eq!(status_of("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), GameStatus::DrawDeadPosition);
}

#[test]
fn dead_position_outranks_the_fifty_move_counter() {
    // A K-vs-K position with a high halfmove clock should still report as a
    // dead position rather than waiting for the fifty-move threshold —
    // `position_status` checks material before the move-count draws.
    let tables = load_magic_tables();
    let mut pos = Position::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    pos.halfmove_clock = 40;
    let mut history = RepetitionHistory::new();
    history.push(pos.zobrist, false);
    assert_eq!(position_status(&pos, &tables, &history), GameStatus::DrawDeadPosition);
}

#[test]
fn fifty_move_counter_reports_once_sufficient_material_remains() {
    let tables = load_magic_tables();
    let mut pos = Position::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    pos.halfmove_clock = 100;
    let mut history = RepetitionHistory::new();
    history.push(pos.zobrist, false);
    assert_eq!(position_status(&pos, &tables, &history), GameStatus::DrawFiftyMove);
}

#[test]
fn seventyfive_move_rule_is_automatic_and_outranks_fifty_move() {
    let tables = load_magic_tables();
    let mut pos = Position::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    pos.halfmove_clock = 150;
    let mut history = RepetitionHistory::new();
    history.push(pos.zobrist, false);
    assert_eq!(position_status(&pos, &tables, &history), GameStatus::DrawSeventyFiveMove);
}

#[test]
fn threefold_repetition_is_reported_once_the_position_recurs() {
    // `RepetitionHistory`'s last entry always stands in for the position
    // being evaluated, so three total occurrences (the one being checked
    // plus two earlier repeats) takes five pushes at this stride.
    let tables = load_magic_tables();
    let pos = Position::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    let mut history = RepetitionHistory::new();
    for _ in 0..5 {
        history.push(pos.zobrist, false);
    }
    assert_eq!(position_status(&pos, &tables, &history), GameStatus::DrawThreefold);
}

#[test]
fn fivefold_repetition_outranks_threefold() {
    // Five total occurrences takes nine pushes at the same stride.
    let tables = load_magic_tables();
    let pos = Position::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    let mut history = RepetitionHistory::new();
    for _ in 0..9 {
        history.push(pos.zobrist, false);
    }
    assert_eq!(position_status(&pos, &tables, &history), GameStatus::DrawFivefold);
}
