//! Iterative-deepening driver (§4.8, §5 "Ordering guarantees"): each
//! completed depth must improve on or replace the previous iteration's best
//! move, and a stop requested mid-iteration must fall back to the last
//! completed one rather than an in-progress result.

use std::str::FromStr;
use vantage::board::Position;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::search::context::SearchContext;
use vantage::search::search::{search, StopFlag, DRAW_SCORE, MATE_THRESHOLD};
use vantage::search::tt::TranspositionTable;

fn fresh() -> (SearchContext, TranspositionTable) {
    (SearchContext::new(), TranspositionTable::new(4))
}

#[test]
fn startpos_depth_1_returns_a_pawn_or_knight_developing_move() {
    // Spec §8 end-to-end scenario 3: depth 1 from startpos returns a move
    // whose `from` rank is 1 or 2, scored within [-100, 100] cp.
    let tables = load_magic_tables();
    let pos = Position::new_game();
    let (mut ctx, mut tt) = fresh();
    let stop = StopFlag::new();

    let (score, mv) = search(&pos, &tables, &mut ctx, &mut tt, 1, &stop);
    let mv = mv.expect("depth 1 must return a move");
    assert!(mv.from.rank() <= 1, "expected a rank 1/2 origin, got {}", mv.from);
    assert!((-100..=100).contains(&score), "expected a small cp score, got {score}");
}

#[test]
fn deeper_iteration_still_returns_a_move() {
    let tables = load_magic_tables();
    let pos = Position::new_game();
    let (mut ctx, mut tt) = fresh();
    let stop = StopFlag::new();

    let (_, shallow_move) = search(&pos, &tables, &mut ctx, &mut tt, 2, &stop);
    let (_, deep_move) = search(&pos, &tables, &mut ctx, &mut tt, 4, &stop);
    assert!(shallow_move.is_some());
    assert!(deep_move.is_some());
}

#[test]
fn stop_flag_requested_before_search_yields_no_completed_iteration() {
    let tables = load_magic_tables();
    let pos = Position::new_game();
    let (mut ctx, mut tt) = fresh();
    let stop = StopFlag::new();
    stop.request_stop();

    let (score, mv) = search(&pos, &tables, &mut ctx, &mut tt, 6, &stop);
    assert_eq!(score, DRAW_SCORE);
    assert!(mv.is_none());
}

#[test]
fn mate_in_one_is_found_and_scored_as_a_mate() {
    let tables = load_magic_tables();
    let pos = Position::from_str("3k4/7Q/3K4/8/8/8/8/8 w - - 0 1").unwrap();
    let (mut ctx, mut tt) = fresh();
    let stop = StopFlag::new();

    let (score, mv) = search(&pos, &tables, &mut ctx, &mut tt, 4, &stop);
    assert!(score.abs() >= MATE_THRESHOLD);
    assert_eq!(mv.unwrap().to_uci(), "h7d7");
}
