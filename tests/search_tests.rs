//! Search wiring sanity checks (§4.8): depth-0 behavior collapses to static
//! eval, stalemate scores exactly zero at any depth, and a one-ply search
//! prefers a free capture.

use std::str::FromStr;
use vantage::board::Position;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::search::context::SearchContext;
use vantage::search::eval::static_eval_from_scratch;
use vantage::search::search::{search, StopFlag, DRAW_SCORE};
use vantage::search::tt::TranspositionTable;

const INF: i32 = 32_000;

fn fresh() -> (SearchContext, TranspositionTable) {
    (SearchContext::new(), TranspositionTable::new(4))
}

fn search_position(fen: &str, depth: i32) -> i32 {
    let pos = Position::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let (mut ctx, mut tt) = fresh();
    let stop = StopFlag::new();
    let (score, _) = search(&pos, &tables, &mut ctx, &mut tt, depth, &stop);
    score
}

#[test]
fn depth0_equals_static_eval_when_up_a_pawn() {
    let pos = Position::from_str("k7/8/8/8/4P3/8/8/6K1 w - - 0 1").unwrap();
    let tables = load_magic_tables();
    let (mut ctx, mut tt) = fresh();
    let stop = StopFlag::new();

    let (score, _) = search(&pos, &tables, &mut ctx, &mut tt, 0, &stop);
    assert_eq!(score, static_eval_from_scratch(&pos, &tables, -INF, INF));
    assert!(score >= 70, "a clear extra pawn should score at least 70cp, got {score}");
}

#[test]
fn stalemate_scores_exactly_zero_at_any_depth() {
    let fen = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
    for depth in 1..=3 {
        assert_eq!(search_position(fen, depth), DRAW_SCORE, "stalemate at depth {depth}");
    }
}

#[test]
fn one_ply_search_finds_a_free_pawn_capture() {
    let pos = Position::from_str("k7/8/8/3p4/4P3/8/8/6K1 w - - 0 1").unwrap();
    let tables = load_magic_tables();
    let (mut ctx, mut tt) = fresh();
    let stop = StopFlag::new();

    let (score, best_move) = search(&pos, &tables, &mut ctx, &mut tt, 1, &stop);
    assert!(best_move.is_some());
    assert!(score >= 80, "capturing a free pawn should score at least 80cp, got {score}");
}

#[test]
fn starting_position_is_approximately_equal() {
    let score = search_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 3);
    assert!(score.abs() < 150, "startpos should be near-equal, got {score}");
}

#[test]
fn symmetric_material_stays_close_to_zero_under_deeper_search() {
    // Knight on e6 for the mover, mirrored knight on e3 for the opponent —
    // material and structure are exactly symmetric.
    let fen = "7k/6pp/4N3/8/8/4n3/6PP/7K w - - 0 1";
    let score = search_position(fen, 5);
    assert!(score.abs() <= 50, "symmetric position should score near 0, got {score}");
}
