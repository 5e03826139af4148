//! Iterative-deepening principal-variation search (§4.8): negamax alpha-beta
//! with quiescence, a transposition table, MVV/LVA + TT-first move ordering,
//! and four selective-pruning techniques (static-null/reverse-futility,
//! null-move, futility, late-move pruning). `Position` carries no undo
//! state (`board::Position`), so every recursive step clones the child
//! produced by `moves::execute::apply` rather than making/unmaking a move in
//! place — the same pattern `moves::perft` already uses.
//!
//! Cancellation is a single polled flag (§5: "the core exposes only a
//! polled `should_stop()` flag read between nodes"), not an internal
//! wall-clock timer — wall-clock budgeting is the UCI adapter's job, not the
//! core's. A node that observes the flag set aborts immediately by
//! returning `None`; the iterative-deepening driver discards whatever
//! partial iteration produced that `None` and reports the last completed
//! depth's move, per §5's ordering guarantee.

use crate::board::Position;
use crate::moves::execute::{apply, apply_null_move, DirtyPieces};
use crate::moves::magic::MagicTables;
use crate::moves::square_control::is_in_check;
use crate::moves::types::Move;
use crate::search::picker::MovePicker;
use crate::search::see::static_exchange_eval;
use crate::search::tt::{NodeType, TranspositionTable};
use crate::search::{context::SearchContext, eval};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sentinel for "forced mate found"; real mate scores are offset by the
/// number of plies to deliver it so that closer mates outscore farther ones
/// (§4.8 "Scoring conventions").
pub const MATE_SCORE: i32 = 31000;
/// Any score at or beyond this magnitude is a mate score, not a positional
/// one — used to gate pruning that assumes ordinary centipawn scores.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;
/// Draws score exactly zero (§4.8 step 3); not a contempt-adjustable value.
pub const DRAW_SCORE: i32 = 0;

const RFP_MARGIN_PER_DEPTH: i32 = 120;
const NULL_MOVE_REDUCTION: i32 = 2;
const NULL_MOVE_MIN_DEPTH: i32 = 3;
/// Margins grow linearly with depth (§4.8 step 7, literal example table).
const FUTILITY_MARGIN: [i32; 9] = [0, 100, 160, 220, 280, 340, 400, 460, 520];
const FUTILITY_MAX_DEPTH: i32 = 8;
/// Indexed by depth (§4.8 step 8's late-move-pruning bullet, literal table).
const LMP_MOVE_COUNT: [usize; 4] = [0, 8, 12, 24];
const LMP_MAX_DEPTH: i32 = 3;

/// Write-once-from-the-controller, polled-from-the-searcher cancellation
/// flag (§5). No timers live inside the core; a controller wanting
/// wall-clock control sets this from its own thread or after `go` returns.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn should_stop(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Converts a mate score from "plies to mate counted from the search root"
/// (what `alpha_beta`/`quiescence` compute and compare during one search) to
/// "plies to mate counted from this node" before it enters the transposition
/// table, so a later probe at a different ply — reached via a different path
/// — still recovers a mate distance relative to *that* lookup, not the
/// distance that happened to hold where the entry was written. Ordinary
/// scores pass through unchanged.
#[inline]
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of `score_to_tt`: rebases a stored mate distance back onto the
/// ply of the node doing the probing.
#[inline]
fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

fn is_draw(pos: &Position, ctx: &SearchContext) -> bool {
    crate::status::is_draw_by_fifty_move(pos)
        || crate::status::is_insufficient_material(pos)
        || crate::status::is_draw_by_threefold(&ctx.repetition, pos.zobrist)
}

/// Quiescence search (§4.8 "Quiescence search"): stand-pat cutoff, then
/// captures only, SEE-filtered so a losing capture is never even recursed
/// into (see `search::see`, DESIGN.md Open Question O3). No depth cap
/// beyond the natural shrinking of the capture set.
fn quiescence(pos: &Position, tables: &MagicTables, ctx: &mut SearchContext, ply: usize, mut alpha: i32, beta: i32, stop: &StopFlag) -> Option<i32> {
    if stop.should_stop() {
        return None;
    }

    let accumulator = ctx.accumulators.get(ply);
    let stand_pat = eval::static_eval(pos, tables, accumulator, alpha, beta);
    if stand_pat >= beta {
        return Some(beta);
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut picker = MovePicker::new(None, [None, None], true);
    while let Some(mv) = picker.next(pos, tables, &ctx.history) {
        if !static_exchange_eval(pos, mv, 0, tables) {
            continue;
        }

        let (child, dirty) = apply(pos, mv);
        ctx.accumulators.push_from_dirty(ply + 1, &dirty);
        let score = -quiescence(&child, tables, ctx, ply + 1, -beta, -alpha, stop)?;

        if score >= beta {
            return Some(beta);
        }
        if score > alpha {
            alpha = score;
        }
    }

    Some(alpha)
}

/// One PVS node (§4.8 steps 1-9). `allow_null` is false only inside the
/// recursive call a null-move probe itself makes, so the same side never
/// tries two null moves back to back.
#[allow(clippy::too_many_arguments)]
fn alpha_beta(
    pos: &Position,
    tables: &MagicTables,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    depth: i32,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    allow_null: bool,
    stop: &StopFlag,
) -> Option<(i32, Option<Move>)> {
    if stop.should_stop() {
        return None;
    }
    if depth <= 0 {
        return Some((quiescence(pos, tables, ctx, ply, alpha, beta, stop)?, None));
    }

    let is_pv = beta - alpha > 1;

    if ply > 0 && is_draw(pos, ctx) {
        return Some((DRAW_SCORE, None));
    }

    let in_check = is_in_check(pos, tables);

    let tt_probe = if ply > 0 {
        tt.probe(pos.zobrist, depth as u8, alpha, beta)
    } else {
        crate::search::tt::TTProbe { best_move: None, cutoff: None }
    };
    if let Some(cutoff) = tt_probe.cutoff {
        return Some((score_from_tt(cutoff, ply as i32), tt_probe.best_move));
    }

    let accumulator = ctx.accumulators.get(ply);
    let static_eval = if in_check { 0 } else { eval::static_eval(pos, tables, accumulator, alpha, beta) };

    if !in_check && !is_pv && beta.abs() < MATE_THRESHOLD && static_eval - RFP_MARGIN_PER_DEPTH * depth >= beta {
        return Some((beta, None));
    }

    if allow_null && !in_check && !is_pv && depth >= NULL_MOVE_MIN_DEPTH && pos.own_has_non_pawn_material() {
        let child = apply_null_move(pos);
        ctx.accumulators.push_from_dirty(ply + 1, &DirtyPieces::new());
        let (score, _) = alpha_beta(&child, tables, ctx, tt, depth - NULL_MOVE_REDUCTION - 1, ply + 1, -beta, -beta + 1, false, stop)?;
        let score = -score;
        if score >= beta && score.abs() < MATE_THRESHOLD {
            return Some((beta, None));
        }
    }

    let futility_prune = !is_pv
        && !in_check
        && depth <= FUTILITY_MAX_DEPTH
        && alpha < MATE_THRESHOLD
        && static_eval + FUTILITY_MARGIN[depth as usize] <= alpha;

    let mut best_score = -MATE_SCORE;
    let mut best_move: Option<Move> = None;
    let mut node_type = NodeType::UpperBound;
    let mut moves_tried = 0usize;

    let mut picker = MovePicker::new(tt_probe.best_move, ctx.killer_moves[ply], false);
    while let Some(mv) = picker.next(pos, tables, &ctx.history) {
        moves_tried += 1;

        let (child, dirty) = apply(pos, mv);
        let gives_check = is_in_check(&child, tables);
        let is_tactical = mv.is_capture() || mv.is_promotion() || gives_check;

        if depth <= LMP_MAX_DEPTH && !is_pv && !in_check && !is_tactical && moves_tried > LMP_MOVE_COUNT[depth as usize] {
            continue;
        }
        if futility_prune && moves_tried > 1 && !is_tactical {
            continue;
        }

        ctx.accumulators.push_from_dirty(ply + 1, &dirty);
        ctx.repetition.push(child.zobrist, child.halfmove_clock == 0);

        let score = if moves_tried == 1 {
            -alpha_beta(&child, tables, ctx, tt, depth - 1, ply + 1, -beta, -alpha, true, stop)?.0
        } else {
            let zero_window = -alpha_beta(&child, tables, ctx, tt, depth - 1, ply + 1, -alpha - 1, -alpha, true, stop)?.0;
            if zero_window > alpha && zero_window < beta {
                -alpha_beta(&child, tables, ctx, tt, depth - 1, ply + 1, -beta, -alpha, true, stop)?.0
            } else {
                zero_window
            }
        };

        ctx.repetition.pop();

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if score > alpha {
            alpha = score;
            node_type = NodeType::Exact;
        }
        if alpha >= beta {
            if !mv.is_capture() {
                ctx.update_killer(ply, mv);
                ctx.update_history(mv, depth);
            }
            node_type = NodeType::LowerBound;
            break;
        }
    }

    if moves_tried == 0 {
        let score = if in_check { -(MATE_SCORE - ply as i32) } else { 0 };
        return Some((score, None));
    }

    tt.store(pos.zobrist, best_move, score_to_tt(best_score, ply as i32), depth as u8, node_type);
    Some((best_score, best_move))
}

/// Iterative deepening from depth 1 to `max_depth` (§4.8, §6 `go [depth N]`).
/// Emits `info depth D score cp S` after every completed iteration; returns
/// the best move of the deepest one that finished before `stop` tripped.
pub fn search(pos: &Position, tables: &MagicTables, ctx: &mut SearchContext, tt: &mut TranspositionTable, max_depth: i32, stop: &StopFlag) -> (i32, Option<Move>) {
    ctx.accumulators.init_root(pos);

    let mut best_score = DRAW_SCORE;
    let mut best_move = None;

    for depth in 1..=max_depth.max(1) {
        let Some((score, mv)) = alpha_beta(pos, tables, ctx, tt, depth, 0, -MATE_SCORE, MATE_SCORE, true, stop) else {
            break;
        };

        best_score = score;
        if mv.is_some() {
            best_move = mv;
        }
        crate::output::engine_println!("info depth {depth} score cp {score}");

        if stop.should_stop() {
            break;
        }
    }

    (best_score, best_move)
}
