//! Perft (performance test / move-path counter), §8's primary correctness
//! oracle: known node counts at fixed depths from standard test positions
//! catch movegen/legality bugs no single unit test would. `Position` being
//! `Copy` means there's no make/unmake here — each recursive call applies a
//! move into a fresh child and recurses on that, keeping the parent around
//! for the next sibling instead of undoing anything.

use crate::board::Position;
use crate::moves::execute::apply;
use crate::moves::legality::generate_legal;
use crate::moves::magic::MagicTables;
use crate::moves::square_control::is_in_check;
use crate::moves::types::Move;
use tracing::{debug, instrument};

const MAX_LOG_DEPTH: u32 = 3;
const MAX_PERFT_DEPTH: usize = 20;

pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub ep_captures: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn zero() -> Self {
        Self {
            nodes: 0,
            captures: 0,
            ep_captures: 0,
            castles: 0,
            promotions: 0,
            checks: 0,
            checkmates: 0,
        }
    }

    pub fn add(&mut self, o: &PerftCounters) {
        self.nodes += o.nodes;
        self.captures += o.captures;
        self.ep_captures += o.ep_captures;
        self.castles += o.castles;
        self.promotions += o.promotions;
        self.checks += o.checks;
        self.checkmates += o.checkmates;
    }
}

fn create_move_buffer_array() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(64))
}

fn create_pseudo_buffer_array() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(256))
}

fn perft_recursive(
    pos: &Position,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    move_buffers: &mut [Vec<Move>],
    pseudo_buffers: &mut [Vec<Move>],
) -> u64 {
    if depth == 0 {
        return 1;
    }

    {
        let (moves, pseudo) = buffers_at(move_buffers, pseudo_buffers, ply);
        generate_legal(pos, tables, moves, pseudo);
    }

    let move_count = move_buffers[ply].len();
    let mut node_count = 0;
    for i in 0..move_count {
        let mv = move_buffers[ply][i];
        let (child, _) = apply(pos, mv);
        node_count += perft_recursive(&child, tables, depth - 1, ply + 1, move_buffers, pseudo_buffers);
    }
    node_count
}

#[inline]
fn buffers_at<'a>(moves: &'a mut [Vec<Move>], pseudo: &'a mut [Vec<Move>], ply: usize) -> (&'a mut Vec<Move>, &'a mut Vec<Move>) {
    (&mut moves[ply], &mut pseudo[ply])
}

#[instrument(skip(pos, tables), fields(depth))]
pub fn perft(pos: &Position, tables: &MagicTables, depth: u32) -> u64 {
    assert!(depth as usize <= MAX_PERFT_DEPTH, "depth {depth} exceeds MAX_PERFT_DEPTH {MAX_PERFT_DEPTH}");
    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();
    perft_recursive(pos, tables, depth, 0, &mut move_buffers, &mut pseudo_buffers)
}

#[instrument(skip(pos, tables), fields(depth))]
pub fn perft_divide(pos: &Position, tables: &MagicTables, depth: u32) -> u64 {
    assert!(depth as usize <= MAX_PERFT_DEPTH, "depth {depth} exceeds MAX_PERFT_DEPTH {MAX_PERFT_DEPTH}");
    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();

    {
        let (moves, pseudo) = buffers_at(&mut move_buffers, &mut pseudo_buffers, 0);
        generate_legal(pos, tables, moves, pseudo);
        if depth <= MAX_LOG_DEPTH {
            debug!(depth, moves = moves.len(), "divide: root legal moves");
        }
    }

    let mut total = 0;
    let move_count = move_buffers[0].len();
    for i in 0..move_count {
        let mv = move_buffers[0][i];
        let (child, _) = apply(pos, mv);
        let count = if depth == 1 {
            1
        } else {
            perft_recursive(&child, tables, depth - 1, 1, &mut move_buffers, &mut pseudo_buffers)
        };
        if depth <= MAX_LOG_DEPTH {
            debug!(%mv, nodes = count, "divide: root child total");
        }
        println!("{}: {}", mv, count);
        total += count;
    }

    debug!(depth, total, "divide: total");
    println!("Total: {}", total);
    total
}

fn perft_count_recursive(
    pos: &Position,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    out: &mut PerftCounters,
    move_buffers: &mut [Vec<Move>],
    pseudo_buffers: &mut [Vec<Move>],
) {
    if depth == 0 {
        out.nodes += 1;
        let side_in_check = is_in_check(pos, tables);
        if side_in_check {
            out.checks += 1;
        }
        let (moves, pseudo) = buffers_at(move_buffers, pseudo_buffers, ply);
        generate_legal(pos, tables, moves, pseudo);
        if moves.is_empty() && side_in_check {
            out.checkmates += 1;
        }
        return;
    }

    {
        let (moves, pseudo) = buffers_at(move_buffers, pseudo_buffers, ply);
        generate_legal(pos, tables, moves, pseudo);
    }

    let move_count = move_buffers[ply].len();
    for i in 0..move_count {
        let mv = move_buffers[ply][i];
        if mv.is_capture() {
            out.captures += 1;
            if mv.is_en_passant() {
                out.ep_captures += 1;
            }
        }
        if mv.is_castling() {
            out.castles += 1;
        }
        if mv.promotion.is_some() {
            out.promotions += 1;
        }

        let (child, _) = apply(pos, mv);

        #[cfg(debug_assertions)]
        child.assert_zobrist();

        perft_count_recursive(&child, tables, depth - 1, ply + 1, out, move_buffers, pseudo_buffers);
    }
}

pub fn perft_count_with_breakdown(pos: &Position, tables: &MagicTables, depth: u32, out: &mut PerftCounters) {
    assert!(depth as usize <= MAX_PERFT_DEPTH, "depth {depth} exceeds MAX_PERFT_DEPTH {MAX_PERFT_DEPTH}");
    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();
    perft_count_recursive(pos, tables, depth, 0, out, &mut move_buffers, &mut pseudo_buffers);
}

pub fn perft_divide_with_breakdown(pos: &Position, tables: &MagicTables, depth: u32) -> Vec<(Move, PerftCounters)> {
    assert!(depth as usize <= MAX_PERFT_DEPTH, "depth {depth} exceeds MAX_PERFT_DEPTH {MAX_PERFT_DEPTH}");
    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();

    {
        let (moves, pseudo) = buffers_at(&mut move_buffers, &mut pseudo_buffers, 0);
        generate_legal(pos, tables, moves, pseudo);
    }

    let move_count = move_buffers[0].len();
    let mut out = Vec::with_capacity(move_count);
    for i in 0..move_count {
        let mv = move_buffers[0][i];
        let (child, _) = apply(pos, mv);
        let mut pc = PerftCounters::zero();
        if depth > 1 {
            perft_count_recursive(&child, tables, depth - 1, 1, &mut pc, &mut move_buffers, &mut pseudo_buffers);
        } else {
            pc.nodes = 1;
        }
        out.push((mv, pc));
    }
    out
}
