use crate::moves::types::Move;
use crate::search::accumulator::{AccumulatorStack, MAX_PLY};
use crate::search::repetition::RepetitionHistory;

/// Per-search scratch that lives alongside the `Position` tree without being
/// part of it (§9 "Ownership of accumulators and repetition history"):
/// killer/history move-ordering tables, the evaluator's accumulator stack,
/// and the repetition-detection history. One `SearchContext` persists across
/// an entire `go`; it's cleared on `ucinewgame`, not per node.
pub struct SearchContext {
    pub killer_moves: Vec<[Option<Move>; 2]>,
    pub history: [[i32; 64]; 64],
    pub accumulators: AccumulatorStack,
    pub repetition: RepetitionHistory,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchContext {
    pub fn new() -> Self {
        Self {
            killer_moves: vec![[None; 2]; MAX_PLY],
            history: [[0; 64]; 64],
            accumulators: AccumulatorStack::new(),
            repetition: RepetitionHistory::new(),
        }
    }

    /// Clears move-ordering heuristics and the repetition history, but
    /// leaves the accumulator stack's capacity intact (it's reseeded per
    /// root via `AccumulatorStack::init_root`).
    pub fn new_game(&mut self) {
        self.killer_moves = vec![[None; 2]; MAX_PLY];
        self.history = [[0; 64]; 64];
        self.repetition.clear();
    }

    pub fn update_killer(&mut self, ply: usize, mv: Move) {
        if self.killer_moves[ply][0] != Some(mv) {
            self.killer_moves[ply][1] = self.killer_moves[ply][0];
            self.killer_moves[ply][0] = Some(mv);
        }
    }

    pub fn update_history(&mut self, mv: Move, depth: i32) {
        let bonus = (depth * depth).min(400);
        self.history[mv.from.index() as usize][mv.to.index() as usize] += bonus;
    }
}
