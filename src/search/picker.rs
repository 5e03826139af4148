//! Staged move picker for lazy move generation and ordering (§4.8
//! SUPPLEMENT). Stages:
//!
//! HashMove -> GenerateCaptures -> GoodCaptures -> Killer1 -> Killer2 ->
//! GenerateQuiets -> Quiets -> BadCaptures -> Done
//!
//! Moves generated by a later stage are skipped if an earlier stage already
//! produced them. If an early move causes a beta cutoff, later stages are
//! never reached, so this only pays for the moves actually tried.

use crate::board::Position;
use crate::moves::legality::is_legal_move;
use crate::moves::magic::MagicTables;
use crate::moves::movegen::{generate_pseudo_legal, generate_pseudo_legal_captures, generate_pseudo_legal_quiets};
use crate::moves::types::Move;
use crate::search::ordering::mvv_lva_score;
use crate::search::see::static_exchange_eval;
use arrayvec::ArrayVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStage {
    HashMove,
    GenerateCaptures,
    GoodCaptures,
    Killer1,
    Killer2,
    GenerateQuiets,
    Quiets,
    BadCaptures,
    Done,
}

pub struct MovePicker {
    stage: PickerStage,

    good_captures: ArrayVec<Move, 64>,
    bad_captures: ArrayVec<Move, 64>,
    quiets: ArrayVec<Move, 256>,

    good_capture_scores: ArrayVec<i32, 64>,
    quiet_scores: ArrayVec<i32, 256>,

    good_cap_idx: usize,
    quiet_idx: usize,
    bad_cap_idx: usize,

    hash_move: Option<Move>,
    killers: [Option<Move>; 2],

    /// Quiescence mode: skip killers and quiets entirely.
    captures_only: bool,
}

impl MovePicker {
    pub fn new(hash_move: Option<Move>, killers: [Option<Move>; 2], captures_only: bool) -> Self {
        Self {
            stage: PickerStage::HashMove,
            good_captures: ArrayVec::new(),
            bad_captures: ArrayVec::new(),
            quiets: ArrayVec::new(),
            good_capture_scores: ArrayVec::new(),
            quiet_scores: ArrayVec::new(),
            good_cap_idx: 0,
            quiet_idx: 0,
            bad_cap_idx: 0,
            hash_move,
            killers,
            captures_only,
        }
    }

    #[inline]
    fn is_hash_move(&self, mv: Move) -> bool {
        match self.hash_move {
            Some(hm) => mv.from == hm.from && mv.to == hm.to && mv.promotion == hm.promotion,
            None => false,
        }
    }

    #[inline]
    fn is_killer(&self, mv: Move) -> bool {
        self.killers.iter().flatten().any(|k| mv.from == k.from && mv.to == k.to && mv.promotion == k.promotion)
    }

    #[inline]
    fn is_duplicate(&self, mv: Move) -> bool {
        self.is_hash_move(mv) || self.is_killer(mv)
    }

    /// Generates captures and splits them into good (SEE >= 0) and bad (SEE
    /// < 0) buckets, scoring the good bucket by MVV/LVA for selection-sort
    /// iteration.
    fn generate_and_classify_captures(&mut self, pos: &Position, tables: &MagicTables) {
        let mut captures: ArrayVec<Move, 128> = ArrayVec::new();
        generate_pseudo_legal_captures(pos, tables, &mut captures);

        for mv in captures {
            if self.is_hash_move(mv) {
                continue;
            }
            let score = mvv_lva_score(mv, pos);
            if static_exchange_eval(pos, mv, 0, tables) {
                self.good_captures.push(mv);
                self.good_capture_scores.push(score);
            } else {
                self.bad_captures.push(mv);
            }
        }
    }

    /// Generates quiets and scores them by history plus a pawn-advancement
    /// bonus. `own` always advances toward higher ranks by construction, so
    /// unlike the teacher's picker this needs no color branch.
    fn generate_quiets(&mut self, pos: &Position, tables: &MagicTables, history: &[[i32; 64]; 64]) {
        generate_pseudo_legal_quiets(pos, tables, &mut self.quiets);

        for mv in &self.quiets {
            let mut score = history[mv.from.index() as usize][mv.to.index() as usize];

            if mv.piece == crate::board::Piece::Pawn {
                let to_rank = mv.to.index() / 8;
                let from_rank = mv.from.index() / 8;
                if to_rank > from_rank {
                    if to_rank == 3 || to_rank == 4 {
                        score += 1000;
                    }
                    if to_rank == 5 || to_rank == 6 {
                        score += 2000;
                    }
                }
            }

            self.quiet_scores.push(score);
        }
    }

    fn pick_best_capture(&mut self) -> Option<Move> {
        if self.good_cap_idx >= self.good_captures.len() {
            return None;
        }
        let mut best_idx = self.good_cap_idx;
        let mut best_score = self.good_capture_scores[best_idx];
        for i in (self.good_cap_idx + 1)..self.good_captures.len() {
            if self.good_capture_scores[i] > best_score {
                best_score = self.good_capture_scores[i];
                best_idx = i;
            }
        }
        self.good_captures.swap(self.good_cap_idx, best_idx);
        self.good_capture_scores.swap(self.good_cap_idx, best_idx);
        let mv = self.good_captures[self.good_cap_idx];
        self.good_cap_idx += 1;
        Some(mv)
    }

    fn pick_best_quiet(&mut self) -> Option<Move> {
        if self.quiet_idx >= self.quiets.len() {
            return None;
        }
        let mut best_idx = self.quiet_idx;
        let mut best_score = self.quiet_scores[best_idx];
        for i in (self.quiet_idx + 1)..self.quiets.len() {
            if self.quiet_scores[i] > best_score {
                best_score = self.quiet_scores[i];
                best_idx = i;
            }
        }
        self.quiets.swap(self.quiet_idx, best_idx);
        self.quiet_scores.swap(self.quiet_idx, best_idx);
        let mv = self.quiets[self.quiet_idx];
        self.quiet_idx += 1;
        Some(mv)
    }

    /// Returns the next legal move, or `None` once every stage is exhausted.
    /// Loop-based, not recursive, regardless of how many stages are skipped.
    pub fn next(&mut self, pos: &Position, tables: &MagicTables, history: &[[i32; 64]; 64]) -> Option<Move> {
        loop {
            match self.stage {
                PickerStage::HashMove => {
                    self.stage = PickerStage::GenerateCaptures;
                    if let Some(hm) = self.hash_move
                        && is_pseudo_legal(pos, hm, tables)
                        && is_legal_move(pos, hm, tables)
                    {
                        return Some(hm);
                    }
                }

                PickerStage::GenerateCaptures => {
                    self.generate_and_classify_captures(pos, tables);
                    self.stage = PickerStage::GoodCaptures;
                }

                PickerStage::GoodCaptures => {
                    while let Some(mv) = self.pick_best_capture() {
                        if self.is_hash_move(mv) {
                            continue;
                        }
                        if is_legal_move(pos, mv, tables) {
                            return Some(mv);
                        }
                    }
                    self.stage = if self.captures_only { PickerStage::BadCaptures } else { PickerStage::Killer1 };
                }

                PickerStage::Killer1 => {
                    self.stage = PickerStage::Killer2;
                    if let Some(k1) = self.killers[0]
                        && !k1.is_capture()
                        && !self.is_hash_move(k1)
                        && is_pseudo_legal(pos, k1, tables)
                        && is_legal_move(pos, k1, tables)
                    {
                        return Some(k1);
                    }
                }

                PickerStage::Killer2 => {
                    self.stage = PickerStage::GenerateQuiets;
                    if let Some(k2) = self.killers[1]
                        && !k2.is_capture()
                        && !self.is_hash_move(k2)
                    {
                        let is_k1 = matches!(self.killers[0], Some(k1) if k2.from == k1.from && k2.to == k1.to && k2.promotion == k1.promotion);
                        if !is_k1 && is_pseudo_legal(pos, k2, tables) && is_legal_move(pos, k2, tables) {
                            return Some(k2);
                        }
                    }
                }

                PickerStage::GenerateQuiets => {
                    self.generate_quiets(pos, tables, history);
                    self.stage = PickerStage::Quiets;
                }

                PickerStage::Quiets => {
                    while let Some(mv) = self.pick_best_quiet() {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(pos, mv, tables) {
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::BadCaptures;
                }

                PickerStage::BadCaptures => {
                    while self.bad_cap_idx < self.bad_captures.len() {
                        let mv = self.bad_captures[self.bad_cap_idx];
                        self.bad_cap_idx += 1;
                        if self.is_hash_move(mv) {
                            continue;
                        }
                        if is_legal_move(pos, mv, tables) {
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::Done;
                }

                PickerStage::Done => return None,
            }
        }
    }
}

/// Whether `mv` could have come out of the move generator for `pos` — used
/// to validate the hash move and killers, which are carried across nodes
/// and may no longer apply to the current position. Regenerates the
/// relevant pseudo-legal moves into a scratch buffer and checks membership
/// rather than re-deriving per-piece attack rules, since this runs at most
/// three times per node (hash move, killer 1, killer 2).
fn is_pseudo_legal(pos: &Position, mv: Move, tables: &MagicTables) -> bool {
    let mut scratch: ArrayVec<Move, 256> = ArrayVec::new();
    generate_pseudo_legal(pos, tables, &mut scratch);
    scratch.contains(&mv)
}
