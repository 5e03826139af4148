//! Repetition history (§3/§8/§9): a ply-indexed scratch owned by the search,
//! not by `Position`. Each entry pairs a position's Zobrist key with whether
//! the move that produced it was irreversible (a capture, a pawn move, or
//! otherwise reset the half-move clock). Threefold repetition is declared
//! only within the current irreversible run — the scan stops at the first
//! such entry, matching how the half-move clock itself resets at captures
//! and pawn moves.
//!
//! Kept outside `Position` (which stays `Copy` and carries no per-search
//! scratch) the same way `search::context::SearchContext`'s killer/history
//! tables are kept outside it.

/// One recorded ply: the position's Zobrist key, and whether reaching it
/// reset the half-move clock.
type Entry = (u64, bool);

pub struct RepetitionHistory {
    entries: Vec<Entry>,
}

impl Default for RepetitionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RepetitionHistory {
    pub fn new() -> Self {
        Self { entries: Vec::with_capacity(256) }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records the position reached after playing a move; `progress_made`
    /// is true when that move was a capture, pawn move, or otherwise
    /// irreversible.
    pub fn push(&mut self, key: u64, progress_made: bool) {
        self.entries.push((key, progress_made));
    }

    /// Undoes the most recent `push`, restoring the history to what it was
    /// before the move that produced it was explored.
    pub fn pop(&mut self) {
        self.entries.pop();
    }

    /// Number of prior occurrences of `current_key` within the current
    /// irreversible run, not counting `current_key`'s own entry (normally
    /// the most recently pushed one). Scans backward two plies at a time —
    /// one ply for the reply in between, one more to land on the next
    /// same-side-to-move candidate — since repetition only ever recurs on
    /// the same side to move. Either of those two plies resetting the
    /// half-move clock ends the run and stops the scan.
    pub fn count_repetitions(&self, current_key: u64) -> usize {
        let len = self.entries.len();
        if len < 3 {
            return 0;
        }
        let mut count = 0;
        let mut i = len - 1;
        while i >= 2 {
            let (_, reply_progress) = self.entries[i - 1];
            if reply_progress {
                break;
            }
            let candidate = i - 2;
            let (key, candidate_progress) = self.entries[candidate];
            if key == current_key {
                count += 1;
            }
            if candidate_progress {
                break;
            }
            i = candidate;
        }
        count
    }

    /// True once `current_key` has occurred twice before in the current
    /// irreversible run, i.e. this would be its third occurrence.
    pub fn is_threefold(&self, current_key: u64) -> bool {
        self.count_repetitions(current_key) >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_history_has_no_repetitions() {
        let history = RepetitionHistory::new();
        assert_eq!(history.count_repetitions(0xABCD), 0);
        assert!(!history.is_threefold(0xABCD));
    }

    #[test]
    fn shuffling_back_and_forth_reaches_threefold() {
        // `start` occurs at plies 0, 2, and 4 — three total appearances,
        // each two plies apart with the same side to move, which is a
        // genuine threefold. Two appearances (the check before the last
        // push) is only a single repeat, not yet claimable.
        let mut history = RepetitionHistory::new();
        let start = 0x1111_1111_1111_1111u64;
        let after_knight_out = 0x2222_2222_2222_2222u64;
        history.push(start, false);
        history.push(after_knight_out, false);
        history.push(start, false);
        assert!(!history.is_threefold(start));
        history.push(after_knight_out, false);
        history.push(start, false);
        assert!(history.is_threefold(start));
    }

    #[test]
    fn capture_blocks_the_scan_from_reaching_further_back() {
        let mut history = RepetitionHistory::new();
        let a = 0xAAAA_AAAA_AAAA_AAAAu64;
        let b = 0xBBBB_BBBB_BBBB_BBBBu64;
        let reset_marker = 0xCCCC_CCCC_CCCC_CCCCu64;
        history.push(a, false);
        history.push(b, false);
        history.push(reset_marker, true);
        history.push(b, false);
        // `b` recurs two plies back, but the capture recorded at the
        // reset_marker entry is closer still and must stop the scan before
        // it reaches the older `b` at index 1.
        assert_eq!(history.count_repetitions(b), 0);
    }

    #[test]
    fn push_pop_is_symmetric() {
        let mut history = RepetitionHistory::new();
        history.push(1, false);
        history.push(2, false);
        assert_eq!(history.len(), 2);
        history.pop();
        assert_eq!(history.len(), 1);
        history.pop();
        assert!(history.is_empty());
    }
}
