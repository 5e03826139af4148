//! Transposition table (§4.6): open addressing keyed by the low bits of the
//! Zobrist key, overwrite-always replacement — no generation counter, no
//! depth-preference comparison (see DESIGN.md's replacement-policy entry).
//! The cut-rule semantics in `probe` are kept from the teacher's
//! `search/tt.rs` almost verbatim; only the replacement policy changed.

use crate::moves::types::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Debug, Clone, Copy)]
struct TTEntry {
    key: u64,
    best_move: Option<Move>,
    score: i16,
    depth: u8,
    bound: NodeType,
}

impl TTEntry {
    const EMPTY: TTEntry = TTEntry {
        key: 0,
        best_move: None,
        score: 0,
        depth: 0,
        bound: NodeType::Exact,
    };
}

/// A best-move hint is available whenever the key matches, independent of
/// whether the entry was deep enough to also produce a score cutoff.
pub struct TTProbe {
    pub best_move: Option<Move>,
    pub cutoff: Option<i32>,
}

pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    mask: usize,
}

impl TranspositionTable {
    /// `size_mb` rounded down to a power-of-two entry count so indexing is a
    /// mask instead of a modulo.
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<TTEntry>();
        let requested = (size_mb * 1024 * 1024) / entry_size.max(1);
        let capacity = requested.next_power_of_two().max(1);
        Self {
            entries: vec![TTEntry::EMPTY; capacity],
            mask: capacity - 1,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::EMPTY);
    }

    /// Cut-rule semantics from §4.6: a shallow or absent entry is a miss
    /// (still supplying `best_move` as an ordering hint when the entry
    /// exists but wasn't deep enough); `Exact` always cuts, `UpperBound`/
    /// `LowerBound` only cut when the stored score already proves the bound
    /// relative to the caller's window.
    pub fn probe(&self, key: u64, depth_req: u8, alpha: i32, beta: i32) -> TTProbe {
        let entry = &self.entries[self.index(key)];
        if entry.key != key {
            return TTProbe { best_move: None, cutoff: None };
        }
        let best_move = entry.best_move;
        if entry.depth < depth_req {
            return TTProbe { best_move, cutoff: None };
        }
        let score = entry.score as i32;
        let cutoff = match entry.bound {
            NodeType::Exact => Some(score),
            NodeType::UpperBound if score <= alpha => Some(alpha),
            NodeType::LowerBound if score >= beta => Some(beta),
            _ => None,
        };
        TTProbe { best_move, cutoff }
    }

    /// Unconditional overwrite (§4.6 REDESIGN: "overwrite always ... search
    /// re-derives everything that matters").
    pub fn store(&mut self, key: u64, best_move: Option<Move>, score: i32, depth: u8, bound: NodeType) {
        let idx = self.index(key);
        self.entries[idx] = TTEntry {
            key,
            best_move,
            score: score.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
            depth,
            bound,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::types::QUIET_MOVE;
    use crate::square::Square;

    fn dummy_move() -> Move {
        Move {
            from: Square::from_index(12),
            to: Square::from_index(28),
            piece: crate::board::Piece::Pawn,
            promotion: None,
            flags: QUIET_MOVE,
        }
    }

    #[test]
    fn probe_missing_entry_is_a_miss() {
        let tt = TranspositionTable::new(1);
        let probe = tt.probe(0x1234, 4, -100, 100);
        assert!(probe.cutoff.is_none());
        assert!(probe.best_move.is_none());
    }

    #[test]
    fn shallow_entry_is_a_miss_but_still_hints_best_move() {
        let mut tt = TranspositionTable::new(1);
        let mv = dummy_move();
        tt.store(0xabcd, Some(mv), 50, 3, NodeType::Exact);
        let probe = tt.probe(0xabcd, 8, -100, 100);
        assert!(probe.cutoff.is_none());
        assert_eq!(probe.best_move, Some(mv));
    }

    #[test]
    fn exact_entry_always_cuts() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x55, None, 42, 6, NodeType::Exact);
        let probe = tt.probe(0x55, 4, -1000, 1000);
        assert_eq!(probe.cutoff, Some(42));
    }

    #[test]
    fn upper_bound_cuts_only_when_score_already_below_alpha() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x99, None, 10, 6, NodeType::UpperBound);
        assert_eq!(tt.probe(0x99, 4, 20, 1000).cutoff, Some(20));
        assert_eq!(tt.probe(0x99, 4, 5, 1000).cutoff, None);
    }

    #[test]
    fn lower_bound_cuts_only_when_score_already_above_beta() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x77, None, 80, 6, NodeType::LowerBound);
        assert_eq!(tt.probe(0x77, 4, -1000, 50).cutoff, Some(50));
        assert_eq!(tt.probe(0x77, 4, -1000, 90).cutoff, None);
    }

    #[test]
    fn store_overwrites_unconditionally_even_with_shallower_depth() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x11, None, 100, 10, NodeType::Exact);
        tt.store(0x11, None, -5, 1, NodeType::Exact);
        let probe = tt.probe(0x11, 1, -1000, 1000);
        assert_eq!(probe.cutoff, Some(-5));
    }

    #[test]
    fn clear_drops_all_entries() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x22, None, 1, 1, NodeType::Exact);
        tt.clear();
        assert!(tt.probe(0x22, 0, -1, 1).best_move.is_none());
        assert!(tt.probe(0x22, 0, -1, 1).cutoff.is_none());
    }
}
