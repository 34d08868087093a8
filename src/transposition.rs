//! Transposition table for the negamax search.
//!
//! Entries are keyed by the board's Zobrist hash, which covers stones, side
//! to move and board size. The table is advisory: a store always overwrites,
//! and two positions with the same 64-bit hash are taken to be the same.

use rustc_hash::FxHashMap;

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The search completed inside its window.
    Exact,
    /// Beta cutoff: the true value is at least the score.
    Lower,
    /// Fail low: the true value is at most the score.
    Upper,
}

/// One stored search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranspositionEntry {
    /// Score from the point of view of the side to move.
    pub score: i32,
    /// Remaining depth the score was searched to.
    pub depth: u32,
    pub bound: Bound,
}

/// Search results keyed by board hash, one entry per position.
#[derive(Default)]
pub struct TranspositionTable {
    entries: FxHashMap<u64, TranspositionEntry>,
    hits: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, replacing whatever was stored for `hash`.
    #[inline]
    pub fn store(&mut self, hash: u64, score: i32, depth: u32, bound: Bound) {
        self.entries.insert(hash, TranspositionEntry { score, depth, bound });
    }

    /// The stored score if it was searched at least `required_depth` deep.
    pub fn lookup(&self, hash: u64, required_depth: u32) -> Option<i32> {
        self.entries
            .get(&hash)
            .filter(|e| e.depth >= required_depth)
            .map(|e| e.score)
    }

    /// Like [`lookup`](Self::lookup), but also honours the bound kind against
    /// the current `(alpha, beta)` window. Returns a fail-hard score usable
    /// in place of searching the node.
    pub fn probe(&mut self, hash: u64, depth: u32, alpha: i32, beta: i32) -> Option<i32> {
        let entry = self.entries.get(&hash).filter(|e| e.depth >= depth)?;
        let score = match entry.bound {
            Bound::Exact => entry.score,
            Bound::Lower if entry.score >= beta => beta,
            Bound::Upper if entry.score <= alpha => alpha,
            Bound::Lower | Bound::Upper => return None,
        };
        self.hits += 1;
        Some(score)
    }

    /// The raw entry for `hash`, regardless of depth.
    pub fn get(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.entries.get(&hash)
    }

    /// Number of probes answered from the table since the last clear.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }
}
