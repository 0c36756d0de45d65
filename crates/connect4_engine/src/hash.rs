//! Position hashing and transposition table
//!
//! The digest is the board read as a 42-digit base-3 number. 3^42 does not fit
//! in a `u64`, so the accumulation wraps.

use crate::board::Board;
use crate::constants::*;
use std::collections::HashMap;

/// Canonical base-3 digest: `hash = hash * 3 + cell` in row-major order from the top-left
pub fn canonical_hash(board: &Board) -> u64 {
    board
        .rows()
        .iter()
        .flatten()
        .fold(0u64, |hash, cell| hash.wrapping_mul(3).wrapping_add(cell.digit()))
}

/// How a stored score relates to the true value of its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Score lies strictly inside the window it was searched with
    Exact,
    /// Fail-high: true value is at least the score
    Lower,
    /// Fail-low: true value is at most the score
    Upper,
}

impl Bound {
    /// Classify `score` against the window a node was entered with
    pub fn classify(score: i32, original_alpha: i32, original_beta: i32) -> Self {
        if score <= original_alpha {
            Bound::Upper
        } else if score >= original_beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub score: i32,
    pub depth: u8,
    pub bound: Bound,
}

/// Position cache owned by a single bot
#[derive(Debug)]
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
    capacity: usize,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_capacity(TT_CAPACITY)
    }
}

impl TranspositionTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Score usable at `depth` remaining plies within (`alpha`, `beta`)
    pub fn probe(&self, hash: u64, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        let entry = self.entries.get(&hash)?;
        if entry.depth < depth {
            return None;
        }
        match entry.bound {
            Bound::Exact => Some(entry.score),
            Bound::Lower if entry.score >= beta => Some(entry.score),
            Bound::Upper if entry.score <= alpha => Some(entry.score),
            _ => None,
        }
    }

    /// Store or overwrite. A full table is flushed before inserting a new key.
    pub fn store(&mut self, hash: u64, score: i32, depth: u8, bound: Bound) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&hash) {
            tracing::debug!(entries = self.entries.len(), "transposition table full, clearing");
            self.entries.clear();
        }
        self.entries.insert(hash, TtEntry { score, depth, bound });
    }

    pub fn get(&self, hash: u64) -> Option<&TtEntry> {
        self.entries.get(&hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
