//! Bot move search
//!
//! This module implements the search behind the bot using:
//! - One-ply tactics (win, block, fork) checked before anything else
//! - Minimax with alpha-beta pruning (ITERATIVE - no recursion)
//! - Iterative deepening for time management
//! - Transposition table for caching
//! - Move ordering for better pruning
//!
//! ## Module Organization
//!
//! - `tactics` - Immediate win/block/fork detection
//! - `alphabeta` - Core alpha-beta search algorithm
//! - `ordering` - Move ordering heuristics
//! - `iterative` - Iterative deepening wrapper

mod alphabeta;
mod iterative;
mod ordering;
pub mod tactics;

pub use alphabeta::{alphabeta, SearchOutcome};
pub use iterative::{iterative_deepening, SearchReport};
pub use tactics::{immediate_move, winning_columns};

/// Counters collected across one search run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions visited
    pub nodes: u64,
    /// Alpha-beta cutoffs
    pub cutoffs: u64,
    /// Transposition table answers
    pub tt_hits: u64,
}
