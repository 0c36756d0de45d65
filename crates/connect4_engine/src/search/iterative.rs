//! Iterative deepening search
//!
//! Runs fixed-depth searches at depth 1, 2, ... under a wall-clock budget and
//! keeps the answer of the deepest search that completed.

use super::alphabeta::alphabeta;
use super::SearchStats;
use crate::board::Board;
use crate::constants::*;
use crate::hash::TranspositionTable;
use crate::types::PlayerNumber;
use instant::Instant;
use std::time::Duration;

/// What an iterative deepening run settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    /// Column from the deepest completed depth
    pub column: Option<usize>,
    pub score: i32,
    /// Deepest fully completed depth, 0 if none
    pub depth: u8,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// Iterative deepening up to `max_depth` within `budget`.
///
/// Depth 1 always runs to completion so there is a searched answer even on a
/// tiny budget. Deeper iterations abort at the deadline and are discarded. The
/// run stops early once a score at or above [`FORCED_WIN_THRESHOLD`] is proven.
pub fn iterative_deepening(
    board: &Board,
    me: PlayerNumber,
    max_depth: u8,
    budget: Duration,
    tt: &mut TranspositionTable,
) -> SearchReport {
    let start = Instant::now();
    let deadline = start + budget;
    let mut stats = SearchStats::default();
    let mut report = SearchReport {
        column: None,
        score: 0,
        depth: 0,
        stats,
        elapsed: Duration::ZERO,
    };

    for depth in 1..=max_depth.max(1) {
        if depth > 1 && start.elapsed() >= budget {
            break;
        }

        let limit = if depth == 1 { None } else { Some(deadline) };
        let Some(outcome) = alphabeta(board, depth, me, Some(&mut *tt), limit, &mut stats) else {
            tracing::trace!(depth, "search deadline reached mid-depth");
            break;
        };

        report.column = outcome.column;
        report.score = outcome.score;
        report.depth = depth;

        if outcome.score >= FORCED_WIN_THRESHOLD {
            break;
        }
    }

    report.stats = stats;
    report.elapsed = start.elapsed();
    report
}
