//! Board geometry and search tuning constants

use std::time::Duration;

/// Number of rows on the board (row 0 is the top row)
pub const ROWS: usize = 6;

/// Number of columns on the board
pub const COLS: usize = 7;

/// Pieces in a line needed to win
pub const CONNECT: usize = 4;

/// Total number of cells
pub const CELLS: usize = ROWS * COLS;

/// Column preference used when breaking ties toward the center
pub const CENTER_ORDER: [usize; COLS] = [3, 2, 4, 1, 5, 0, 6];

/// Score of a completed four-in-a-row
pub const WIN_SCORE: i32 = 100_000;

/// Any score at or beyond this is a proven win; deeper search cannot improve it
pub const FORCED_WIN_THRESHOLD: i32 = 10_000;

/// Alpha-beta infinity (strictly larger than any reachable score)
pub const AB_INF: i32 = 1_000_000;

/// Wall-clock budget for one iterative deepening run
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(2);

/// Deepest search ever requested (near-exhaustive endgame)
pub const MAX_DEPTH: u8 = 15;

/// Entries kept before the transposition table is flushed
pub const TT_CAPACITY: usize = 1 << 20;

/// Nodes visited between two deadline checks
pub const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Depth limit chosen from the number of empty cells.
///
/// Openings are wide and shallow; the endgame is small enough to search
/// almost to the end.
pub fn depth_for_empty_cells(empty: usize) -> u8 {
    match empty {
        e if e > 35 => 8,
        e if e > 20 => 10,
        e if e > 10 => 12,
        _ => MAX_DEPTH,
    }
}
