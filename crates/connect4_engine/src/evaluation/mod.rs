//! Static position evaluation
//!
//! Scores a position from the point of view of one player (`me`); positive
//! values favour `me`. The evaluator never searches, it only looks at the
//! board as it stands:
//! - Terminal positions (a completed line) score ±[`WIN_SCORE`]
//! - Positional weights for center and edge columns
//! - Every line of four cells scored by its piece composition
//! - Immediate winning drops available to each side
//! - Column control from the floor up
//!
//! ## Module Organization
//!
//! - `position` - Center/edge weights and column control
//! - `windows` - The 69 lines of four and their scoring
//! - `threats` - Immediate winning drops

mod position;
mod threats;
mod windows;

pub use threats::count_winning_drops;
pub use windows::{Orientation, Window, WINDOWS, WINDOW_COUNT};

use crate::board::Board;
use crate::constants::WIN_SCORE;
use crate::types::PlayerNumber;

/// Evaluate `board` for `me`
pub fn evaluate(board: &Board, me: PlayerNumber) -> i32 {
    if let Some(winner) = board.winner() {
        return if winner == me { WIN_SCORE } else { -WIN_SCORE };
    }

    position::positional(board, me)
        + windows::score_windows(board, me)
        + threats::threat_balance(board, me)
        + position::column_control(board, me)
}
