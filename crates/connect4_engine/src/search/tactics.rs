//! One-ply tactics checked before any search
//!
//! Immediate win, then block, then fork. These are exact, so when one applies
//! the search is skipped entirely.

use crate::board::{Board, Columns};
use crate::constants::*;
use crate::evaluation::count_winning_drops;
use crate::types::PlayerNumber;

/// Columns where `player` completes a line by dropping now, ascending
pub fn winning_columns(board: &Board, player: PlayerNumber) -> Columns {
    (0..COLS)
        .filter(|&col| board.is_winning_drop(col, player))
        .collect()
}

/// Whether dropping `player` into `col` leaves two or more winning follow-ups
pub fn creates_fork(board: &Board, col: usize, player: PlayerNumber) -> bool {
    let mut after = *board;
    if after.drop_piece(col, player).is_none() {
        return false;
    }
    count_winning_drops(&after, player) >= 2
}

/// Win, block or fork for `me`, in that order
pub fn immediate_move(board: &Board, me: PlayerNumber) -> Option<usize> {
    if let Some(&col) = winning_columns(board, me).first() {
        return Some(col);
    }
    if let Some(&col) = winning_columns(board, me.other()).first() {
        return Some(col);
    }
    CENTER_ORDER
        .iter()
        .copied()
        .find(|&col| creates_fork(board, col, me))
}
