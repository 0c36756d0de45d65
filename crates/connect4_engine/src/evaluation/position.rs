//! Positional weights and column control

use crate::board::Board;
use crate::constants::*;
use crate::types::PlayerNumber;

const CENTER_WEIGHT: i32 = 8;
const NEAR_CENTER_WEIGHT: i32 = 5;
const OWN_EDGE_PENALTY: i32 = -3;
const OPP_EDGE_BONUS: i32 = 1;
const CONTROL_PER_PIECE: i32 = 3;

/// Height weight of a row: the floor row counts most
#[inline]
fn height(row: usize) -> i32 {
    (row + 1) as i32
}

/// Center and near-center occupancy weighted by height, edge pieces penalised
pub(crate) fn positional(board: &Board, me: PlayerNumber) -> i32 {
    let mut score = 0;
    for row in 0..ROWS {
        for col in 0..COLS {
            let Some(owner) = board.get(row, col).owner() else {
                continue;
            };
            let mine = owner == me;
            score += match col {
                3 => sign(mine) * CENTER_WEIGHT * height(row),
                2 | 4 => sign(mine) * NEAR_CENTER_WEIGHT * height(row),
                0 | 6 if mine => OWN_EDGE_PENALTY,
                0 | 6 => OPP_EDGE_BONUS,
                _ => 0,
            };
        }
    }
    score
}

/// Contiguous same-owner run from the floor of each column
pub(crate) fn column_control(board: &Board, me: PlayerNumber) -> i32 {
    (0..COLS)
        .map(|col| {
            let Some(owner) = board.get(ROWS - 1, col).owner() else {
                return 0;
            };
            let run = (0..ROWS)
                .rev()
                .take_while(|&row| board.get(row, col).owner() == Some(owner))
                .count() as i32;
            sign(owner == me) * run * CONTROL_PER_PIECE
        })
        .sum()
}

#[inline]
fn sign(mine: bool) -> i32 {
    if mine {
        1
    } else {
        -1
    }
}
