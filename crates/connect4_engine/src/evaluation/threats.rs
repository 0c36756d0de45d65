//! Immediate threats

use crate::board::Board;
use crate::constants::COLS;
use crate::types::PlayerNumber;

const OWN_THREAT: i32 = 20;
const OPP_THREAT: i32 = 25;

/// Number of columns where `player` wins by dropping now
pub fn count_winning_drops(board: &Board, player: PlayerNumber) -> usize {
    (0..COLS)
        .filter(|&col| board.is_winning_drop(col, player))
        .count()
}

pub(crate) fn threat_balance(board: &Board, me: PlayerNumber) -> i32 {
    let own = count_winning_drops(board, me) as i32;
    let opp = count_winning_drops(board, me.other()) as i32;
    own * OWN_THREAT - opp * OPP_THREAT
}
