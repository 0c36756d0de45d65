//! Move ordering for alpha-beta pruning
//!
//! Candidate columns are pre-scored with one ply of static evaluation plus a
//! small center bonus, then tried best-first for the side to move.

use crate::board::{Board, Columns};
use crate::evaluation::evaluate;
use crate::types::PlayerNumber;
use smallvec::SmallVec;

/// Ordering bonus for a column
#[inline]
fn center_bonus(col: usize) -> i32 {
    match col {
        3 => 10,
        2 | 4 => 5,
        _ => 0,
    }
}

/// Order `moves` for `mover`, scores taken from `me`'s point of view.
///
/// The maximiser (`mover == me`) gets descending order, the minimiser
/// ascending. The sort is stable, so equal scores keep their column order.
pub(crate) fn order_moves(board: &Board, moves: &mut Columns, mover: PlayerNumber, me: PlayerNumber) {
    let maximizing = mover == me;
    let mut scored: SmallVec<[(usize, i32); 7]> = moves
        .iter()
        .map(|&col| {
            let mut after = *board;
            after.drop_piece(col, mover);
            let bonus = if maximizing {
                center_bonus(col)
            } else {
                -center_bonus(col)
            };
            (col, evaluate(&after, me) + bonus)
        })
        .collect();

    if maximizing {
        scored.sort_by(|a, b| b.1.cmp(&a.1));
    } else {
        scored.sort_by(|a, b| a.1.cmp(&b.1));
    }

    moves.clear();
    moves.extend(scored.into_iter().map(|(col, _)| col));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_first_on_empty_board() {
        let board = Board::new();
        let mut moves = board.valid_columns();
        order_moves(&board, &mut moves, PlayerNumber::Two, PlayerNumber::Two);
        assert_eq!(moves[0], 3);
        assert_eq!(moves.len(), 7);
    }

    #[test]
    fn test_minimiser_also_prefers_center() {
        let board = Board::new();
        let mut moves = board.valid_columns();
        order_moves(&board, &mut moves, PlayerNumber::One, PlayerNumber::Two);
        assert_eq!(moves[0], 3);
    }

    #[test]
    fn test_winning_drop_ordered_first() {
        let board = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [2, 0, 0, 0, 0, 0, 0],
            [2, 0, 0, 0, 0, 0, 0],
            [2, 0, 0, 1, 1, 0, 0],
        ]);
        let mut moves = board.valid_columns();
        order_moves(&board, &mut moves, PlayerNumber::Two, PlayerNumber::Two);
        assert_eq!(moves[0], 0);
    }
}
