//! Board representation and drop mechanics
//!
//! Row 0 is the top of the board, row 5 the floor. Pieces fall to the lowest
//! empty row of a column, so a column's filled cells are always contiguous
//! from the floor up.

use crate::constants::*;
use crate::types::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Columns that can still receive a piece
pub type Columns = SmallVec<[usize; COLS]>;

/// The four line axes through a cell: horizontal, vertical, diagonal ↘, diagonal ↙
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A 6x7 connect-four grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from rows of digits (0 empty, 1 and 2 players), top row first.
    ///
    /// Gravity is not enforced; this is meant for fixtures and tests.
    pub fn from_rows(rows: [[u8; COLS]; ROWS]) -> Self {
        let mut board = Self::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                board.cells[r][c] = Cell::try_from(value).unwrap_or_default();
            }
        }
        board
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Raw rows, top row first
    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    /// Lowest empty row in `col`, scanning up from the floor
    #[inline]
    pub fn lowest_empty_row(&self, col: usize) -> Option<usize> {
        (0..ROWS).rev().find(|&row| self.cells[row][col].is_empty())
    }

    #[inline]
    pub fn is_column_full(&self, col: usize) -> bool {
        !self.cells[0][col].is_empty()
    }

    /// Drop a piece into `col`. Returns the landing row, or `None` if the column is full.
    #[inline]
    pub fn drop_piece(&mut self, col: usize, player: PlayerNumber) -> Option<usize> {
        let row = self.lowest_empty_row(col)?;
        self.cells[row][col] = player.cell();
        Some(row)
    }

    /// Remove the topmost piece of `col` (undo of [`Board::drop_piece`])
    #[inline]
    pub fn lift_piece(&mut self, col: usize) {
        if let Some(row) = (0..ROWS).find(|&row| !self.cells[row][col].is_empty()) {
            self.cells[row][col] = Cell::Empty;
        }
    }

    /// Columns with at least one empty cell, in ascending order
    pub fn valid_columns(&self) -> Columns {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// A board is full once its top row has no empty cell
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(|cell| !cell.is_empty())
    }

    pub fn empty_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_empty())
            .count()
    }

    /// Whether `player` has four or more in a row through (`row`, `col`)
    pub fn is_winning_cell(&self, row: usize, col: usize, player: PlayerNumber) -> bool {
        let target = player.cell();
        AXES.iter().any(|&(dr, dc)| {
            let count = 1
                + self.run_length(row, col, dr, dc, target)
                + self.run_length(row, col, -dr, -dc, target);
            count >= CONNECT
        })
    }

    /// Consecutive `target` cells starting next to (`row`, `col`) along (`dr`, `dc`)
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, target: Cell) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while (0..ROWS as isize).contains(&r)
            && (0..COLS as isize).contains(&c)
            && self.cells[r as usize][c as usize] == target
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// Whether dropping `player` into `col` would win immediately
    pub fn is_winning_drop(&self, col: usize, player: PlayerNumber) -> bool {
        let mut after = *self;
        match after.drop_piece(col, player) {
            Some(row) => after.is_winning_cell(row, col, player),
            None => false,
        }
    }

    /// Full scan for any completed line
    pub fn winner(&self) -> Option<PlayerNumber> {
        for row in 0..ROWS {
            for col in 0..COLS {
                if let Some(owner) = self.cells[row][col].owner() {
                    if self.is_winning_cell(row, col, owner) {
                        return Some(owner);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_lands_on_floor_then_stacks() {
        let mut board = Board::new();
        assert_eq!(board.drop_piece(3, PlayerNumber::One), Some(5));
        assert_eq!(board.drop_piece(3, PlayerNumber::Two), Some(4));
        assert_eq!(board.get(5, 3), Cell::Player1);
        assert_eq!(board.get(4, 3), Cell::Player2);
    }

    #[test]
    fn test_full_column_rejects_drop() {
        let mut board = Board::new();
        for _ in 0..ROWS {
            assert!(board.drop_piece(0, PlayerNumber::One).is_some());
        }
        assert!(board.is_column_full(0));
        assert_eq!(board.drop_piece(0, PlayerNumber::Two), None);
        assert_eq!(board.valid_columns().as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_lift_undoes_drop() {
        let mut board = Board::new();
        board.drop_piece(2, PlayerNumber::One);
        let before = board;
        board.drop_piece(2, PlayerNumber::Two);
        board.lift_piece(2);
        assert_eq!(board, before);
    }

    #[test]
    fn test_horizontal_win_detected_from_any_member() {
        let board = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 1, 1, 1, 1, 0, 0],
        ]);
        for col in 1..=4 {
            assert!(board.is_winning_cell(5, col, PlayerNumber::One));
        }
        assert_eq!(board.winner(), Some(PlayerNumber::One));
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let board = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 2, 0, 0, 0],
            [0, 0, 2, 1, 0, 0, 0],
            [0, 2, 1, 1, 1, 0, 0],
        ]);
        assert!(!board.is_winning_cell(5, 2, PlayerNumber::One));
        assert!(!board.is_winning_cell(3, 3, PlayerNumber::Two));
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_both_diagonals() {
        let falling = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [2, 0, 0, 0, 0, 0, 0],
            [1, 2, 0, 0, 0, 0, 0],
            [1, 1, 2, 0, 0, 0, 0],
            [1, 1, 1, 2, 0, 0, 0],
        ]);
        assert!(falling.is_winning_cell(2, 0, PlayerNumber::Two));

        let rising = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 1],
            [0, 0, 0, 0, 0, 1, 2],
            [0, 0, 0, 0, 1, 2, 2],
            [0, 0, 0, 1, 2, 2, 2],
        ]);
        assert!(rising.is_winning_cell(4, 4, PlayerNumber::One));
    }

    #[test]
    fn test_winning_drop_probe_leaves_board_untouched() {
        let mut board = Board::new();
        for _ in 0..3 {
            board.drop_piece(6, PlayerNumber::Two);
        }
        let before = board;
        assert!(board.is_winning_drop(6, PlayerNumber::Two));
        assert!(!board.is_winning_drop(6, PlayerNumber::One));
        assert_eq!(board, before);
    }

    #[test]
    fn test_empty_count_and_full() {
        let mut board = Board::new();
        assert_eq!(board.empty_count(), CELLS);
        assert!(!board.is_full());
        for col in 0..COLS {
            for row in 0..ROWS {
                let player = if (row + col) % 2 == 0 {
                    PlayerNumber::One
                } else {
                    PlayerNumber::Two
                };
                board.drop_piece(col, player);
            }
        }
        assert_eq!(board.empty_count(), 0);
        assert!(board.is_full());
    }

    #[test]
    fn test_board_serializes_as_rows_of_digits() {
        let mut board = Board::new();
        board.drop_piece(0, PlayerNumber::Two);
        let json = serde_json::to_value(board).expect("Should serialize");
        assert_eq!(json.as_array().map(|rows| rows.len()), Some(ROWS));
        assert_eq!(json[5][0], 2);
        assert_eq!(json[0][0], 0);
    }
}
