//! Lines of four
//!
//! Every horizontal, vertical and diagonal run of four cells on the board,
//! built once at compile time, and the composition scoring applied to each.

use crate::board::Board;
use crate::constants::*;
use crate::types::PlayerNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
}

/// Four cells in a line, as (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub cells: [(usize, usize); CONNECT],
    pub orientation: Orientation,
}

/// 24 horizontal + 21 vertical + 2 * 12 diagonal
pub const WINDOW_COUNT: usize = 69;

pub static WINDOWS: [Window; WINDOW_COUNT] = build_windows();

const fn line(row: usize, col: usize, dr: isize, dc: isize, orientation: Orientation) -> Window {
    let mut cells = [(0, 0); CONNECT];
    let mut i = 0;
    while i < CONNECT {
        let r = row as isize + dr * i as isize;
        let c = col as isize + dc * i as isize;
        cells[i] = (r as usize, c as usize);
        i += 1;
    }
    Window { cells, orientation }
}

const fn build_windows() -> [Window; WINDOW_COUNT] {
    let mut out = [Window {
        cells: [(0, 0); CONNECT],
        orientation: Orientation::Horizontal,
    }; WINDOW_COUNT];
    let mut n = 0;

    let mut row = 0;
    while row < ROWS {
        let mut col = 0;
        while col + CONNECT <= COLS {
            out[n] = line(row, col, 0, 1, Orientation::Horizontal);
            n += 1;
            col += 1;
        }
        row += 1;
    }

    let mut col = 0;
    while col < COLS {
        let mut row = 0;
        while row + CONNECT <= ROWS {
            out[n] = line(row, col, 1, 0, Orientation::Vertical);
            n += 1;
            row += 1;
        }
        col += 1;
    }

    let mut row = 0;
    while row + CONNECT <= ROWS {
        let mut col = 0;
        while col + CONNECT <= COLS {
            out[n] = line(row, col, 1, 1, Orientation::Diagonal);
            n += 1;
            col += 1;
        }
        let mut col = CONNECT - 1;
        while col < COLS {
            out[n] = line(row, col, 1, -1, Orientation::Diagonal);
            n += 1;
            col += 1;
        }
        row += 1;
    }

    out
}

const OWN_FOUR: i32 = 10_000;
const OWN_THREE: i32 = 500;
const OWN_THREE_VERTICAL: i32 = 750;
const OWN_TWO: i32 = 50;
const OWN_TWO_HORIZONTAL: i32 = 60;
const OPP_THREE: i32 = -600;
const OPP_THREE_VERTICAL: i32 = -900;
const OPP_TWO: i32 = -50;
const OPP_TWO_HORIZONTAL: i32 = -60;
const OPP_FOUR: i32 = -10_000;

/// Score of one window by composition. Mixed windows can never complete and score 0.
pub(crate) fn score_window(window: &Window, board: &Board, me: PlayerNumber) -> i32 {
    let (mut own, mut opp, mut empty) = (0, 0, 0);
    for &(row, col) in &window.cells {
        match board.get(row, col).owner() {
            Some(p) if p == me => own += 1,
            Some(_) => opp += 1,
            None => empty += 1,
        }
    }

    let vertical = window.orientation == Orientation::Vertical;
    let horizontal = window.orientation == Orientation::Horizontal;
    match (own, opp, empty) {
        (4, 0, 0) => OWN_FOUR,
        (3, 0, 1) if vertical => OWN_THREE_VERTICAL,
        (3, 0, 1) => OWN_THREE,
        (2, 0, 2) if horizontal => OWN_TWO_HORIZONTAL,
        (2, 0, 2) => OWN_TWO,
        (0, 4, 0) => OPP_FOUR,
        (0, 3, 1) if vertical => OPP_THREE_VERTICAL,
        (0, 3, 1) => OPP_THREE,
        (0, 2, 2) if horizontal => OPP_TWO_HORIZONTAL,
        (0, 2, 2) => OPP_TWO,
        _ => 0,
    }
}

pub(crate) fn score_windows(board: &Board, me: PlayerNumber) -> i32 {
    WINDOWS.iter().map(|w| score_window(w, board, me)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_table_covers_board() {
        let count = |o: Orientation| WINDOWS.iter().filter(|w| w.orientation == o).count();
        assert_eq!(count(Orientation::Horizontal), 24);
        assert_eq!(count(Orientation::Vertical), 21);
        assert_eq!(count(Orientation::Diagonal), 24);
        for window in WINDOWS.iter() {
            for &(row, col) in &window.cells {
                assert!(row < ROWS && col < COLS);
            }
        }
    }

    #[test]
    fn test_vertical_three_weighs_more_than_horizontal() {
        let vertical = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 1],
            [0, 0, 0, 0, 0, 0, 1],
            [0, 0, 0, 0, 0, 0, 1],
        ]);
        let window = line(2, 6, 1, 0, Orientation::Vertical);
        assert_eq!(score_window(&window, &vertical, PlayerNumber::One), OWN_THREE_VERTICAL);
        assert_eq!(score_window(&window, &vertical, PlayerNumber::Two), OPP_THREE_VERTICAL);
    }

    #[test]
    fn test_defense_outweighs_offense() {
        assert!(OPP_THREE.abs() > OWN_THREE);
        assert!(OPP_THREE_VERTICAL.abs() > OWN_THREE_VERTICAL);
    }

    #[test]
    fn test_mixed_window_scores_zero() {
        let board = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [1, 1, 2, 1, 0, 0, 0],
        ]);
        let window = line(5, 0, 0, 1, Orientation::Horizontal);
        assert_eq!(score_window(&window, &board, PlayerNumber::One), 0);
    }
}
