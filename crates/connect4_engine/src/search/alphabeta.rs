//! Minimax with alpha-beta pruning (iterative, no recursion)
//!
//! Each `SearchFrame` stands for one recursive call. The board is a single
//! local copy mutated with drop/lift pairs as frames are pushed and popped, so
//! an endgame search at depth 15 costs a few hundred bytes of heap instead of
//! call stack.

use super::ordering::order_moves;
use super::SearchStats;
use crate::board::{Board, Columns};
use crate::constants::*;
use crate::evaluation::evaluate;
use crate::hash::{canonical_hash, Bound, TranspositionTable};
use crate::types::PlayerNumber;
use instant::Instant;

/// Result of a completed fixed-depth search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Minimax value from the searching player's point of view
    pub score: i32,
    /// Best root column, `None` when the root had no legal move
    pub column: Option<usize>,
}

struct SearchFrame {
    depth: u8,
    alpha: i32,
    beta: i32,
    original_alpha: i32,
    original_beta: i32,
    maximizing: bool,
    moves: Columns,
    move_index: usize,
    best_score: i32,
    best_move: Option<usize>,
    made_move: Option<usize>,
    returning_score: Option<i32>,
    initialized: bool,
    hash: u64,
}

impl SearchFrame {
    fn new(depth: u8, alpha: i32, beta: i32, maximizing: bool) -> Self {
        Self {
            depth,
            alpha,
            beta,
            original_alpha: alpha,
            original_beta: beta,
            maximizing,
            moves: Columns::new(),
            move_index: 0,
            best_score: if maximizing { -AB_INF } else { AB_INF },
            best_move: None,
            made_move: None,
            returning_score: None,
            initialized: false,
            hash: 0,
        }
    }

    /// Fold a child score into this node's best score and window
    fn record(&mut self, col: usize, score: i32) {
        if self.maximizing {
            if score > self.best_score {
                self.best_score = score;
                self.best_move = Some(col);
            }
            self.alpha = self.alpha.max(score);
        } else {
            if score < self.best_score {
                self.best_score = score;
                self.best_move = Some(col);
            }
            self.beta = self.beta.min(score);
        }
    }
}

/// Pop the finished top frame and hand `score` to its parent.
/// Returns the popped frame when it was the root.
fn unwind(stack: &mut Vec<SearchFrame>, score: i32) -> Option<SearchFrame> {
    let frame = stack.pop()?;
    match stack.last_mut() {
        Some(parent) => {
            parent.returning_score = Some(score);
            None
        }
        None => Some(frame),
    }
}

/// Search `root` to `depth` plies with `me` to move.
///
/// Returns `None` only when `deadline` passes before the search completes.
/// The root position is never answered from the table, so a completed search
/// always carries a root move when one exists.
pub fn alphabeta(
    root: &Board,
    depth: u8,
    me: PlayerNumber,
    mut tt: Option<&mut TranspositionTable>,
    deadline: Option<Instant>,
    stats: &mut SearchStats,
) -> Option<SearchOutcome> {
    let mut board = *root;
    let mut stack = vec![SearchFrame::new(depth.max(1), -AB_INF, AB_INF, true)];

    loop {
        let is_root = stack.len() == 1;
        let frame = stack.last_mut()?;

        // Phase 1: first visit
        if !frame.initialized {
            frame.initialized = true;
            stats.nodes += 1;

            if stats.nodes % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        return None;
                    }
                }
            }

            if frame.depth == 0 || board.is_full() {
                let score = evaluate(&board, me);
                if let Some(root_frame) = unwind(&mut stack, score) {
                    return Some(SearchOutcome {
                        score,
                        column: root_frame.best_move,
                    });
                }
                continue;
            }

            frame.hash = canonical_hash(&board);
            if !is_root {
                if let Some(score) = tt
                    .as_deref()
                    .and_then(|tt| tt.probe(frame.hash, frame.depth, frame.alpha, frame.beta))
                {
                    stats.tt_hits += 1;
                    unwind(&mut stack, score);
                    continue;
                }
            }

            let mover = if frame.maximizing { me } else { me.other() };
            frame.moves = board.valid_columns();
            order_moves(&board, &mut frame.moves, mover, me);
            continue;
        }

        // Phase 2: a child returned
        if let Some(score) = frame.returning_score.take() {
            if let Some(col) = frame.made_move.take() {
                board.lift_piece(col);
                frame.record(col, score);
            }
        }

        // Phase 3: next move, unless the window closed
        let cutoff = frame.alpha >= frame.beta;
        if cutoff {
            stats.cutoffs += 1;
        }
        if !cutoff && frame.move_index < frame.moves.len() {
            let col = frame.moves[frame.move_index];
            frame.move_index += 1;

            let mover = if frame.maximizing { me } else { me.other() };
            let Some(row) = board.drop_piece(col, mover) else {
                continue;
            };

            if board.is_winning_cell(row, col, mover) {
                board.lift_piece(col);
                let score = if frame.maximizing { WIN_SCORE } else { -WIN_SCORE };
                frame.record(col, score);
                continue;
            }

            frame.made_move = Some(col);
            let child = SearchFrame::new(frame.depth - 1, frame.alpha, frame.beta, !frame.maximizing);
            stack.push(child);
            continue;
        }

        // Phase 4: node complete
        let score = frame.best_score;
        if let Some(tt) = tt.as_deref_mut() {
            let bound = Bound::classify(score, frame.original_alpha, frame.original_beta);
            tt.store(frame.hash, score, frame.depth, bound);
        }
        if let Some(root_frame) = unwind(&mut stack, score) {
            return Some(SearchOutcome {
                score,
                column: root_frame.best_move,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(board: &Board, depth: u8, me: PlayerNumber, tt: Option<&mut TranspositionTable>) -> SearchOutcome {
        let mut stats = SearchStats::default();
        alphabeta(board, depth, me, tt, None, &mut stats).expect("No deadline, search completes")
    }

    #[test]
    fn test_finds_win_in_one() {
        let board = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0],
            [1, 1, 0, 2, 2, 2, 0],
        ]);
        let outcome = search(&board, 3, PlayerNumber::Two, None);
        assert_eq!(outcome.score, WIN_SCORE);
        assert!(matches!(outcome.column, Some(2) | Some(6)));
    }

    #[test]
    fn test_sees_forced_loss_and_blocks() {
        let board = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 2],
            [0, 0, 1, 1, 1, 0, 2],
        ]);
        // Player one threatens both ends; only one can be blocked.
        let outcome = search(&board, 2, PlayerNumber::Two, None);
        assert_eq!(outcome.score, -WIN_SCORE);

        let single = Board::from_rows([
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [2, 1, 1, 1, 0, 0, 0],
        ]);
        let outcome = search(&single, 2, PlayerNumber::Two, None);
        assert_eq!(outcome.column, Some(4));
    }

    #[test]
    fn test_counts_nodes_and_cutoffs() {
        let mut board = Board::new();
        board.drop_piece(3, PlayerNumber::One);
        let mut stats = SearchStats::default();
        let outcome = alphabeta(&board, 4, PlayerNumber::Two, None, None, &mut stats);
        assert!(outcome.is_some());
        assert!(stats.nodes > 7);
        assert!(stats.cutoffs > 0);
        assert_eq!(stats.tt_hits, 0);
    }

    #[test]
    fn test_expired_deadline_aborts() {
        let board = Board::new();
        let mut stats = SearchStats::default();
        let past = Instant::now();
        let outcome = alphabeta(&board, 8, PlayerNumber::Two, None, Some(past), &mut stats);
        assert!(outcome.is_none());
    }

    #[test]
    fn test_table_does_not_change_chosen_move() {
        let positions = [
            vec![3, 3, 2],
            vec![3, 4, 4, 2, 5],
            vec![0, 6, 1, 5, 3, 3, 4],
            vec![3, 3, 3, 3, 2, 4, 4, 2],
        ];
        for moves in positions {
            let mut board = Board::new();
            let mut player = PlayerNumber::One;
            for col in &moves {
                board.drop_piece(*col, player);
                player = player.other();
            }
            for depth in 1..=4 {
                let without = search(&board, depth, player, None);
                let mut tt = TranspositionTable::default();
                let with = search(&board, depth, player, Some(&mut tt));
                assert_eq!(with.column, without.column, "moves {moves:?} depth {depth}");
                assert_eq!(with.score, without.score, "moves {moves:?} depth {depth}");
                assert!(!tt.is_empty());
            }
        }
    }
}
