//! The computer opponent
//!
//! A `Bot` owns its transposition table, so one instance must not be searched
//! from two threads at once. Callers that share a bot wrap it in a mutex.

use crate::board::Board;
use crate::constants::*;
use crate::game::Game;
use crate::hash::TranspositionTable;
use crate::search::{immediate_move, iterative_deepening, SearchReport};
use crate::types::{Player, PlayerNumber};
use std::time::Duration;

pub const BOT_ID: &str = "bot";
pub const BOT_USERNAME: &str = "AI Bot";

/// The synthetic player that sits in the bot's seat
pub fn bot_player() -> Player {
    Player {
        id: BOT_ID.to_string(),
        username: BOT_USERNAME.to_string(),
        is_bot: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotConfig {
    /// Wall-clock budget for one iterative deepening run
    pub time_budget: Duration,
    /// Seat the bot plays
    pub player: PlayerNumber,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            time_budget: DEFAULT_TIME_BUDGET,
            player: PlayerNumber::Two,
        }
    }
}

#[derive(Debug, Default)]
pub struct Bot {
    config: BotConfig,
    tt: TranspositionTable,
    last_report: Option<SearchReport>,
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            tt: TranspositionTable::default(),
            last_report: None,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Report of the most recent search, if `best_move` had to search
    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }

    /// Win, block or fork, if one exists
    pub fn immediate_move(&self, game: &Game) -> Option<usize> {
        immediate_move(game.board(), self.config.player)
    }

    /// Column the bot plays in `game`, `None` when no column is open
    pub fn best_move(&mut self, game: &Game) -> Option<usize> {
        self.best_move_on(game.board())
    }

    pub fn best_move_on(&mut self, board: &Board) -> Option<usize> {
        let valid = board.valid_columns();
        if valid.is_empty() {
            return None;
        }

        let me = self.config.player;
        if let Some(col) = immediate_move(board, me) {
            tracing::debug!(column = col, "bot plays tactical move");
            self.last_report = None;
            return Some(col);
        }

        let max_depth = depth_for_empty_cells(board.empty_count());
        let report = iterative_deepening(board, me, max_depth, self.config.time_budget, &mut self.tt);
        tracing::debug!(
            column = ?report.column,
            score = report.score,
            depth = report.depth,
            max_depth,
            nodes = report.stats.nodes,
            cutoffs = report.stats.cutoffs,
            tt_hits = report.stats.tt_hits,
            tt_entries = self.tt.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "bot search finished"
        );
        self.last_report = Some(report);

        match report.column {
            Some(col) if valid.contains(&col) => Some(col),
            _ => CENTER_ORDER.iter().copied().find(|col| valid.contains(col)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot_game() -> Game {
        let mut game = Game::new("g", Player::human("h", "human"), bot_player());
        game.start().expect("Should start");
        game
    }

    fn fast_bot() -> Bot {
        Bot::new(BotConfig {
            time_budget: Duration::from_millis(200),
            player: PlayerNumber::Two,
        })
    }

    #[test]
    fn test_bot_player_identity() {
        let player = bot_player();
        assert_eq!(player.id, "bot");
        assert_eq!(player.username, "AI Bot");
        assert!(player.is_bot);
        assert!(bot_game().is_bot());
        assert_eq!(bot_game().bot_player(), Some(PlayerNumber::Two));
    }

    #[test]
    fn test_searches_when_no_tactic_applies() {
        let mut game = bot_game();
        game.make_move(3, PlayerNumber::One).expect("Legal move");
        let mut bot = fast_bot();
        let col = bot.best_move(&game).expect("Board has moves");
        assert!(col < COLS);
        let report = bot.last_report().expect("Search ran");
        assert!(report.depth >= 1);
    }

    #[test]
    fn test_no_move_on_full_board() {
        let mut board = Board::new();
        for col in 0..COLS {
            for row in 0..ROWS {
                let p = if (row / 3 + col) % 2 == 0 {
                    PlayerNumber::One
                } else {
                    PlayerNumber::Two
                };
                board.drop_piece(col, p);
            }
        }
        let mut bot = fast_bot();
        assert_eq!(bot.best_move_on(&board), None);
    }
}
