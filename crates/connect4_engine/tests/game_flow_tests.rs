//! Game Flow Integration Tests
//!
//! Tests for full game flows including:
//! - Turn alternation over long move sequences
//! - Gravity and column limits
//! - Bot tactics through the public `Game` API
//! - Bot move legality over whole games

use connect4_engine::constants::{COLS, ROWS};
use connect4_engine::{
    bot_player, Bot, BotConfig, Cell, Game, GameError, GameStatus, Player, PlayerNumber,
};
use std::time::Duration;

fn pvp_game() -> Game {
    let mut game = Game::new(
        "flow",
        Player::human("p1", "alice"),
        Player::human("p2", "bob"),
    );
    game.start().expect("Fresh game starts");
    game
}

fn bot_game() -> Game {
    let mut game = Game::new("flow-bot", Player::human("p1", "carol"), bot_player());
    game.start().expect("Fresh game starts");
    game
}

fn quick_bot() -> Bot {
    Bot::new(BotConfig {
        time_budget: Duration::from_millis(100),
        player: PlayerNumber::Two,
    })
}

/// Deterministic column picker so runs are reproducible
struct ColumnSequence(u64);

impl ColumnSequence {
    fn next_open(&mut self, game: &Game) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let open = game.board().valid_columns();
        open[(self.0 >> 33) as usize % open.len()]
    }
}

// ============================================================================
// Turn Alternation Tests
// ============================================================================

#[test]
fn test_current_player_alternates_until_game_ends() {
    for seed in 1..20 {
        let mut game = pvp_game();
        let mut picker = ColumnSequence(seed);
        let mut expected = PlayerNumber::One;

        while game.is_playing() {
            assert_eq!(game.current_player(), expected);
            let col = picker.next_open(&game);
            let outcome = game.make_move(col, expected).expect("Open column");
            if outcome.game_over {
                assert_eq!(game.status(), GameStatus::Finished);
                assert_eq!(outcome.winner, game.winner());
                break;
            }
            expected = expected.other();
        }

        assert!(game.is_finished());
        assert_eq!(
            game.make_move(0, game.current_player()),
            Err(GameError::GameNotActive)
        );
    }
}

#[test]
fn test_move_log_records_arrival_order() {
    let mut game = pvp_game();
    for col in [3, 4, 3, 2] {
        let player = game.current_player();
        game.make_move(col, player).expect("Legal move");
    }
    let columns: Vec<usize> = game.moves().iter().map(|m| m.column).collect();
    assert_eq!(columns, vec![3, 4, 3, 2]);
    let rows: Vec<usize> = game.moves().iter().map(|m| m.row).collect();
    assert_eq!(rows, vec![5, 5, 4, 5]);
}

// ============================================================================
// Gravity Tests
// ============================================================================

#[test]
fn test_drop_lands_in_lowest_empty_row() {
    let mut game = pvp_game();
    for expected_row in (0..ROWS).rev() {
        let player = game.current_player();
        let outcome = game.make_move(5, player).expect("Column has room");
        assert_eq!(outcome.row, expected_row);
        assert_eq!(game.board().get(expected_row, 5), player.cell());
    }
    let player = game.current_player();
    assert_eq!(game.make_move(5, player), Err(GameError::ColumnFull));
    assert!(!game.board().get(0, 5).is_empty());
    assert_eq!(game.board().get(0, 4), Cell::Empty);
}

// ============================================================================
// Bot Tactics Tests
// ============================================================================

#[test]
fn test_bot_blocks_open_three() {
    let mut game = bot_game();
    // Player 1 builds three in a row on the floor; the left end is taken.
    for (col, player) in [
        (1, PlayerNumber::One),
        (0, PlayerNumber::Two),
        (2, PlayerNumber::One),
        (6, PlayerNumber::Two),
        (3, PlayerNumber::One),
    ] {
        game.make_move(col, player).expect("Legal move");
    }

    let mut bot = quick_bot();
    assert_eq!(bot.immediate_move(&game), Some(4));
    assert_eq!(bot.best_move(&game), Some(4));
}

#[test]
fn test_bot_takes_win_over_block() {
    let mut game = bot_game();
    for (col, player) in [
        (0, PlayerNumber::One),
        (6, PlayerNumber::Two),
        (1, PlayerNumber::One),
        (6, PlayerNumber::Two),
        (2, PlayerNumber::One),
        (6, PlayerNumber::Two),
        (5, PlayerNumber::One),
    ] {
        game.make_move(col, player).expect("Legal move");
    }

    let mut bot = quick_bot();
    assert_eq!(bot.best_move(&game), Some(6));
    let outcome = game.make_move(6, PlayerNumber::Two).expect("Legal move");
    assert_eq!(outcome.winner, Some(PlayerNumber::Two));
}

#[test]
fn test_bot_never_picks_a_full_column() {
    let mut bot = quick_bot();
    for seed in 1..4 {
        let mut game = bot_game();
        let mut picker = ColumnSequence(seed);
        while game.is_playing() {
            let result = if game.current_player() == PlayerNumber::One {
                let col = picker.next_open(&game);
                game.make_move(col, PlayerNumber::One)
            } else {
                let col = bot.best_move(&game).expect("Playing game has an open column");
                assert!(col < COLS);
                assert!(!game.board().is_column_full(col));
                game.make_move(col, PlayerNumber::Two)
            };
            let outcome = result.expect("Chosen columns are legal");
            if outcome.game_over {
                break;
            }
        }
        assert!(game.is_finished());
    }
}
