//! Game entity: rules, turn order and lifecycle
//!
//! A `Game` is the unit the session layer owns. Every state change goes through
//! [`Game::make_move`], [`Game::start`] or [`Game::forfeit`], so the status and
//! turn invariants hold no matter who drives the game.

use crate::board::Board;
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    id: String,
    player1: Player,
    player2: Player,
    board: Board,
    current_player: PlayerNumber,
    status: GameStatus,
    winner: Option<PlayerNumber>,
    created_at: DateTime<Utc>,
    last_move_at: DateTime<Utc>,
    moves: Vec<Move>,
    is_bot: bool,
}

impl Game {
    /// New game in `Waiting`. Player 1 always moves first.
    pub fn new(id: impl Into<String>, player1: Player, player2: Player) -> Self {
        let now = Utc::now();
        let is_bot = player1.is_bot || player2.is_bot;
        Self {
            id: id.into(),
            player1,
            player2,
            board: Board::new(),
            current_player: PlayerNumber::One,
            status: GameStatus::Waiting,
            winner: None,
            created_at: now,
            last_move_at: now,
            moves: Vec::new(),
            is_bot,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> PlayerNumber {
        self.current_player
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<PlayerNumber> {
        self.winner
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_move_at(&self) -> DateTime<Utc> {
        self.last_move_at
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    pub fn player(&self, number: PlayerNumber) -> &Player {
        match number {
            PlayerNumber::One => &self.player1,
            PlayerNumber::Two => &self.player2,
        }
    }

    /// Seat held by `username`, if it plays in this game
    pub fn player_number(&self, username: &str) -> Option<PlayerNumber> {
        if self.player1.username == username {
            Some(PlayerNumber::One)
        } else if self.player2.username == username {
            Some(PlayerNumber::Two)
        } else {
            None
        }
    }

    /// Seat of the bot participant, if any
    pub fn bot_player(&self) -> Option<PlayerNumber> {
        if self.player1.is_bot {
            Some(PlayerNumber::One)
        } else if self.player2.is_bot {
            Some(PlayerNumber::Two)
        } else {
            None
        }
    }

    /// Waiting -> Playing
    pub fn start(&mut self) -> GameResult<()> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::GameNotActive);
        }
        self.status = GameStatus::Playing;
        Ok(())
    }

    /// Apply a drop for `player`.
    ///
    /// The win check runs from the placed cell before the turn flips; a draw is
    /// declared once the top row is filled without a winner. On error the game
    /// is left untouched.
    pub fn make_move(&mut self, column: usize, player: PlayerNumber) -> GameResult<MoveOutcome> {
        if self.status != GameStatus::Playing {
            return Err(GameError::GameNotActive);
        }
        if player != self.current_player {
            return Err(GameError::NotYourTurn);
        }
        if column >= crate::constants::COLS {
            return Err(GameError::InvalidColumn);
        }

        let row = self
            .board
            .drop_piece(column, player)
            .ok_or(GameError::ColumnFull)?;

        let now = Utc::now();
        self.moves.push(Move {
            player,
            row,
            column,
            timestamp: now,
        });
        self.last_move_at = now;

        if self.check_win(row, column, player) {
            return Ok(MoveOutcome {
                row,
                game_over: true,
                winner: Some(player),
            });
        }

        if self.board.is_full() {
            self.status = GameStatus::Finished;
            return Ok(MoveOutcome {
                row,
                game_over: true,
                winner: None,
            });
        }

        self.current_player = player.other();
        Ok(MoveOutcome {
            row,
            game_over: false,
            winner: None,
        })
    }

    /// Whether the piece at (`row`, `col`) completes a line for `player`.
    /// A positive check finishes the game with `player` as winner.
    pub fn check_win(&mut self, row: usize, col: usize, player: PlayerNumber) -> bool {
        if !self.board.is_winning_cell(row, col, player) {
            return false;
        }
        self.winner = Some(player);
        self.status = GameStatus::Finished;
        true
    }

    /// End a playing game with `loser`'s opponent as winner.
    pub fn forfeit(&mut self, loser: PlayerNumber) -> GameResult<PlayerNumber> {
        if self.status != GameStatus::Playing {
            return Err(GameError::GameNotActive);
        }
        let winner = loser.other();
        self.winner = Some(winner);
        self.status = GameStatus::Finished;
        self.last_move_at = Utc::now();
        Ok(winner)
    }

    /// Seconds from creation to the last move for finished games, to now otherwise
    pub fn duration_secs(&self) -> i64 {
        let end = if self.is_finished() {
            self.last_move_at
        } else {
            Utc::now()
        };
        (end - self.created_at).num_seconds().max(0)
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn started() -> Game {
        let mut game = Game::new(
            "g-1",
            Player::human("a", "alice"),
            Player::human("b", "bob"),
        );
        game.start().expect("Should start");
        game
    }

    #[test]
    fn test_new_game_waits_with_player_one_to_move() {
        let game = Game::new("g", Player::human("a", "alice"), Player::human("b", "bob"));
        assert_eq!(game.status(), GameStatus::Waiting);
        assert_eq!(game.current_player(), PlayerNumber::One);
        assert!(!game.is_bot());
    }

    #[test]
    fn test_moves_rejected_before_start() {
        let mut game = Game::new("g", Player::human("a", "alice"), Player::human("b", "bob"));
        assert_eq!(
            game.make_move(3, PlayerNumber::One),
            Err(GameError::GameNotActive)
        );
    }

    #[test]
    fn test_start_only_from_waiting() {
        let mut game = started();
        assert_eq!(game.start(), Err(GameError::GameNotActive));
    }

    #[test]
    fn test_turn_alternates_after_each_move() {
        let mut game = started();
        let columns = [3, 3, 2, 4, 0, 6];
        let mut expected = PlayerNumber::One;
        for col in columns {
            assert_eq!(game.current_player(), expected);
            let outcome = game.make_move(col, expected).expect("Legal move");
            assert!(!outcome.game_over);
            expected = expected.other();
        }
        assert_eq!(game.moves().len(), columns.len());
    }

    #[test]
    fn test_wrong_player_is_rejected_without_mutation() {
        let mut game = started();
        let before = game.clone();
        assert_eq!(
            game.make_move(0, PlayerNumber::Two),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_invalid_and_full_columns() {
        let mut game = started();
        assert_eq!(
            game.make_move(COLS, PlayerNumber::One),
            Err(GameError::InvalidColumn)
        );

        let mut player = PlayerNumber::One;
        for _ in 0..ROWS {
            game.make_move(0, player).expect("Column has room");
            player = player.other();
        }
        let before = game.clone();
        assert_eq!(game.make_move(0, player), Err(GameError::ColumnFull));
        assert_eq!(game, before);
    }

    #[test]
    fn test_vertical_four_by_harness_finishes_game() {
        let mut game = started();
        for expected_row in [5, 4, 3, 2] {
            let row = game
                .board_mut()
                .drop_piece(3, PlayerNumber::One)
                .expect("Column has room");
            assert_eq!(row, expected_row);
        }
        assert!(game.check_win(2, 3, PlayerNumber::One));
        assert_eq!(game.winner(), Some(PlayerNumber::One));
        assert_eq!(game.status(), GameStatus::Finished);
    }

    #[test]
    fn test_winning_move_keeps_turn_and_finishes() {
        let mut game = started();
        for col in [0, 6, 1, 6, 2, 5] {
            let player = game.current_player();
            game.make_move(col, player).expect("Legal move");
        }
        let outcome = game.make_move(3, PlayerNumber::One).expect("Legal move");
        assert!(outcome.game_over);
        assert_eq!(outcome.winner, Some(PlayerNumber::One));
        assert_eq!(game.current_player(), PlayerNumber::One);
        assert_eq!(
            game.make_move(4, PlayerNumber::Two),
            Err(GameError::GameNotActive)
        );
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let mut game = started();
        // Column pairs filled in this order never line up four.
        let order = [0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 2, 3, 2, 3, 2, 3, 3, 2, 3, 2, 3, 2, 4, 5,
            4, 5, 4, 5, 5, 4, 5, 4, 5, 4, 6, 6, 6, 6, 6, 6];
        let mut last = None;
        for col in order {
            let player = game.current_player();
            last = Some(game.make_move(col, player).expect("Legal move"));
        }
        let last = last.expect("Moves were made");
        assert!(last.game_over);
        assert_eq!(last.winner, None);
        assert_eq!(game.status(), GameStatus::Finished);
        assert_eq!(
            game.make_move(0, game.current_player()),
            Err(GameError::GameNotActive)
        );
    }

    #[test]
    fn test_forfeit_declares_opponent() {
        let mut game = started();
        assert_eq!(game.forfeit(PlayerNumber::One), Ok(PlayerNumber::Two));
        assert_eq!(game.winner(), Some(PlayerNumber::Two));
        assert!(game.is_finished());
        assert_eq!(game.forfeit(PlayerNumber::Two), Err(GameError::GameNotActive));
    }

    #[test]
    fn test_player_lookup_by_username() {
        let game = started();
        assert_eq!(game.player_number("alice"), Some(PlayerNumber::One));
        assert_eq!(game.player_number("bob"), Some(PlayerNumber::Two));
        assert_eq!(game.player_number("carol"), None);
        assert_eq!(game.player(PlayerNumber::Two).username, "bob");
    }

    #[test]
    fn test_game_state_json_is_camel_case() {
        let game = started();
        let json = serde_json::to_value(&game).expect("Should serialize");
        assert_eq!(json["currentPlayer"], 1);
        assert_eq!(json["status"], "playing");
        assert!(json["winner"].is_null());
        assert_eq!(json["player1"]["username"], "alice");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastMoveAt").is_some());
    }
}
