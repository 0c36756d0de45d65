//! Error types for the board engine
//!
//! Every rule violation a player can trigger maps to one variant. The
//! `Display` text is what the player sees in an `error` event.

use thiserror::Error;

/// Rule violations reported by [`crate::Game::make_move`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The game is not in the `Playing` state
    #[error("Game not active")]
    GameNotActive,

    /// The move was submitted by the player who is not on turn
    #[error("Not your turn")]
    NotYourTurn,

    /// Column index outside `0..7`
    #[error("Invalid column")]
    InvalidColumn,

    /// The column has no empty cell left
    #[error("Column is full")]
    ColumnFull,
}

/// Result type alias for board engine operations
pub type GameResult<T> = Result<T, GameError>;
