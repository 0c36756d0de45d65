//! # Core Types
//!
//! The engine works on a tiny fixed board, so everything here is `Copy` and
//! cheap to clone: a search clones the board once and then mutates it in place
//! with drop/lift pairs.
//!
//! ## Encoding
//!
//! Cells and player numbers travel over the wire as plain integers so that a
//! client can render `board[row][col]` directly:
//!
//! | Value | `Cell`    | `PlayerNumber` |
//! |-------|-----------|----------------|
//! | 0     | `Empty`   | -              |
//! | 1     | `Player1` | `One`          |
//! | 2     | `Player2` | `Two`          |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content of one board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Player1,
    Player2,
}

impl Cell {
    /// Digit used by the canonical base-3 hash
    pub const fn digit(self) -> u64 {
        match self {
            Cell::Empty => 0,
            Cell::Player1 => 1,
            Cell::Player2 => 2,
        }
    }

    /// The player owning this cell, if any
    pub fn owner(self) -> Option<PlayerNumber> {
        match self {
            Cell::Empty => None,
            Cell::Player1 => Some(PlayerNumber::One),
            Cell::Player2 => Some(PlayerNumber::Two),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell.digit() as u8
    }
}

impl TryFrom<u8> for Cell {
    type Error = InvalidEncoding;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Player1),
            2 => Ok(Cell::Player2),
            other => Err(InvalidEncoding(other)),
        }
    }
}

/// Seat of a player in a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PlayerNumber {
    One,
    Two,
}

impl PlayerNumber {
    /// The opponent's seat
    pub const fn other(self) -> Self {
        match self {
            PlayerNumber::One => PlayerNumber::Two,
            PlayerNumber::Two => PlayerNumber::One,
        }
    }

    /// Cell value this player's pieces occupy
    pub const fn cell(self) -> Cell {
        match self {
            PlayerNumber::One => Cell::Player1,
            PlayerNumber::Two => Cell::Player2,
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            PlayerNumber::One => 1,
            PlayerNumber::Two => 2,
        }
    }
}

impl From<PlayerNumber> for u8 {
    fn from(player: PlayerNumber) -> Self {
        player.as_u8()
    }
}

impl TryFrom<u8> for PlayerNumber {
    type Error = InvalidEncoding;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerNumber::One),
            2 => Ok(PlayerNumber::Two),
            other => Err(InvalidEncoding(other)),
        }
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Integer that does not name a cell or player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEncoding(pub u8);

impl fmt::Display for InvalidEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell or player value {}", self.0)
    }
}

/// Lifecycle of a game. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// A participant. Usernames are the durable identity across reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub username: String,
    pub is_bot: bool,
}

impl Player {
    pub fn human(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            is_bot: false,
        }
    }
}

/// One accepted drop, in arrival order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub player: PlayerNumber,
    pub row: usize,
    pub column: usize,
    pub timestamp: DateTime<Utc>,
}

/// Result of an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Row the piece landed in
    pub row: usize,
    /// Whether this move finished the game (win or draw)
    pub game_over: bool,
    /// Winner, when the move completed four in a row
    pub winner: Option<PlayerNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_number_other() {
        assert_eq!(PlayerNumber::One.other(), PlayerNumber::Two);
        assert_eq!(PlayerNumber::Two.other(), PlayerNumber::One);
    }

    #[test]
    fn test_cell_serializes_as_digit() {
        let json = serde_json::to_string(&[Cell::Empty, Cell::Player1, Cell::Player2])
            .expect("Should serialize");
        assert_eq!(json, "[0,1,2]");
    }

    #[test]
    fn test_player_number_rejects_unknown_value() {
        let parsed: Result<PlayerNumber, _> = serde_json::from_str("3");
        assert!(parsed.is_err());
        let parsed: PlayerNumber = serde_json::from_str("2").expect("Should deserialize");
        assert_eq!(parsed, PlayerNumber::Two);
    }

    #[test]
    fn test_status_is_lowercase_on_the_wire() {
        let json = serde_json::to_string(&GameStatus::Playing).expect("Should serialize");
        assert_eq!(json, "\"playing\"");
    }

    #[test]
    fn test_player_json_shape() {
        let player = Player::human("p-1", "alice");
        let json = serde_json::to_value(&player).expect("Should serialize");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["isBot"], false);
    }
}
