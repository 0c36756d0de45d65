//! WebSocket wire protocol
//!
//! Every frame is a JSON envelope `{"type": "...", "data": {...}}`. Inbound
//! frames are parsed into [`ClientMessage`] at the socket boundary; anything
//! that does not match one of its variants never reaches the game server.

use connect4_engine::{Game, PlayerNumber};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_USERNAME_LEN: usize = 2;
pub const MAX_USERNAME_LEN: usize = 20;

/// Seconds a disconnected player has to come back, as announced to the opponent
pub const RECONNECT_SECONDS: u64 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid message format")]
    InvalidFormat,

    #[error("Username must be 2-20 characters")]
    InvalidUsername,

    #[error("Username can only contain letters, numbers, _ and -")]
    InvalidUsernameCharacters,
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Client → Server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame {
        username: String,
    },
    #[serde(rename_all = "camelCase")]
    MakeMove {
        game_id: String,
        /// Signed so that out-of-range columns surface as a rule error
        column: i64,
    },
    #[serde(rename_all = "camelCase")]
    RejoinGame {
        game_id: String,
        username: String,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> ProtocolResult<Self> {
        serde_json::from_str(text).map_err(|_| ProtocolError::InvalidFormat)
    }

    /// Event name as it appears in the envelope
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::JoinGame { .. } => "join_game",
            ClientMessage::MakeMove { .. } => "make_move",
            ClientMessage::RejoinGame { .. } => "rejoin_game",
        }
    }
}

/// Server → Client
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    WaitingForOpponent {},

    #[serde(rename_all = "camelCase")]
    GameStarted {
        game_id: String,
        game_state: Game,
        your_player: PlayerNumber,
    },

    #[serde(rename_all = "camelCase")]
    GameRejoined {
        game_id: String,
        game_state: Game,
        your_player: PlayerNumber,
    },

    #[serde(rename_all = "camelCase")]
    MoveMade {
        column: usize,
        row: usize,
        player: PlayerNumber,
        game_state: Game,
    },

    #[serde(rename_all = "camelCase")]
    GameEnded {
        winner: Option<PlayerNumber>,
        game_state: Game,
        /// Seconds from creation to the final move
        duration: i64,
    },

    /// `player` is the username of the participant who dropped
    #[serde(rename_all = "camelCase")]
    PlayerDisconnected { player: String, reconnect_time: u64 },

    PlayerReconnected { player: String },

    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Trim a username and check its length and characters (`[A-Za-z0-9_-]`)
pub fn validate_username(raw: &str) -> ProtocolResult<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(ProtocolError::InvalidUsername);
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ProtocolError::InvalidUsernameCharacters);
    }
    Ok(trimmed.to_string())
}
