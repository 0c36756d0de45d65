//! Error types for the game server
//!
//! `SessionError` is what a player sees: its `Display` text is sent verbatim
//! in an `error` event. `ServerError` covers process startup.

use crate::store::StoreError;
use connect4_engine::GameError;
use shared::ProtocolError;
use thiserror::Error;

/// A rejected player request. Never changes game state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Rule(#[from] GameError),

    #[error("Game not found")]
    GameNotFound,

    #[error("Player not in this game")]
    NotInGame,

    #[error("Already in a game")]
    AlreadyInGame,

    #[error("Game no longer available")]
    GameNoLongerAvailable,

    #[error("Player not found")]
    PlayerNotFound,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Startup and serving failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid listen address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_keep_their_message() {
        let err: SessionError = GameError::ColumnFull.into();
        assert_eq!(err.to_string(), "Column is full");
        let err: SessionError = ProtocolError::InvalidFormat.into();
        assert_eq!(err.to_string(), "Invalid message format");
    }

    #[test]
    fn test_session_messages() {
        assert_eq!(
            SessionError::GameNoLongerAvailable.to_string(),
            "Game no longer available"
        );
        assert_eq!(SessionError::GameNotFound.to_string(), "Game not found");
    }
}
