//! Types shared between the game server and its clients

pub mod protocol;

pub use protocol::{validate_username, ClientMessage, ProtocolError, ServerMessage};
