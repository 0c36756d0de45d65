//! Everything the game server tracks, guarded by one lock

use connect4_engine::{Game, PlayerNumber};
use shared::ServerMessage;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound half of a connection; the socket task drains it
pub type Outbox = UnboundedSender<ServerMessage>;

/// The game and seat a connection plays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub game_id: String,
    pub player: PlayerNumber,
}

#[derive(Debug)]
pub struct Connection {
    pub outbox: Outbox,
    /// Set once the connection has joined with a valid username
    pub username: Option<String>,
    pub binding: Option<Binding>,
    /// When the connection last entered the queue
    pub queued_at: Option<Instant>,
}

/// A participant who dropped out of a live game
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub game_id: String,
    pub player: PlayerNumber,
    pub disconnected_at: Instant,
}

#[derive(Debug, Default)]
pub(super) struct SessionState {
    pub(super) connections: HashMap<ConnectionId, Connection>,
    /// Players waiting for an opponent, oldest first
    pub(super) queue: VecDeque<ConnectionId>,
    pub(super) games: HashMap<String, Game>,
    /// Disconnected participants by username. A username holds at most one
    /// seat in a playing game, so one entry per name is enough.
    pub(super) ledger: HashMap<String, LedgerEntry>,
    /// Connections whose outbox was found closed
    pub(super) dead: Vec<ConnectionId>,
}

impl SessionState {
    /// Queue `msg` for `conn`. A closed outbox marks the connection dead.
    pub fn send(&mut self, conn: ConnectionId, msg: ServerMessage) {
        let Some(connection) = self.connections.get(&conn) else {
            return;
        };
        if connection.outbox.send(msg).is_err() && !self.dead.contains(&conn) {
            self.dead.push(conn);
        }
    }

    /// Connections currently bound to `game_id`
    pub fn participants(&self, game_id: &str) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|(_, c)| c.binding.as_ref().is_some_and(|b| b.game_id == game_id))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn broadcast(&mut self, game_id: &str, msg: &ServerMessage) {
        for conn in self.participants(game_id) {
            self.send(conn, msg.clone());
        }
    }

    /// Send to everyone in `game_id` except `skip`
    pub fn broadcast_except(&mut self, game_id: &str, skip: ConnectionId, msg: &ServerMessage) {
        for conn in self.participants(game_id) {
            if conn != skip {
                self.send(conn, msg.clone());
            }
        }
    }

    pub fn binding(&self, conn: ConnectionId) -> Option<&Binding> {
        self.connections.get(&conn).and_then(|c| c.binding.as_ref())
    }

    /// Whether a live connection other than `except` holds this seat
    pub fn seat_is_held(&self, game_id: &str, player: PlayerNumber, except: ConnectionId) -> bool {
        self.connections.iter().any(|(id, c)| {
            *id != except
                && c.binding
                    .as_ref()
                    .is_some_and(|b| b.game_id == game_id && b.player == player)
        })
    }

    /// Drop every binding to `game_id`
    pub fn release_game(&mut self, game_id: &str) {
        for connection in self.connections.values_mut() {
            if connection.binding.as_ref().is_some_and(|b| b.game_id == game_id) {
                connection.binding = None;
            }
        }
    }

    /// Whether a live connection other than `except` plays or waits as `username`
    pub fn username_engaged(&self, username: &str, except: ConnectionId) -> bool {
        self.connections.iter().any(|(id, c)| {
            if *id == except || c.username.as_deref() != Some(username) {
                return false;
            }
            let playing = c
                .binding
                .as_ref()
                .is_some_and(|b| self.games.get(&b.game_id).is_some_and(Game::is_playing));
            playing || self.queue.contains(id)
        })
    }

    pub fn dequeue(&mut self, conn: ConnectionId) {
        self.queue.retain(|c| *c != conn);
    }
}
