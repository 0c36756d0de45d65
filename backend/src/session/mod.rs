//! The game server's session state machine
//!
//! [`GameManager`] owns every live connection, the matchmaking queue, the
//! game table and the ledger of players who dropped mid-game. All of it sits
//! behind one lock; each inbound event takes the lock once, mutates, queues
//! outbound messages and returns.
//!
//! Per connection:
//!
//! ```text
//! Unjoined -> Waiting -> Playing -> Disconnected (grace) -> Playing | Finished
//! ```
//!
//! Deferred work (bot fallback, bot replies, the disconnect sweep and game
//! cleanup) goes through the [`Scheduler`]. Timers carry only identifiers and
//! re-check their precondition when they fire.

mod matchmaking;
mod play;
mod reconnect;
pub mod scheduler;
mod state;

pub use scheduler::{Scheduler, Timer};
pub use state::{ConnectionId, Outbox};

use crate::analytics::EventSink;
use crate::config::SessionSettings;
use crate::error::SessionError;
use crate::store::GameStore;
use connect4_engine::{Bot, Game};
use serde::Serialize;
use shared::{ClientMessage, ServerMessage};
use state::{Connection, SessionState};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Mutex};

/// Point-in-time counters for the health endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub connections: usize,
    pub waiting: usize,
    pub active_games: usize,
    pub disconnected: usize,
}

pub struct GameManager {
    state: Mutex<SessionState>,
    /// Searched on the blocking pool; the lock serializes searches
    bot: Arc<parking_lot::Mutex<Bot>>,
    store: Arc<dyn GameStore>,
    analytics: Arc<dyn EventSink>,
    scheduler: Scheduler,
    settings: SessionSettings,
}

impl GameManager {
    /// Build the manager and start its timer driver and disconnect sweep.
    /// Both stop once the last `Arc` is dropped.
    pub fn start(
        settings: SessionSettings,
        store: Arc<dyn GameStore>,
        analytics: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        let (scheduler, timers) = Scheduler::new();
        let manager = Arc::new(Self {
            state: Mutex::new(SessionState::default()),
            bot: Arc::new(parking_lot::Mutex::new(Bot::new(settings.bot))),
            store,
            analytics,
            scheduler,
            settings,
        });

        tokio::spawn(drive_timers(Arc::downgrade(&manager), timers));
        manager
            .scheduler
            .every(settings.sweep_interval, Timer::DisconnectSweep);

        tracing::info!(
            bot_fallback = ?settings.bot_fallback,
            reconnect_grace = ?settings.reconnect_grace,
            bot_budget = ?settings.bot.time_budget,
            "game manager started"
        );
        manager
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Register a new connection; `outbox` receives everything sent to it
    pub async fn connect(&self, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId::new();
        let mut state = self.state.lock().await;
        state.connections.insert(
            id,
            Connection {
                outbox,
                username: None,
                binding: None,
                queued_at: None,
            },
        );
        tracing::debug!(connection = %id, total = state.connections.len(), "connection registered");
        id
    }

    /// Dispatch one inbound event
    pub async fn handle(&self, conn: ConnectionId, msg: ClientMessage) {
        tracing::trace!(connection = %conn, kind = msg.kind(), "inbound event");
        match msg {
            ClientMessage::JoinGame { username } => self.join_game(conn, &username).await,
            ClientMessage::MakeMove { game_id, column } => {
                self.make_move(conn, &game_id, column).await
            }
            ClientMessage::RejoinGame { game_id, username } => {
                self.rejoin_game(conn, &game_id, &username).await
            }
        }
    }

    pub async fn join_game(&self, conn: ConnectionId, username: &str) {
        let mut state = self.state.lock().await;
        let result = self.join_locked(&mut state, conn, username);
        self.finish(&mut state, conn, "join_game", result);
    }

    pub async fn make_move(&self, conn: ConnectionId, game_id: &str, column: i64) {
        let mut state = self.state.lock().await;
        let result = self.make_move_locked(&mut state, conn, game_id, column);
        self.finish(&mut state, conn, "make_move", result);
    }

    pub async fn rejoin_game(&self, conn: ConnectionId, game_id: &str, username: &str) {
        let mut state = self.state.lock().await;
        let result = self.rejoin_locked(&mut state, conn, game_id, username);
        self.finish(&mut state, conn, "rejoin_game", result);
    }

    /// Send `err` to `conn` without touching any game
    pub async fn reject(&self, conn: ConnectionId, err: SessionError) {
        let mut state = self.state.lock().await;
        self.finish(&mut state, conn, "frame", Err(err));
    }

    pub async fn disconnect(&self, conn: ConnectionId) {
        let mut state = self.state.lock().await;
        self.disconnect_locked(&mut state, conn);
        self.reap(&mut state);
    }

    /// Forfeit every disconnected player whose grace has run out
    pub async fn sweep(&self) {
        let mut state = self.state.lock().await;
        self.sweep_locked(&mut state);
        self.reap(&mut state);
    }

    /// Snapshot of a live or recently finished game
    pub async fn game(&self, game_id: &str) -> Option<Game> {
        self.state.lock().await.games.get(game_id).cloned()
    }

    pub async fn stats(&self) -> SessionStats {
        let state = self.state.lock().await;
        SessionStats {
            connections: state.connections.len(),
            waiting: state.queue.len(),
            active_games: state.games.values().filter(|g| g.is_playing()).count(),
            disconnected: state.ledger.len(),
        }
    }

    async fn fire(self: Arc<Self>, timer: Timer) {
        tracing::trace!(?timer, "timer fired");
        match timer {
            Timer::BotMove {
                game_id,
                move_count,
            } => self.play_bot_move(game_id, move_count).await,
            Timer::BotFallback {
                connection,
                queued_at,
            } => {
                let mut state = self.state.lock().await;
                if let Err(e) = self.bot_fallback_locked(&mut state, connection, queued_at) {
                    tracing::warn!(connection = %connection, "bot fallback failed: {}", e);
                }
                self.reap(&mut state);
            }
            Timer::GameCleanup { game_id } => {
                let mut state = self.state.lock().await;
                self.cleanup_locked(&mut state, &game_id);
            }
            Timer::DisconnectSweep => self.sweep().await,
        }
    }

    /// Report a failed request to its sender, then drop dead connections
    fn finish(
        &self,
        state: &mut SessionState,
        conn: ConnectionId,
        kind: &str,
        result: Result<(), SessionError>,
    ) {
        if let Err(e) = result {
            tracing::debug!(connection = %conn, kind, "request rejected: {}", e);
            state.send(conn, ServerMessage::error(e.to_string()));
        }
        self.reap(state);
    }

    /// A failed write counts as a disconnect
    fn reap(&self, state: &mut SessionState) {
        while let Some(conn) = state.dead.pop() {
            tracing::debug!(connection = %conn, "outbox closed, disconnecting");
            self.disconnect_locked(state, conn);
        }
    }
}

async fn drive_timers(manager: Weak<GameManager>, mut timers: mpsc::UnboundedReceiver<Timer>) {
    while let Some(timer) = timers.recv().await {
        let Some(manager) = manager.upgrade() else {
            break;
        };
        tokio::spawn(manager.fire(timer));
    }
    tracing::debug!("timer driver stopped");
}
