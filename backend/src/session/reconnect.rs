use super::state::{Binding, ConnectionId, LedgerEntry, SessionState};
use super::GameManager;
use crate::error::{SessionError, SessionResult};
use connect4_engine::Game;
use serde_json::json;
use shared::{validate_username, ServerMessage};
use tokio::time::Instant;

impl GameManager {
    pub(super) fn disconnect_locked(&self, state: &mut SessionState, conn: ConnectionId) {
        let Some(connection) = state.connections.remove(&conn) else {
            return;
        };
        state.dequeue(conn);
        state.dead.retain(|c| *c != conn);
        tracing::debug!(connection = %conn, username = ?connection.username, "connection closed");

        let Some(Binding { game_id, player }) = connection.binding else {
            return;
        };
        let Some(game) = state.games.get(&game_id) else {
            return;
        };
        if !game.is_playing() || state.seat_is_held(&game_id, player, conn) {
            return;
        }

        let username = game.player(player).username.clone();
        state.ledger.insert(
            username.clone(),
            LedgerEntry {
                game_id: game_id.clone(),
                player,
                disconnected_at: Instant::now(),
            },
        );
        tracing::info!(%username, %game_id, "player disconnected mid-game");

        state.broadcast(
            &game_id,
            &ServerMessage::PlayerDisconnected {
                player: username.clone(),
                reconnect_time: self.settings.reconnect_grace.as_secs(),
            },
        );
        self.analytics.track_event(
            "player_disconnected",
            json!({
                "gameId": game_id,
                "player": username,
                "playerNumber": player,
            }),
        );
    }

    pub(super) fn rejoin_locked(
        &self,
        state: &mut SessionState,
        conn: ConnectionId,
        game_id: &str,
        raw_username: &str,
    ) -> SessionResult<()> {
        let username = validate_username(raw_username)?;
        if !state.connections.contains_key(&conn) {
            return Err(SessionError::PlayerNotFound);
        }

        let entry = match state.ledger.get(&username) {
            Some(entry) if entry.game_id == game_id => entry.clone(),
            _ => return Err(SessionError::GameNoLongerAvailable),
        };
        if entry.disconnected_at.elapsed() > self.settings.reconnect_grace {
            self.forfeit_entry(state, &username);
            return Err(SessionError::GameNoLongerAvailable);
        }
        if !state.games.get(game_id).is_some_and(Game::is_playing) {
            state.ledger.remove(&username);
            return Err(SessionError::GameNoLongerAvailable);
        }
        if let Some(binding) = state.binding(conn) {
            if binding.game_id != game_id
                && state.games.get(&binding.game_id).is_some_and(Game::is_playing)
            {
                return Err(SessionError::AlreadyInGame);
            }
        }

        state.dequeue(conn);
        self.restore(state, conn, &username, entry);
        Ok(())
    }

    /// Put `username` back in the seat its ledger entry recorded
    pub(super) fn restore(
        &self,
        state: &mut SessionState,
        conn: ConnectionId,
        username: &str,
        entry: LedgerEntry,
    ) {
        state.ledger.remove(username);
        if let Some(connection) = state.connections.get_mut(&conn) {
            connection.username = Some(username.to_string());
            connection.binding = Some(Binding {
                game_id: entry.game_id.clone(),
                player: entry.player,
            });
        }
        let Some(game) = state.games.get(&entry.game_id).cloned() else {
            return;
        };

        state.send(
            conn,
            ServerMessage::GameRejoined {
                game_id: entry.game_id.clone(),
                game_state: game,
                your_player: entry.player,
            },
        );
        state.broadcast_except(
            &entry.game_id,
            conn,
            &ServerMessage::PlayerReconnected {
                player: username.to_string(),
            },
        );

        let away = entry.disconnected_at.elapsed().as_secs();
        tracing::info!(%username, game_id = %entry.game_id, away_secs = away, "player rejoined");
        self.analytics.track_event(
            "player_rejoined",
            json!({
                "gameId": entry.game_id,
                "player": username,
                "playerNumber": entry.player,
                "awaySeconds": away,
            }),
        );
    }

    /// Clear `username`'s ledger entry; a game still playing goes to the opponent
    pub(super) fn forfeit_entry(&self, state: &mut SessionState, username: &str) {
        let Some(entry) = state.ledger.remove(username) else {
            return;
        };
        let Some(game) = state.games.get_mut(&entry.game_id) else {
            return;
        };
        let Ok(winner) = game.forfeit(entry.player) else {
            return;
        };

        tracing::info!(%username, game_id = %entry.game_id, ?winner, "reconnect grace expired, game forfeited");
        self.analytics.track_event(
            "game_forfeited",
            json!({
                "gameId": entry.game_id,
                "player": username,
                "winner": winner,
            }),
        );
        self.end_game(state, &entry.game_id);
    }

    pub(super) fn sweep_locked(&self, state: &mut SessionState) {
        let grace = self.settings.reconnect_grace;
        let expired: Vec<String> = state
            .ledger
            .iter()
            .filter(|(_, entry)| entry.disconnected_at.elapsed() > grace)
            .map(|(username, _)| username.clone())
            .collect();
        if expired.is_empty() {
            return;
        }
        tracing::debug!(count = expired.len(), "sweeping expired disconnects");
        for username in expired {
            self.forfeit_entry(state, &username);
        }
    }
}
