use super::scheduler::Timer;
use super::state::{Binding, ConnectionId, SessionState};
use super::GameManager;
use crate::error::{SessionError, SessionResult};
use connect4_engine::{bot_player, Game, Player, PlayerNumber};
use serde_json::json;
use shared::{validate_username, ServerMessage};
use tokio::time::Instant;
use uuid::Uuid;

impl GameManager {
    pub(super) fn join_locked(
        &self,
        state: &mut SessionState,
        conn: ConnectionId,
        raw_username: &str,
    ) -> SessionResult<()> {
        let username = validate_username(raw_username)?;
        let connection = state
            .connections
            .get(&conn)
            .ok_or(SessionError::PlayerNotFound)?;
        if let Some(binding) = &connection.binding {
            if state.games.get(&binding.game_id).is_some_and(Game::is_playing) {
                return Err(SessionError::AlreadyInGame);
            }
        }
        // One seat or queue slot per username
        if state.username_engaged(&username, conn) {
            return Err(SessionError::AlreadyInGame);
        }

        if let Some(connection) = state.connections.get_mut(&conn) {
            connection.binding = None;
            connection.username = Some(username.clone());
        }
        state.dequeue(conn);

        if let Some(entry) = state.ledger.get(&username).cloned() {
            let live = state.games.get(&entry.game_id).is_some_and(Game::is_playing);
            if !live {
                state.ledger.remove(&username);
            } else if entry.disconnected_at.elapsed() <= self.settings.reconnect_grace {
                tracing::info!(%username, game_id = %entry.game_id, "join resumes disconnected game");
                self.restore(state, conn, &username, entry);
                return Ok(());
            } else {
                self.forfeit_entry(state, &username);
            }
        }

        self.matchmake(state, conn, username)
    }

    /// Pair with the oldest waiting player of a different name, or queue up
    fn matchmake(
        &self,
        state: &mut SessionState,
        conn: ConnectionId,
        username: String,
    ) -> SessionResult<()> {
        let opponent = state.queue.iter().copied().find_map(|waiting| {
            let name = state.connections.get(&waiting)?.username.as_ref()?;
            (*name != username).then(|| (waiting, name.clone()))
        });

        match opponent {
            Some((waiting, waiting_name)) => {
                state.dequeue(waiting);
                self.start_game(
                    state,
                    (waiting, Player::human(waiting.to_string(), waiting_name)),
                    Some((conn, Player::human(conn.to_string(), username))),
                )
            }
            None => {
                let queued_at = Instant::now();
                if let Some(connection) = state.connections.get_mut(&conn) {
                    connection.queued_at = Some(queued_at);
                }
                state.queue.push_back(conn);
                state.send(conn, ServerMessage::WaitingForOpponent {});
                self.scheduler.schedule(
                    self.settings.bot_fallback,
                    Timer::BotFallback {
                        connection: conn,
                        queued_at,
                    },
                );
                tracing::debug!(connection = %conn, %username, waiting = state.queue.len(), "queued for opponent");
                Ok(())
            }
        }
    }

    /// Seat a bot opposite `conn` if it is still waiting from `queued_at`.
    /// A later re-queue armed its own timer.
    pub(super) fn bot_fallback_locked(
        &self,
        state: &mut SessionState,
        conn: ConnectionId,
        queued_at: Instant,
    ) -> SessionResult<()> {
        let stamp = state.connections.get(&conn).and_then(|c| c.queued_at);
        if !state.queue.contains(&conn) || stamp != Some(queued_at) {
            return Ok(());
        }
        state.dequeue(conn);
        let username = state
            .connections
            .get(&conn)
            .and_then(|c| c.username.clone())
            .ok_or(SessionError::PlayerNotFound)?;
        self.start_game(state, (conn, Player::human(conn.to_string(), username)), None)
    }

    /// Create, start and announce a game. `second` of `None` seats the bot.
    fn start_game(
        &self,
        state: &mut SessionState,
        first: (ConnectionId, Player),
        second: Option<(ConnectionId, Player)>,
    ) -> SessionResult<()> {
        let game_id = Uuid::new_v4().to_string();
        let (first_conn, player1) = first;
        let (second_conn, player2) = match second {
            Some((conn, player)) => (Some(conn), player),
            None => (None, bot_player()),
        };

        let mut game = Game::new(game_id.clone(), player1, player2);
        game.start()?;

        let seats = [(first_conn, PlayerNumber::One)]
            .into_iter()
            .chain(second_conn.map(|c| (c, PlayerNumber::Two)));
        for (conn, player) in seats {
            if let Some(connection) = state.connections.get_mut(&conn) {
                connection.binding = Some(Binding {
                    game_id: game_id.clone(),
                    player,
                });
            }
            state.send(
                conn,
                ServerMessage::GameStarted {
                    game_id: game_id.clone(),
                    game_state: game.clone(),
                    your_player: player,
                },
            );
        }

        let player1 = game.player(PlayerNumber::One).username.clone();
        let player2 = game.player(PlayerNumber::Two).username.clone();
        let game_type = if game.is_bot() { "bot" } else { "pvp" };
        tracing::info!(%game_id, %player1, %player2, game_type, "game started");
        self.analytics.track_event(
            "game_started",
            json!({
                "gameId": game_id,
                "player1": player1,
                "player2": player2,
                "gameType": game_type,
            }),
        );

        state.games.insert(game_id, game);
        Ok(())
    }
}
