use super::scheduler::Timer;
use super::state::{ConnectionId, SessionState};
use super::GameManager;
use crate::error::{SessionError, SessionResult};
use crate::store::GameRecord;
use connect4_engine::constants::COLS;
use connect4_engine::{Game, PlayerNumber};
use serde_json::json;
use shared::ServerMessage;
use std::sync::Arc;

impl GameManager {
    pub(super) fn make_move_locked(
        &self,
        state: &mut SessionState,
        conn: ConnectionId,
        game_id: &str,
        column: i64,
    ) -> SessionResult<()> {
        if !state.games.contains_key(game_id) {
            return Err(SessionError::GameNotFound);
        }
        let player = match state.binding(conn) {
            Some(binding) if binding.game_id == game_id => binding.player,
            _ => return Err(SessionError::NotInGame),
        };
        // Negative columns become out of range; the rules report them once
        // status and turn have been checked.
        let column = usize::try_from(column).unwrap_or(usize::MAX);
        self.apply_move(state, game_id, column, player, "move_made")
    }

    /// Drop a piece through the rules engine and tell everyone in the game
    fn apply_move(
        &self,
        state: &mut SessionState,
        game_id: &str,
        column: usize,
        player: PlayerNumber,
        event_type: &str,
    ) -> SessionResult<()> {
        let game = state
            .games
            .get_mut(game_id)
            .ok_or(SessionError::GameNotFound)?;
        let outcome = game.make_move(column, player)?;
        let snapshot = game.clone();

        state.broadcast(
            game_id,
            &ServerMessage::MoveMade {
                column,
                row: outcome.row,
                player,
                game_state: snapshot.clone(),
            },
        );
        self.analytics.track_event(
            event_type,
            json!({
                "gameId": game_id,
                "player": snapshot.player(player).username,
                "playerNumber": player,
                "column": column,
                "row": outcome.row,
                "moveNumber": snapshot.moves().len(),
            }),
        );

        if outcome.game_over {
            self.end_game(state, game_id);
        } else if snapshot.bot_player() == Some(snapshot.current_player()) {
            self.scheduler.schedule(
                self.settings.bot_move_delay,
                Timer::BotMove {
                    game_id: game_id.to_string(),
                    move_count: snapshot.moves().len(),
                },
            );
        }
        Ok(())
    }

    /// Search outside the lock, then apply if nothing moved meanwhile
    pub(super) async fn play_bot_move(&self, game_id: String, move_count: usize) {
        let snapshot = {
            let state = self.state.lock().await;
            match state.games.get(&game_id) {
                Some(game) if bot_to_move(game, move_count) => game.clone(),
                _ => return,
            }
        };

        let bot = Arc::clone(&self.bot);
        let choice = match tokio::task::spawn_blocking(move || bot.lock().best_move(&snapshot)).await {
            Ok(choice) => choice,
            Err(e) => {
                tracing::error!(%game_id, "bot search panicked: {}", e);
                None
            }
        };

        let mut state = self.state.lock().await;
        let Some(game) = state.games.get(&game_id) else {
            return;
        };
        if !bot_to_move(game, move_count) {
            return;
        }
        let Some(seat) = game.bot_player() else {
            return;
        };
        let board = game.board();
        let column = match choice {
            Some(col) if col < COLS && !board.is_column_full(col) => col,
            _ => match (0..COLS).find(|&col| !board.is_column_full(col)) {
                Some(col) => {
                    tracing::warn!(%game_id, ?choice, fallback = col, "bot choice unusable, taking first open column");
                    col
                }
                None => return,
            },
        };

        tracing::debug!(%game_id, column, "bot moves");
        if let Err(e) = self.apply_move(&mut state, &game_id, column, seat, "bot_move") {
            tracing::warn!(%game_id, column, "bot move rejected: {}", e);
        }
        self.reap(&mut state);
    }

    /// Announce the result, persist it and schedule removal
    pub(super) fn end_game(&self, state: &mut SessionState, game_id: &str) {
        let Some(game) = state.games.get(game_id).cloned() else {
            return;
        };
        let duration = game.duration_secs();
        state.broadcast(
            game_id,
            &ServerMessage::GameEnded {
                winner: game.winner(),
                game_state: game.clone(),
                duration,
            },
        );
        state.ledger.retain(|_, entry| entry.game_id != game_id);

        let game_type = if game.is_bot() { "bot" } else { "pvp" };
        tracing::info!(%game_id, winner = ?game.winner(), duration, moves = game.moves().len(), "game ended");
        self.analytics.track_event(
            "game_ended",
            json!({
                "gameId": game_id,
                "winner": game.winner(),
                "duration": duration,
                "moves": game.moves().len(),
                "gameType": game_type,
            }),
        );
        self.persist(&game);

        self.scheduler.schedule(
            self.settings.cleanup_delay,
            Timer::GameCleanup {
                game_id: game_id.to_string(),
            },
        );
    }

    /// Save the game and update human players' stats in the background
    fn persist(&self, game: &Game) {
        let record = GameRecord::from_game(game);
        let results: Vec<(String, bool)> = [PlayerNumber::One, PlayerNumber::Two]
            .into_iter()
            .map(|seat| (game.player(seat), seat))
            .filter(|(player, _)| !player.is_bot)
            .map(|(player, seat)| (player.username.clone(), game.winner() == Some(seat)))
            .collect();

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.save_game(&record).await {
                tracing::warn!(game_id = %record.id, "failed to save game: {}", e);
            }
            for (username, won) in results {
                if let Err(e) = store.update_player_stats(&username, won).await {
                    tracing::warn!(%username, "failed to update player stats: {}", e);
                }
            }
        });
    }

    pub(super) fn cleanup_locked(&self, state: &mut SessionState, game_id: &str) {
        if !state.games.get(game_id).is_some_and(Game::is_finished) {
            return;
        }
        state.games.remove(game_id);
        state.release_game(game_id);
        state.ledger.retain(|_, entry| entry.game_id != game_id);
        tracing::debug!(%game_id, live = state.games.len(), "finished game removed");
    }
}

fn bot_to_move(game: &Game, move_count: usize) -> bool {
    game.is_playing()
        && game.bot_player() == Some(game.current_player())
        && game.moves().len() == move_count
}
