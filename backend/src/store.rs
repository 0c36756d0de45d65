//! Persistence for finished games, player stats and analytics events
//!
//! The game server only talks to the [`GameStore`] trait. [`SqliteStore`] is
//! the real backend; [`DisabledStore`] stands in when the database could not
//! be opened at startup so that games keep running without persistence.

use crate::analytics::AnalyticsEvent;
use async_trait::async_trait;
use connect4_engine::{Game, PlayerNumber};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not encode event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A finished game as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub id: String,
    pub player1: String,
    pub player2: String,
    /// Winning seat, `None` for a draw
    pub winner: Option<PlayerNumber>,
    pub duration_secs: i64,
    pub move_count: i64,
    pub is_bot: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl GameRecord {
    pub fn from_game(game: &Game) -> Self {
        Self {
            id: game.id().to_string(),
            player1: game.player(PlayerNumber::One).username.clone(),
            player2: game.player(PlayerNumber::Two).username.clone(),
            winner: game.winner(),
            duration_secs: game.duration_secs(),
            move_count: game.moves().len() as i64,
            is_bot: game.is_bot(),
            created_at: game.created_at(),
        }
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub username: String,
    pub games_played: i64,
    pub games_won: i64,
    pub win_rate: f64,
    pub last_played: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyGames {
    pub date: String,
    pub games: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopWinner {
    pub username: String,
    pub games_won: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSummary {
    pub is_bot: bool,
    pub count: i64,
    pub avg_duration: Option<f64>,
}

/// Aggregates served by `/api/analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_games: i64,
    pub total_players: i64,
    pub avg_game_duration: Option<f64>,
    pub games_per_day: Vec<DailyGames>,
    pub top_winners: Vec<TopWinner>,
    pub bot_vs_human: Vec<ModeSummary>,
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn save_game(&self, record: &GameRecord) -> StoreResult<()>;

    /// Count one more game for `username`, and a win if `won`
    async fn update_player_stats(&self, username: &str, won: bool) -> StoreResult<()>;

    /// Ranked by games won, then win rate, then games played
    async fn leaderboard(&self, limit: i64) -> StoreResult<Vec<PlayerStats>>;

    async fn analytics_summary(&self) -> StoreResult<AnalyticsSummary>;

    async fn record_event(&self, event: &AnalyticsEvent) -> StoreResult<()>;

    fn is_enabled(&self) -> bool {
        true
    }
}

const SCHEMA: [&str; 7] = [
    "CREATE TABLE IF NOT EXISTS games (
        id TEXT PRIMARY KEY,
        player1 TEXT NOT NULL,
        player2 TEXT NOT NULL,
        winner INTEGER,
        duration INTEGER NOT NULL,
        moves INTEGER NOT NULL,
        is_bot BOOLEAN NOT NULL DEFAULT FALSE,
        created_at DATETIME NOT NULL,
        finished_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS players (
        username TEXT PRIMARY KEY,
        games_played INTEGER NOT NULL DEFAULT 0,
        games_won INTEGER NOT NULL DEFAULT 0,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        last_played DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS analytics_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_type TEXT NOT NULL,
        game_id TEXT,
        player TEXT,
        data TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_games_created_at ON games(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_players_games_won ON players(games_won DESC)",
    "CREATE INDEX IF NOT EXISTS idx_analytics_events_type ON analytics_events(event_type)",
    "CREATE INDEX IF NOT EXISTS idx_analytics_events_created_at ON analytics_events(created_at)",
];

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and ensure the schema
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and ensure the schema
    pub async fn from_pool(pool: Pool<Sqlite>) -> StoreResult<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl GameStore for SqliteStore {
    async fn save_game(&self, record: &GameRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO games (id, player1, player2, winner, duration, moves, is_bot, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.id)
        .bind(&record.player1)
        .bind(&record.player2)
        .bind(record.winner.map(|w| i64::from(w.as_u8())))
        .bind(record.duration_secs)
        .bind(record.move_count)
        .bind(record.is_bot)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_player_stats(&self, username: &str, won: bool) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO players (username, games_played, games_won, last_played)
             VALUES ($1, 1, $2, CURRENT_TIMESTAMP)
             ON CONFLICT (username) DO UPDATE SET
                games_played = players.games_played + 1,
                games_won = players.games_won + excluded.games_won,
                last_played = CURRENT_TIMESTAMP",
        )
        .bind(username)
        .bind(i64::from(won))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn leaderboard(&self, limit: i64) -> StoreResult<Vec<PlayerStats>> {
        let rows = sqlx::query(
            "SELECT
                username,
                games_played,
                games_won,
                ROUND(CAST(games_won AS REAL) * 100.0 / MAX(games_played, 1), 1) AS win_rate,
                CAST(last_played AS TEXT) AS last_played
             FROM players
             WHERE games_played > 0
             ORDER BY games_won DESC, win_rate DESC, games_played DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let stats = rows
            .iter()
            .map(|row| {
                Ok(PlayerStats {
                    username: row.try_get("username")?,
                    games_played: row.try_get("games_played")?,
                    games_won: row.try_get("games_won")?,
                    win_rate: row.try_get("win_rate")?,
                    last_played: row
                        .try_get::<Option<String>, _>("last_played")?
                        .unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(stats)
    }

    async fn analytics_summary(&self) -> StoreResult<AnalyticsSummary> {
        let total_games: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await?;
        let total_players: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM players WHERE games_played > 0")
                .fetch_one(&self.pool)
                .await?;
        let avg_game_duration: Option<f64> =
            sqlx::query_scalar("SELECT ROUND(AVG(duration), 1) FROM games")
                .fetch_one(&self.pool)
                .await?;

        let games_per_day = sqlx::query(
            "SELECT DATE(created_at) AS date, COUNT(*) AS games
             FROM games
             WHERE DATE(created_at) >= DATE('now', '-7 days')
             GROUP BY DATE(created_at)
             ORDER BY date DESC",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(DailyGames {
                date: row.try_get::<Option<String>, _>("date")?.unwrap_or_default(),
                games: row.try_get("games")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let top_winners = sqlx::query(
            "SELECT username, games_won FROM players
             WHERE games_played > 0
             ORDER BY games_won DESC
             LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(TopWinner {
                username: row.try_get("username")?,
                games_won: row.try_get("games_won")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let bot_vs_human = sqlx::query(
            "SELECT is_bot, COUNT(*) AS count, ROUND(AVG(duration), 1) AS avg_duration
             FROM games
             GROUP BY is_bot
             ORDER BY is_bot",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(ModeSummary {
                is_bot: row.try_get("is_bot")?,
                count: row.try_get("count")?,
                avg_duration: row.try_get("avg_duration")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(AnalyticsSummary {
            total_games,
            total_players,
            avg_game_duration,
            games_per_day,
            top_winners,
            bot_vs_human,
        })
    }

    async fn record_event(&self, event: &AnalyticsEvent) -> StoreResult<()> {
        let data = serde_json::to_string(&event.data)?;
        sqlx::query(
            "INSERT INTO analytics_events (event_type, game_id, player, data, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&event.event_type)
        .bind(&event.game_id)
        .bind(&event.player)
        .bind(data)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// No-op store: writes are dropped, reads are empty
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

#[async_trait]
impl GameStore for DisabledStore {
    async fn save_game(&self, _record: &GameRecord) -> StoreResult<()> {
        Ok(())
    }

    async fn update_player_stats(&self, _username: &str, _won: bool) -> StoreResult<()> {
        Ok(())
    }

    async fn leaderboard(&self, _limit: i64) -> StoreResult<Vec<PlayerStats>> {
        Ok(Vec::new())
    }

    async fn analytics_summary(&self) -> StoreResult<AnalyticsSummary> {
        Ok(AnalyticsSummary::default())
    }

    async fn record_event(&self, _event: &AnalyticsEvent) -> StoreResult<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
