//! Server configuration
//!
//! Command line flags with environment fallbacks (a `.env` file is loaded
//! first by `main`), plus the session timings the game server runs with.

use crate::error::ServerError;
use clap::{ArgAction, Parser};
use connect4_engine::{BotConfig, PlayerNumber};
use shared::protocol::RECONNECT_SECONDS;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "backend", about = "Real-time connect-four game server")]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP/WebSocket port
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// SQLite database for finished games and player stats
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:connect4.db")]
    pub database_url: String,

    /// Record analytics events in the database
    #[arg(long, env = "ANALYTICS_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub analytics: bool,

    /// Thinking time per bot move, in milliseconds
    #[arg(long, env = "BOT_TIME_BUDGET_MS", default_value_t = 2000)]
    pub bot_time_budget_ms: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|source| ServerError::InvalidAddress { addr, source })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            bot: BotConfig {
                time_budget: Duration::from_millis(self.bot_time_budget_ms),
                player: PlayerNumber::Two,
            },
            ..SessionSettings::default()
        }
    }
}

/// Timings of the session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Wait in the queue before a bot is seated opposite
    pub bot_fallback: Duration,
    /// Pause before the bot answers a move
    pub bot_move_delay: Duration,
    /// How long a disconnected player may come back
    pub reconnect_grace: Duration,
    /// Period of the expired-disconnect sweep
    pub sweep_interval: Duration,
    /// How long a finished game stays readable
    pub cleanup_delay: Duration,
    pub bot: BotConfig,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            bot_fallback: Duration::from_secs(10),
            bot_move_delay: Duration::from_secs(1),
            reconnect_grace: Duration::from_secs(RECONNECT_SECONDS),
            sweep_interval: Duration::from_secs(30),
            cleanup_delay: Duration::from_secs(30),
            bot: BotConfig::default(),
        }
    }
}
