//! Connect-four rules engine and computer opponent
//!
//! - [`Game`] applies drops, detects wins and draws and enforces turn order.
//! - [`Bot`] picks moves: one-ply tactics first, then iterative deepening
//!   alpha-beta over a transposition table and a static evaluator.
//!
//! The crate does no I/O and holds no global state.

pub mod board;
pub mod bot;
pub mod constants;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod hash;
pub mod search;
pub mod types;

pub use board::Board;
pub use bot::{bot_player, Bot, BotConfig, BOT_ID, BOT_USERNAME};
pub use error::{GameError, GameResult};
pub use game::Game;
pub use types::{Cell, GameStatus, Move, MoveOutcome, Player, PlayerNumber};
