//! Real-time connect-four game server
//!
//! Players connect over a WebSocket at `/ws`, get matched (or seated against
//! the bot after a wait) and play through the [`session::GameManager`].
//! Finished games, player stats and analytics events go to a [`store::GameStore`].

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod ws;
