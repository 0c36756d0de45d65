use crate::session::{GameManager, SessionStats};
use crate::store::{AnalyticsSummary, GameStore, PlayerStats};
use crate::ws;
use axum::{
    extract::{Json, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<GameManager>,
    // Read side of persistence; the manager holds the same store for writes
    pub store: Arc<dyn GameStore>,
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    // Kept as text so a malformed limit falls back instead of failing the request
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub persistence: bool,
    #[serde(flatten)]
    pub sessions: SessionStats,
}

pub fn router(manager: Arc<GameManager>, store: Arc<dyn GameStore>) -> Router {
    let state = AppState { manager, store };

    Router::new()
        .route("/ws", get(ws::upgrade))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/analytics", get(analytics))
        .route("/health", get(health))
        .with_state(state)
}

fn leaderboard_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.min(MAX_LEADERBOARD_LIMIT))
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<PlayerStats>> {
    let limit = leaderboard_limit(query.limit.as_deref());
    match state.store.leaderboard(limit).await {
        Ok(rows) => Json(rows),
        Err(e) => {
            tracing::warn!(limit, "leaderboard query failed: {}", e);
            Json(Vec::new())
        }
    }
}

async fn analytics(State(state): State<AppState>) -> Json<AnalyticsSummary> {
    match state.store.analytics_summary().await {
        Ok(summary) => Json(summary),
        Err(e) => {
            tracing::warn!("analytics query failed: {}", e);
            Json(AnalyticsSummary::default())
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        persistence: state.store.is_enabled(),
        sessions: state.manager.stats().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_limit_defaults() {
        assert_eq!(leaderboard_limit(None), DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(leaderboard_limit(Some("abc")), DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(leaderboard_limit(Some("0")), DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(leaderboard_limit(Some("-5")), DEFAULT_LEADERBOARD_LIMIT);
    }

    #[test]
    fn test_leaderboard_limit_parses() {
        assert_eq!(leaderboard_limit(Some("3")), 3);
        assert_eq!(leaderboard_limit(Some(" 25 ")), 25);
        assert_eq!(leaderboard_limit(Some("5000")), MAX_LEADERBOARD_LIMIT);
    }
}
