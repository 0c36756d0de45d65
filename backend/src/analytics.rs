//! Gameplay analytics events
//!
//! The game server reports what happens through an [`EventSink`]. Sinks must
//! never block or fail the caller: a lost event is logged and forgotten.

use crate::store::GameStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub event_type: String,
    pub game_id: Option<String>,
    pub player: Option<String>,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Stamp an event now. `gameId` and `player` (or `player1`) are lifted
    /// out of `data` for indexing.
    pub fn new(event_type: &str, data: Value) -> Self {
        let field = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
        let game_id = field("gameId");
        let player = field("player").or_else(|| field("player1"));
        Self {
            event_type: event_type.to_string(),
            game_id,
            player,
            data,
            timestamp: Utc::now(),
        }
    }
}

pub trait EventSink: Send + Sync {
    fn track_event(&self, event_type: &str, data: Value);
}

/// Writes events to the store on a background task
pub struct StoreEventSink {
    store: Arc<dyn GameStore>,
}

impl StoreEventSink {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }
}

impl EventSink for StoreEventSink {
    fn track_event(&self, event_type: &str, data: Value) {
        let event = AnalyticsEvent::new(event_type, data);
        tracing::debug!(event_type = %event.event_type, game_id = ?event.game_id, "analytics event");

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(event_type = %event.event_type, "no runtime, analytics event dropped");
            return;
        };
        let store = Arc::clone(&self.store);
        handle.spawn(async move {
            if let Err(e) = store.record_event(&event).await {
                tracing::warn!(event_type = %event.event_type, "failed to record analytics event: {}", e);
            }
        });
    }
}

/// Analytics disabled: events only reach the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn track_event(&self, event_type: &str, data: Value) {
        tracing::info!(event_type, %data, "analytics event");
    }
}
