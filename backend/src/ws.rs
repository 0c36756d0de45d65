//! WebSocket transport
//!
//! One task per socket. Inbound text frames are parsed and handed to the
//! [`GameManager`]; a writer task drains the connection's outbox. Whichever
//! half ends first ends the connection.

use crate::api::AppState;
use crate::session::GameManager;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use shared::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state.manager))
}

async fn serve_socket(socket: WebSocket, manager: Arc<GameManager>) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();
    let conn = manager.connect(outbox).await;

    let mut writer = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            let text = match msg.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("failed to encode outbound message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let reader_manager = Arc::clone(&manager);
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => continue,
            };
            match ClientMessage::parse(text.as_str()) {
                Ok(msg) => reader_manager.handle(conn, msg).await,
                Err(e) => {
                    tracing::debug!(connection = %conn, "unparseable frame");
                    reader_manager.reject(conn, e.into()).await;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    manager.disconnect(conn).await;
}
