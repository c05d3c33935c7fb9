use async_trait::async_trait;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream, StreamExt};
use futures::SinkExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::application::ports::{CompletionClient, EventSink, Retriever, ServerEvent};
use crate::domain::{ConnectionId, ThreadId};
use crate::infrastructure::observability::sanitize_message;
use crate::presentation::state::AppState;

const EVENT_BUFFER: usize = 64;

/// Client-to-server frames, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Auth { token: String },
    ChatMessage {
        thread_id: Option<Uuid>,
        message: String,
    },
}

/// Sends events to one connection through the writer task. Best effort:
/// once the client is gone, events are dropped without failing the
/// in-flight message cycle.
struct ChannelEventSink {
    tx: mpsc::Sender<ServerEvent>,
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: ServerEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("Connection closed, dropping event");
        }
    }
}

pub async fn ws_handler<C, R>(
    State(state): State<AppState<C, R>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    ws.on_upgrade(move |socket| handle_connection(state, socket))
}

/// One task per connection. The handshake must authenticate before
/// anything else; afterwards messages are processed strictly one at a
/// time in arrival order, so two generations never overlap on the same
/// connection.
async fn handle_connection<C, R>(state: AppState<C, R>, socket: WebSocket)
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    let connection_id = ConnectionId::new();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let writer = tokio::spawn(forward_events(ws_sender, rx));
    let sink = ChannelEventSink { tx };

    if !handshake(&state, connection_id, &mut ws_receiver).await {
        tracing::info!(connection_id = %connection_id, "Handshake refused");
        sink.emit(ServerEvent::unauthenticated()).await;
        drop(sink);
        let _ = writer.await;
        return;
    }

    sink.emit(ServerEvent::authenticated()).await;
    tracing::info!(connection_id = %connection_id, "Connection authenticated");

    while let Some(frame) = ws_receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::ChatMessage { thread_id, message }) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    message = %sanitize_message(&message),
                    "Processing chat message"
                );
                state
                    .conversation_service
                    .process_message(
                        connection_id,
                        thread_id.map(ThreadId::from_uuid),
                        &message,
                        &sink,
                    )
                    .await;
            }
            // Already authenticated; a repeated auth frame is a no-op.
            Ok(ClientMessage::Auth { .. }) => {}
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "Unparseable frame");
                sink.emit(ServerEvent::failure("Malformed message")).await;
            }
        }
    }

    state.sessions.unbind(connection_id);
    tracing::info!(connection_id = %connection_id, "Connection closed");
    drop(sink);
    let _ = writer.await;
}

/// The first frame must carry a valid token; anything else refuses the
/// connection instead of admitting it unauthenticated.
async fn handshake<C, R>(
    state: &AppState<C, R>,
    connection_id: ConnectionId,
    receiver: &mut SplitStream<WebSocket>,
) -> bool
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    let Some(Ok(Message::Text(text))) = receiver.next().await else {
        return false;
    };
    let Ok(ClientMessage::Auth { token }) = serde_json::from_str::<ClientMessage>(&text) else {
        return false;
    };
    match state.identity_verifier.verify(&token) {
        Ok(user_id) => {
            state.sessions.bind(connection_id, user_id);
            true
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Handshake token rejected");
            false
        }
    }
}

/// Writer task: serializes events and pushes them down the socket until
/// the channel closes or the client disconnects.
async fn forward_events(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<ServerEvent>,
) {
    while let Some(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(json) => {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Event serialization failed");
            }
        }
    }
    let _ = sender.close().await;
}
