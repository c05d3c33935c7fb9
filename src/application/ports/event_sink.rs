use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Chat, Thread};

use super::RetrievedDocument;

/// Emits named events to exactly one connection.
///
/// Injected into the orchestrator so it stays testable without a real
/// transport. Emission is best effort: a sink whose connection has gone
/// away drops events rather than failing message processing.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: ServerEvent);
}

/// Server-to-client events of the real-time channel, serialized as JSON
/// objects tagged by `event`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        status: String,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        phase: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        thread_id: Option<Uuid>,
        #[serde(skip_serializing_if = "Option::is_none")]
        chat_id: Option<Uuid>,
    },
    ThreadInfo {
        thread_id: Uuid,
        is_new: bool,
        title: String,
        created_at: DateTime<Utc>,
    },
    ChatMessage {
        thread_id: Uuid,
        chat_id: Uuid,
        role: String,
        content: String,
        created_at: DateTime<Utc>,
    },
    Status {
        phase: StatusPhase,
        message: String,
        thread_id: Uuid,
        chat_id: Uuid,
    },
    SearchResults {
        results: String,
        documents: Vec<RetrievedDocument>,
        thread_id: Uuid,
        chat_id: Uuid,
    },
    ResponseChunk {
        chunk: String,
        thread_id: Uuid,
        chat_id: Uuid,
    },
}

/// Processing phases announced over `status` events. The middle phases
/// belong to the retrieval stage; `Started` and `Completed` bookend every
/// message cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPhase {
    Started,
    Searching,
    Retrieving,
    Embedding,
    Processing,
    Completed,
}

impl ServerEvent {
    pub fn authenticated() -> Self {
        ServerEvent::Connected {
            status: "authenticated".to_string(),
        }
    }

    /// Handshake refusal, before any thread context exists.
    pub fn unauthenticated() -> Self {
        ServerEvent::Error {
            status: Some("unauthenticated".to_string()),
            phase: None,
            message: None,
            thread_id: None,
            chat_id: None,
        }
    }

    /// Failure outside a generation cycle (missing session, forbidden or
    /// unresolvable thread, store errors before the placeholder exists).
    pub fn failure(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            status: None,
            phase: None,
            message: Some(message.into()),
            thread_id: None,
            chat_id: None,
        }
    }

    /// Failure during a generation cycle, addressed to the assistant chat
    /// the client is rendering.
    pub fn generation_failure(message: impl Into<String>, thread: &Thread, chat: &Chat) -> Self {
        ServerEvent::Error {
            status: None,
            phase: Some("error".to_string()),
            message: Some(message.into()),
            thread_id: Some(thread.id.as_uuid()),
            chat_id: Some(chat.id.as_uuid()),
        }
    }

    pub fn thread_info(thread: &Thread, is_new: bool) -> Self {
        ServerEvent::ThreadInfo {
            thread_id: thread.id.as_uuid(),
            is_new,
            title: thread.title.clone(),
            created_at: thread.created_at,
        }
    }

    pub fn chat_message(chat: &Chat) -> Self {
        ServerEvent::ChatMessage {
            thread_id: chat.thread_id.as_uuid(),
            chat_id: chat.id.as_uuid(),
            role: chat.role.as_str().to_string(),
            content: chat.content.clone(),
            created_at: chat.created_at,
        }
    }

    pub fn status(phase: StatusPhase, message: impl Into<String>, chat: &Chat) -> Self {
        ServerEvent::Status {
            phase,
            message: message.into(),
            thread_id: chat.thread_id.as_uuid(),
            chat_id: chat.id.as_uuid(),
        }
    }

    pub fn response_chunk(chunk: String, chat: &Chat) -> Self {
        ServerEvent::ResponseChunk {
            chunk,
            thread_id: chat.thread_id.as_uuid(),
            chat_id: chat.id.as_uuid(),
        }
    }
}
