use std::sync::Arc;

use futures::stream::StreamExt;

use crate::application::ports::{
    CompletionClient, CompletionError, EventSink, PromptTurn, RepositoryError, Retriever,
    RetrieverError, ServerEvent, StatusPhase, ThreadRepository,
};
use crate::domain::{Chat, ChatRole, ConnectionId, Thread, ThreadId};

use super::SessionRegistry;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer the user's question.";

/// Orchestrates one inbound message on an authenticated connection:
/// resolves the thread, persists the user turn and an empty assistant
/// placeholder, runs retrieval and generation, streams fragments to the
/// connection, and finalizes or repairs state at the end.
///
/// Every step is strictly sequential; a failure at any point converts
/// into an `error` event on the caller's sink and never propagates into
/// the transport layer. Already-committed rows (the user chat, the empty
/// placeholder) are kept on failure; no partial assistant text is ever
/// persisted.
pub struct ConversationService<C, R>
where
    C: CompletionClient,
    R: Retriever,
{
    thread_repository: Arc<dyn ThreadRepository>,
    completion_client: Arc<C>,
    retriever: Arc<R>,
    sessions: Arc<SessionRegistry>,
    system_prompt: String,
}

impl<C, R> ConversationService<C, R>
where
    C: CompletionClient,
    R: Retriever,
{
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        completion_client: Arc<C>,
        retriever: Arc<R>,
        sessions: Arc<SessionRegistry>,
        system_prompt: String,
    ) -> Self {
        Self {
            thread_repository,
            completion_client,
            retriever,
            sessions,
            system_prompt,
        }
    }

    #[tracing::instrument(skip(self, message, sink), fields(connection_id = %connection_id))]
    pub async fn process_message(
        &self,
        connection_id: ConnectionId,
        requested_thread: Option<ThreadId>,
        message: &str,
        sink: &dyn EventSink,
    ) {
        let user_id = match self.sessions.lookup(connection_id) {
            Ok(user_id) => user_id,
            Err(e) => {
                tracing::warn!(error = %e, "Message on connection without a session");
                sink.emit(ServerEvent::failure(e.to_string())).await;
                return;
            }
        };

        let thread = match self
            .thread_repository
            .get_or_create(requested_thread, &user_id)
            .await
        {
            Ok(thread) => thread,
            Err(RepositoryError::Forbidden(_)) => {
                tracing::warn!(user_id = %user_id, "Thread access denied");
                sink.emit(ServerEvent::failure("Not authorized to access this thread"))
                    .await;
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Thread resolution failed");
                sink.emit(ServerEvent::failure(e.to_string())).await;
                return;
            }
        };

        let is_new = requested_thread.map_or(true, |id| id != thread.id);
        sink.emit(ServerEvent::thread_info(&thread, is_new)).await;

        // Snapshot the history before the new turn lands so the question
        // is not duplicated in the prompt.
        let history = match self.thread_repository.get_chats(thread.id, &user_id).await {
            Ok(chats) => prompt_history(chats),
            Err(e) => {
                tracing::error!(error = %e, "Loading thread history failed");
                sink.emit(ServerEvent::failure(e.to_string())).await;
                return;
            }
        };

        let user_chat = match self
            .thread_repository
            .append_chat(thread.id, ChatRole::User, message)
            .await
        {
            Ok(chat) => chat,
            Err(e) => {
                tracing::error!(error = %e, "Persisting user turn failed");
                sink.emit(ServerEvent::failure(e.to_string())).await;
                return;
            }
        };
        sink.emit(ServerEvent::chat_message(&user_chat)).await;

        // Empty placeholder so the client has a stable id to attach
        // streamed fragments to before any text exists.
        let assistant_chat = match self
            .thread_repository
            .append_chat(thread.id, ChatRole::Assistant, "")
            .await
        {
            Ok(chat) => chat,
            Err(e) => {
                tracing::error!(error = %e, "Creating assistant placeholder failed");
                sink.emit(ServerEvent::failure(e.to_string())).await;
                return;
            }
        };
        sink.emit(ServerEvent::chat_message(&assistant_chat)).await;

        sink.emit(ServerEvent::status(
            StatusPhase::Started,
            "Processing your message",
            &assistant_chat,
        ))
        .await;

        if let Err(e) = self
            .generate(&thread, &assistant_chat, &history, message, sink)
            .await
        {
            tracing::error!(error = %e, chat_id = %assistant_chat.id.as_uuid(), "Message cycle failed");
            sink.emit(ServerEvent::generation_failure(
                e.to_string(),
                &thread,
                &assistant_chat,
            ))
            .await;
        }
    }

    /// Retrieval phases, the provider stream, and finalization. The
    /// assistant placeholder keeps its empty content on any error here.
    async fn generate(
        &self,
        thread: &Thread,
        assistant_chat: &Chat,
        history: &[PromptTurn],
        message: &str,
        sink: &dyn EventSink,
    ) -> Result<(), ProcessingError> {
        sink.emit(ServerEvent::status(
            StatusPhase::Searching,
            "Searching through relevant documents",
            assistant_chat,
        ))
        .await;

        let outcome = self.retriever.search(message).await?;

        sink.emit(ServerEvent::status(
            StatusPhase::Retrieving,
            format!("Found {} relevant documents", outcome.documents.len()),
            assistant_chat,
        ))
        .await;
        sink.emit(ServerEvent::SearchResults {
            results: outcome.summary,
            documents: outcome.documents,
            thread_id: thread.id.as_uuid(),
            chat_id: assistant_chat.id.as_uuid(),
        })
        .await;
        sink.emit(ServerEvent::status(
            StatusPhase::Embedding,
            "Calculating embeddings for context",
            assistant_chat,
        ))
        .await;
        sink.emit(ServerEvent::status(
            StatusPhase::Processing,
            "Generating response with AI",
            assistant_chat,
        ))
        .await;

        let mut fragments = self
            .completion_client
            .stream(&self.system_prompt, history, message)
            .await?;

        let mut accumulated = String::new();
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            accumulated.push_str(&fragment);
            sink.emit(ServerEvent::response_chunk(fragment, assistant_chat))
                .await;
        }

        self.thread_repository
            .update_chat_content(assistant_chat.id, &accumulated)
            .await?;

        sink.emit(ServerEvent::status(
            StatusPhase::Completed,
            "Finished processing your message",
            assistant_chat,
        ))
        .await;

        Ok(())
    }
}

/// Maps stored chats to provider turns, dropping empty-content entries
/// (failed placeholders never reach the prompt).
fn prompt_history(chats: Vec<Chat>) -> Vec<PromptTurn> {
    chats
        .into_iter()
        .filter(|chat| !chat.content.is_empty())
        .map(|chat| PromptTurn {
            role: chat.role,
            content: chat.content,
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
enum ProcessingError {
    #[error(transparent)]
    Retrieval(#[from] RetrieverError),
    #[error(transparent)]
    Generation(#[from] CompletionError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}
