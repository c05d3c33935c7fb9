use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::{
    CompletionClient, RepositoryError, Retriever,
};
use crate::domain::{Chat, Thread, ThreadId};
use crate::presentation::state::AppState;

use super::auth::{ErrorResponse, authenticate};

#[derive(Serialize)]
pub struct ThreadResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id.as_uuid(),
            title: thread.title,
            created_at: thread.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub id: Uuid,
    pub content: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<Chat> for ChatResponse {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id.as_uuid(),
            content: chat.content,
            role: chat.role.as_str().to_string(),
            created_at: chat.created_at,
        }
    }
}

#[tracing::instrument(skip(state, headers))]
pub async fn list_threads_handler<C, R>(
    State(state): State<AppState<C, R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    let user_id = match authenticate(&headers, state.identity_verifier.as_ref()) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection,
    };

    match state.thread_repository.list_threads(&user_id).await {
        Ok(threads) => {
            let threads: Vec<ThreadResponse> =
                threads.into_iter().map(ThreadResponse::from).collect();
            (StatusCode::OK, Json(threads)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Listing threads failed");
            store_error_response(e)
        }
    }
}

#[tracing::instrument(skip(state, headers))]
pub async fn create_thread_handler<C, R>(
    State(state): State<AppState<C, R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    let user_id = match authenticate(&headers, state.identity_verifier.as_ref()) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection,
    };

    match state.thread_repository.create_thread(&user_id).await {
        Ok(thread) => (StatusCode::OK, Json(ThreadResponse::from(thread))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Creating thread failed");
            store_error_response(e)
        }
    }
}

#[tracing::instrument(skip(state, headers))]
pub async fn get_chats_handler<C, R>(
    State(state): State<AppState<C, R>>,
    headers: HeaderMap,
    Path(thread_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    let user_id = match authenticate(&headers, state.identity_verifier.as_ref()) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection,
    };

    match state
        .thread_repository
        .get_chats(ThreadId::from_uuid(thread_id), &user_id)
        .await
    {
        Ok(chats) => {
            let chats: Vec<ChatResponse> = chats.into_iter().map(ChatResponse::from).collect();
            (StatusCode::OK, Json(chats)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Fetching chats failed");
            store_error_response(e)
        }
    }
}

fn store_error_response(error: RepositoryError) -> axum::response::Response {
    let status = match &error {
        RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::Forbidden(_) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &error {
        RepositoryError::NotFound(_) => "Thread not found".to_string(),
        _ => error.to_string(),
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}
