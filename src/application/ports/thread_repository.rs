use async_trait::async_trait;

use crate::domain::{Chat, ChatId, ChatRole, Thread, ThreadId, UserId};

use super::RepositoryError;

/// Durable mapping from (user, thread) to ordered message history.
///
/// Thread and chat rows are created and mutated exclusively through this
/// trait; each insert is atomic on its own, no multi-row atomicity is
/// assumed beyond that.
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Resolves an existing thread or creates a fresh one.
    ///
    /// A supplied id that resolves to a thread owned by someone else fails
    /// with [`RepositoryError::Forbidden`] and performs no write; ownership
    /// is never silently reassigned. A missing or unresolvable id creates a
    /// new thread owned by `user_id`.
    async fn get_or_create(
        &self,
        thread_id: Option<ThreadId>,
        user_id: &UserId,
    ) -> Result<Thread, RepositoryError>;

    /// Unconditionally creates a new thread for `user_id` with the
    /// auto-generated timestamp title.
    async fn create_thread(&self, user_id: &UserId) -> Result<Thread, RepositoryError>;

    /// All threads owned by `user_id`, in store-natural order.
    async fn list_threads(&self, user_id: &UserId) -> Result<Vec<Thread>, RepositoryError>;

    /// Inserts a new chat row with the current timestamp and returns it.
    async fn append_chat(
        &self,
        thread_id: ThreadId,
        role: ChatRole,
        content: &str,
    ) -> Result<Chat, RepositoryError>;

    /// Full replace of a chat's content field.
    async fn update_chat_content(
        &self,
        chat_id: ChatId,
        content: &str,
    ) -> Result<(), RepositoryError>;

    /// Chats of a thread in creation order. Fails with
    /// [`RepositoryError::NotFound`] when no thread with that id is owned
    /// by `user_id`.
    async fn get_chats(
        &self,
        thread_id: ThreadId,
        user_id: &UserId,
    ) -> Result<Vec<Chat>, RepositoryError>;
}
