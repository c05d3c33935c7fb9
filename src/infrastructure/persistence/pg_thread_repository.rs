use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, ThreadRepository};
use crate::domain::{Chat, ChatId, ChatRole, Thread, ThreadId, UserId};

pub struct PgThreadRepository {
    pool: PgPool,
}

impl PgThreadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_thread(&self, id: ThreadId) -> Result<Option<Thread>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, created_at
            FROM threads
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(thread_from_row).transpose()
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_or_create(
        &self,
        thread_id: Option<ThreadId>,
        user_id: &UserId,
    ) -> Result<Thread, RepositoryError> {
        if let Some(id) = thread_id {
            if let Some(thread) = self.find_thread(id).await? {
                if thread.user_id != *user_id {
                    return Err(RepositoryError::Forbidden(
                        "Not authorized to access this thread".to_string(),
                    ));
                }
                return Ok(thread);
            }
        }

        self.create_thread(user_id).await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn create_thread(&self, user_id: &UserId) -> Result<Thread, RepositoryError> {
        let thread = Thread::new(user_id.clone());

        sqlx::query(
            r#"
            INSERT INTO threads (id, user_id, title, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(thread.id.as_uuid())
        .bind(thread.user_id.as_str())
        .bind(&thread.title)
        .bind(thread.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(thread)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_threads(&self, user_id: &UserId) -> Result<Vec<Thread>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, created_at
            FROM threads
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(thread_from_row).collect()
    }

    #[instrument(skip(self, content), fields(thread_id = %thread_id.as_uuid(), role = %role))]
    async fn append_chat(
        &self,
        thread_id: ThreadId,
        role: ChatRole,
        content: &str,
    ) -> Result<Chat, RepositoryError> {
        let chat = Chat::new(thread_id, role, content.to_string());

        sqlx::query(
            r#"
            INSERT INTO chats (id, thread_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(chat.id.as_uuid())
        .bind(chat.thread_id.as_uuid())
        .bind(chat.role.as_str())
        .bind(&chat.content)
        .bind(chat.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(chat)
    }

    #[instrument(skip(self, content), fields(chat_id = %chat_id.as_uuid()))]
    async fn update_chat_content(
        &self,
        chat_id: ChatId,
        content: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE chats
            SET content = $1
            WHERE id = $2
            "#,
        )
        .bind(content)
        .bind(chat_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "chat {} not found",
                chat_id.as_uuid()
            )));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(thread_id = %thread_id.as_uuid(), user_id = %user_id))]
    async fn get_chats(
        &self,
        thread_id: ThreadId,
        user_id: &UserId,
    ) -> Result<Vec<Chat>, RepositoryError> {
        let owned = sqlx::query(
            r#"
            SELECT id
            FROM threads
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(thread_id.as_uuid())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if owned.is_none() {
            return Err(RepositoryError::NotFound("Thread not found".to_string()));
        }

        let rows = sqlx::query(
            r#"
            SELECT id, thread_id, role, content, created_at
            FROM chats
            WHERE thread_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(thread_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(chat_from_row).collect()
    }
}

fn thread_from_row(row: PgRow) -> Result<Thread, RepositoryError> {
    Ok(Thread {
        id: ThreadId::from_uuid(row.get::<Uuid, _>("id")),
        user_id: UserId::new(row.get::<String, _>("user_id")),
        title: row.get("title"),
        created_at: row.get("created_at"),
    })
}

fn chat_from_row(row: PgRow) -> Result<Chat, RepositoryError> {
    let role = row
        .get::<String, _>("role")
        .parse::<ChatRole>()
        .map_err(RepositoryError::QueryFailed)?;

    Ok(Chat {
        id: ChatId::from_uuid(row.get::<Uuid, _>("id")),
        thread_id: ThreadId::from_uuid(row.get::<Uuid, _>("thread_id")),
        role,
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}
