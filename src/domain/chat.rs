use chrono::{DateTime, Utc};

use super::{ChatId, ChatRole, ThreadId};

/// One turn within a thread. An assistant chat is created with empty
/// content and replaced exactly once with the final generated text.
#[derive(Debug, Clone)]
pub struct Chat {
    pub id: ChatId,
    pub thread_id: ThreadId,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(thread_id: ThreadId, role: ChatRole, content: String) -> Self {
        Self {
            id: ChatId::new(),
            thread_id,
            role,
            content,
            created_at: Utc::now(),
        }
    }
}
