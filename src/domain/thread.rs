use chrono::{DateTime, Utc};

use super::{ThreadId, UserId};

/// One persisted conversation. The owning user never changes after creation.
#[derive(Debug, Clone)]
pub struct Thread {
    pub id: ThreadId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    /// Creates a thread with the auto-generated timestamp title.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ThreadId::new(),
            user_id,
            title: format!("Thread {}", now.format("%Y-%m-%d %H:%M:%S")),
            created_at: now,
        }
    }
}
