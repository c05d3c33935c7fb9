#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use samtal::application::ports::{
    CompletionClient, CompletionError, EventSink, FragmentStream, PromptTurn, RepositoryError,
    ServerEvent, ThreadRepository,
};
use samtal::domain::{Chat, ChatId, ChatRole, Thread, ThreadId, UserId};

/// In-memory stand-in for the Postgres repository.
#[derive(Default)]
pub struct InMemoryThreadRepository {
    threads: Mutex<Vec<Thread>>,
    chats: Mutex<Vec<Chat>>,
}

impl InMemoryThreadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.lock().unwrap().len()
    }

    pub fn chat_count(&self) -> usize {
        self.chats.lock().unwrap().len()
    }

    pub fn chat_by_id(&self, id: ChatId) -> Option<Chat> {
        self.chats.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }

    pub fn chats_for(&self, thread_id: ThreadId) -> Vec<Chat> {
        self.chats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.thread_id == thread_id)
            .cloned()
            .collect()
    }

    /// Seeds a chat row directly, bypassing the trait.
    pub fn seed_chat(&self, thread_id: ThreadId, role: ChatRole, content: &str) -> Chat {
        let chat = Chat::new(thread_id, role, content.to_string());
        self.chats.lock().unwrap().push(chat.clone());
        chat
    }
}

#[async_trait]
impl ThreadRepository for InMemoryThreadRepository {
    async fn get_or_create(
        &self,
        thread_id: Option<ThreadId>,
        user_id: &UserId,
    ) -> Result<Thread, RepositoryError> {
        if let Some(id) = thread_id {
            let existing = self
                .threads
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned();
            if let Some(thread) = existing {
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

    async fn create_thread(&self, user_id: &UserId) -> Result<Thread, RepositoryError> {
        let thread = Thread::new(user_id.clone());
        self.threads.lock().unwrap().push(thread.clone());
        Ok(thread)
    }

    async fn list_threads(&self, user_id: &UserId) -> Result<Vec<Thread>, RepositoryError> {
        Ok(self
            .threads
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn append_chat(
        &self,
        thread_id: ThreadId,
        role: ChatRole,
        content: &str,
    ) -> Result<Chat, RepositoryError> {
        let chat = Chat::new(thread_id, role, content.to_string());
        self.chats.lock().unwrap().push(chat.clone());
        Ok(chat)
    }

    async fn update_chat_content(
        &self,
        chat_id: ChatId,
        content: &str,
    ) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        match chats.iter_mut().find(|c| c.id == chat_id) {
            Some(chat) => {
                chat.content = content.to_string();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "chat {} not found",
                chat_id.as_uuid()
            ))),
        }
    }

    async fn get_chats(
        &self,
        thread_id: ThreadId,
        user_id: &UserId,
    ) -> Result<Vec<Chat>, RepositoryError> {
        let owned = self
            .threads
            .lock()
            .unwrap()
            .iter()
            .any(|t| t.id == thread_id && t.user_id == *user_id);
        if !owned {
            return Err(RepositoryError::NotFound("Thread not found".to_string()));
        }

        let mut chats = self.chats_for(thread_id);
        chats.sort_by_key(|c| c.created_at);
        Ok(chats)
    }
}

/// Captures every event the orchestrator emits, in order.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ServerEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(&self, event: ServerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// One recorded provider invocation.
#[derive(Debug, Clone)]
pub struct RecordedPrompt {
    pub system_prompt: String,
    pub history: Vec<PromptTurn>,
    pub message: String,
}

/// Completion client that records its prompts and yields a scripted
/// fragment sequence.
pub struct RecordingCompletionClient {
    fragments: Vec<String>,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl RecordingCompletionClient {
    pub fn new(fragments: Vec<&str>) -> Self {
        Self {
            fragments: fragments.into_iter().map(String::from).collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for RecordingCompletionClient {
    async fn stream(
        &self,
        system_prompt: &str,
        history: &[PromptTurn],
        message: &str,
    ) -> Result<FragmentStream, CompletionError> {
        self.prompts.lock().unwrap().push(RecordedPrompt {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
            message: message.to_string(),
        });

        let items: Vec<Result<String, CompletionError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}
