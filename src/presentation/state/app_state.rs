use std::sync::Arc;

use crate::application::ports::{
    CompletionClient, IdentityVerifier, Retriever, ThreadRepository,
};
use crate::application::services::{ConversationService, SessionRegistry};

pub struct AppState<C, R>
where
    C: CompletionClient,
    R: Retriever,
{
    pub conversation_service: Arc<ConversationService<C, R>>,
    pub thread_repository: Arc<dyn ThreadRepository>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub sessions: Arc<SessionRegistry>,
}

impl<C, R> Clone for AppState<C, R>
where
    C: CompletionClient,
    R: Retriever,
{
    fn clone(&self) -> Self {
        Self {
            conversation_service: Arc::clone(&self.conversation_service),
            thread_repository: Arc::clone(&self.thread_repository),
            identity_verifier: Arc::clone(&self.identity_verifier),
            sessions: Arc::clone(&self.sessions),
        }
    }
}
