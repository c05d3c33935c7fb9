mod conversation_service;
mod session_registry;

pub use conversation_service::{ConversationService, DEFAULT_SYSTEM_PROMPT};
pub use session_registry::{SessionError, SessionRegistry};
