use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::domain::ChatRole;

pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send + 'static>>;

/// One prior turn handed to the generation provider.
#[derive(Debug, Clone)]
pub struct PromptTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Black-box streaming text generator.
///
/// The returned stream may fail at any point, including after yielding
/// fragments; fragments already yielded are not retracted. Concatenation
/// of all fragments in yield order is the canonical full response.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn stream(
        &self,
        system_prompt: &str,
        history: &[PromptTurn],
        message: &str,
    ) -> Result<FragmentStream, CompletionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
