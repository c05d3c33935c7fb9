use futures::stream::StreamExt;

use crate::application::ports::{
    CompletionClient, CompletionError, FragmentStream, PromptTurn,
};

/// Scripted provider for tests and local development: yields a fixed
/// fragment sequence, optionally failing mid-stream or before streaming.
pub struct MockCompletionClient {
    fragments: Vec<String>,
    fail_after: Option<usize>,
}

impl MockCompletionClient {
    pub fn new(fragments: Vec<&str>) -> Self {
        Self {
            fragments: fragments.into_iter().map(String::from).collect(),
            fail_after: None,
        }
    }

    /// Fails with a stream error after yielding `count` fragments. Zero
    /// means the stream errors before producing any text.
    pub fn failing_after(fragments: Vec<&str>, count: usize) -> Self {
        Self {
            fragments: fragments.into_iter().map(String::from).collect(),
            fail_after: Some(count),
        }
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new(vec!["Mock ", "answer"])
    }
}

#[async_trait::async_trait]
impl CompletionClient for MockCompletionClient {
    async fn stream(
        &self,
        _system_prompt: &str,
        _history: &[PromptTurn],
        _message: &str,
    ) -> Result<FragmentStream, CompletionError> {
        let mut items: Vec<Result<String, CompletionError>> = self
            .fragments
            .iter()
            .cloned()
            .map(Ok)
            .collect();

        if let Some(count) = self.fail_after {
            items.truncate(count);
            items.push(Err(CompletionError::ApiRequestFailed(
                "mock stream interrupted".to_string(),
            )));
        }

        Ok(futures::stream::iter(items).boxed())
    }
}
