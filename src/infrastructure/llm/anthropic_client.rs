use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    CompletionClient, CompletionError, FragmentStream, PromptTurn,
};
use crate::domain::ChatRole;
use crate::presentation::config::LlmSettings;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Streaming client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: usize,
    system: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum StreamEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: Delta },
    #[serde(rename = "error")]
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl AnthropicClient {
    pub fn new(settings: &LlmSettings) -> Self {
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            base_url,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        }
    }

    /// The Messages API takes the system prompt out of band and only
    /// accepts user/assistant turns; stored system rows are skipped.
    fn build_messages(history: &[PromptTurn], message: &str) -> Vec<WireMessage> {
        let mut messages: Vec<WireMessage> = history
            .iter()
            .filter_map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                    ChatRole::System => return None,
                };
                Some(WireMessage {
                    role,
                    content: turn.content.clone(),
                })
            })
            .collect();

        messages.push(WireMessage {
            role: "user",
            content: message.to_string(),
        });
        messages
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn stream(
        &self,
        system_prompt: &str,
        history: &[PromptTurn],
        message: &str,
    ) -> Result<FragmentStream, CompletionError> {
        let request_body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system_prompt.to_string(),
            messages: Self::build_messages(history, message),
            stream: true,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CompletionError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        Ok(decode_event_stream(response.bytes_stream()))
    }
}

/// Decodes a server-sent-event byte stream into text fragments.
///
/// HTTP chunk boundaries do not respect SSE line boundaries, so an
/// incomplete trailing line is buffered until the next chunk completes
/// it. Only whole lines ever reach the parser; a `data:` payload that
/// fails to decode surfaces as `InvalidResponse`.
pub fn decode_event_stream<S, B, E>(stream: S) -> FragmentStream
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    Box::pin(
        stream
            .scan(Vec::new(), |buffer: &mut Vec<u8>, chunk_result| {
                let items = match chunk_result {
                    Ok(bytes) => {
                        buffer.extend_from_slice(bytes.as_ref());
                        drain_complete_lines(buffer)
                    }
                    Err(e) => vec![Err(CompletionError::ApiRequestFailed(e.to_string()))],
                };
                futures::future::ready(Some(futures::stream::iter(items)))
            })
            .flatten(),
    )
}

/// Parses every completed `data:` line out of the buffer, leaving any
/// partial trailing line in place for the next chunk.
fn drain_complete_lines(buffer: &mut Vec<u8>) -> Vec<Result<String, CompletionError>> {
    let mut fragments = Vec::new();
    while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=newline).collect();
        let line = String::from_utf8_lossy(&line);
        let Some(data) = line.trim_end().strip_prefix("data: ") else {
            continue;
        };
        match serde_json::from_str::<StreamEvent>(data) {
            Ok(StreamEvent::ContentBlockDelta { delta }) => {
                if let Some(text) = delta.text {
                    fragments.push(Ok(text));
                }
            }
            Ok(StreamEvent::Error { error }) => {
                fragments.push(Err(CompletionError::ApiRequestFailed(error.message)));
            }
            Ok(StreamEvent::Other) => {}
            Err(e) => {
                fragments.push(Err(CompletionError::InvalidResponse(e.to_string())));
            }
        }
    }
    fragments
}
