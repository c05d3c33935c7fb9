mod anthropic_client;
mod mock_completion_client;

pub use anthropic_client::{AnthropicClient, decode_event_stream};
pub use mock_completion_client::MockCompletionClient;
