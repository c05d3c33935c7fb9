use async_trait::async_trait;
use serde::Serialize;

/// Document retrieval stage of the message pipeline.
///
/// The production implementation is currently a stub with canned results;
/// this trait is the stable seam a real retrieval engine plugs into
/// without changing the orchestrator or the event contract.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str) -> Result<RetrievalOutcome, RetrieverError>;
}

#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub summary: String,
    pub documents: Vec<RetrievedDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub title: String,
    pub relevance: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    #[error("search failed: {0}")]
    SearchFailed(String),
}
