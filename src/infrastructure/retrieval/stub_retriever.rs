use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    RetrievalOutcome, RetrievedDocument, Retriever, RetrieverError,
};

/// Placeholder retrieval stage: waits a fixed delay and returns canned
/// documents. Stands in for the real engine behind the [`Retriever`] seam
/// so the status-phase contract stays stable once retrieval is real.
pub struct StubRetriever {
    delay: Duration,
}

impl StubRetriever {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No artificial delay; used in tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn search(&self, query: &str) -> Result<RetrievalOutcome, RetrieverError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(RetrievalOutcome {
            summary: format!("Simulated search results for: {}", query),
            documents: vec![
                RetrievedDocument {
                    title: "Document 1".to_string(),
                    relevance: 0.92,
                },
                RetrievedDocument {
                    title: "Document 2".to_string(),
                    relevance: 0.85,
                },
                RetrievedDocument {
                    title: "Document 3".to_string(),
                    relevance: 0.78,
                },
            ],
        })
    }
}
