mod completion_client;
mod event_sink;
mod identity_verifier;
mod repository_error;
mod retriever;
mod thread_repository;

pub use completion_client::{CompletionClient, CompletionError, FragmentStream, PromptTurn};
pub use event_sink::{EventSink, ServerEvent, StatusPhase};
pub use identity_verifier::{AuthError, IdentityVerifier};
pub use repository_error::RepositoryError;
pub use retriever::{RetrievalOutcome, RetrievedDocument, Retriever, RetrieverError};
pub use thread_repository::ThreadRepository;
