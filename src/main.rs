use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use samtal::application::ports::{IdentityVerifier, ThreadRepository};
use samtal::application::services::{
    ConversationService, DEFAULT_SYSTEM_PROMPT, SessionRegistry,
};
use samtal::infrastructure::auth::JwtIdentityVerifier;
use samtal::infrastructure::llm::AnthropicClient;
use samtal::infrastructure::observability::{TracingConfig, init_tracing};
use samtal::infrastructure::persistence::{PgThreadRepository, create_pool};
use samtal::infrastructure::retrieval::StubRetriever;
use samtal::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_tracing(TracingConfig::default(), settings.server.port);

    let pool = create_pool(&settings.database.url, settings.database.max_connections).await?;
    sqlx::migrate!().run(&pool).await?;

    let thread_repository: Arc<dyn ThreadRepository> = Arc::new(PgThreadRepository::new(pool));
    let identity_verifier: Arc<dyn IdentityVerifier> =
        Arc::new(JwtIdentityVerifier::new(&settings.auth.jwt_secret));
    let completion_client = Arc::new(AnthropicClient::new(&settings.llm));
    let retriever = Arc::new(StubRetriever::new(Duration::from_secs(1)));
    let sessions = Arc::new(SessionRegistry::new());

    let conversation_service = Arc::new(ConversationService::new(
        Arc::clone(&thread_repository),
        completion_client,
        retriever,
        Arc::clone(&sessions),
        DEFAULT_SYSTEM_PROMPT.to_string(),
    ));

    let state = AppState {
        conversation_service,
        thread_repository,
        identity_verifier,
        sessions,
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
