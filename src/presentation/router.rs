use axum::Router;
use axum::middleware;
use axum::routing::{any, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{CompletionClient, Retriever};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_thread_handler, get_chats_handler, health_handler, list_threads_handler,
    verify_token_handler, ws_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<C, R>(state: AppState<C, R>) -> Router
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/verify", post(verify_token_handler::<C, R>))
        .route(
            "/threads",
            get(list_threads_handler::<C, R>).post(create_thread_handler::<C, R>),
        )
        .route("/threads/{thread_id}/chats", get(get_chats_handler::<C, R>))
        .route("/ws", any(ws_handler::<C, R>))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
