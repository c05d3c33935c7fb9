mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use samtal::application::ports::{IdentityVerifier, ThreadRepository};
use samtal::application::services::{
    ConversationService, DEFAULT_SYSTEM_PROMPT, SessionRegistry,
};
use samtal::domain::{ChatRole, UserId};
use samtal::infrastructure::auth::JwtIdentityVerifier;
use samtal::infrastructure::llm::MockCompletionClient;
use samtal::infrastructure::retrieval::StubRetriever;
use samtal::presentation::{AppState, create_router};

use common::InMemoryThreadRepository;

const TEST_SECRET: &str = "api-test-secret";

struct TestApp {
    router: Router,
    repository: Arc<InMemoryThreadRepository>,
    verifier: Arc<JwtIdentityVerifier>,
}

fn test_app() -> TestApp {
    let repository = Arc::new(InMemoryThreadRepository::new());
    let verifier = Arc::new(JwtIdentityVerifier::new(TEST_SECRET));
    let sessions = Arc::new(SessionRegistry::new());

    let conversation_service = Arc::new(ConversationService::new(
        Arc::clone(&repository) as Arc<dyn ThreadRepository>,
        Arc::new(MockCompletionClient::default()),
        Arc::new(StubRetriever::instant()),
        Arc::clone(&sessions),
        DEFAULT_SYSTEM_PROMPT.to_string(),
    ));

    let state = AppState {
        conversation_service,
        thread_repository: Arc::clone(&repository) as Arc<dyn ThreadRepository>,
        identity_verifier: Arc::clone(&verifier) as Arc<dyn IdentityVerifier>,
        sessions,
    };

    TestApp {
        router: create_router(state),
        repository,
        verifier,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not valid JSON")
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn given_health_request_then_healthy() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn given_valid_token_when_verifying_then_user_id_returned() {
    let app = test_app();
    let token = app.verifier.issue(&UserId::new("alice")).unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/auth/verify?token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_id"], "alice");
}

#[tokio::test]
async fn given_garbage_token_when_verifying_then_unauthorized() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/verify?token=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid token:")
    );
}

#[tokio::test]
async fn given_missing_credential_when_listing_threads_then_forbidden() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/threads")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn given_invalid_credential_when_listing_threads_then_unauthorized() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/threads")
                .header(header::AUTHORIZATION, bearer("bad-token"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_created_thread_when_listing_then_it_appears_for_its_owner_only() {
    let app = test_app();
    let alice_token = app.verifier.issue(&UserId::new("alice")).unwrap();
    let bob_token = app.verifier.issue(&UserId::new("bob")).unwrap();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/threads")
                .header(header::AUTHORIZATION, bearer(&alice_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert!(created["title"].as_str().unwrap().starts_with("Thread "));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/threads")
                .header(header::AUTHORIZATION, bearer(&alice_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/threads")
                .header(header::AUTHORIZATION, bearer(&bob_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn given_unknown_thread_when_fetching_chats_then_not_found() {
    let app = test_app();
    let token = app.verifier.issue(&UserId::new("alice")).unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri(format!("/threads/{}/chats", Uuid::new_v4()))
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Thread not found");
}

#[tokio::test]
async fn given_thread_owned_by_other_user_when_fetching_chats_then_not_found() {
    let app = test_app();
    let bob_thread = app
        .repository
        .create_thread(&UserId::new("bob"))
        .await
        .unwrap();
    let alice_token = app.verifier.issue(&UserId::new("alice")).unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri(format!("/threads/{}/chats", bob_thread.id.as_uuid()))
                .header(header::AUTHORIZATION, bearer(&alice_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_thread_with_chats_when_fetching_then_creation_order_and_roles() {
    let app = test_app();
    let user = UserId::new("alice");
    let thread = app.repository.create_thread(&user).await.unwrap();
    app.repository.seed_chat(thread.id, ChatRole::User, "hi");
    app.repository
        .seed_chat(thread.id, ChatRole::Assistant, "hello");
    let token = app.verifier.issue(&user).unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri(format!("/threads/{}/chats", thread.id.as_uuid()))
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let chats = body.as_array().unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0]["role"], "user");
    assert_eq!(chats[0]["content"], "hi");
    assert_eq!(chats[1]["role"], "assistant");
    assert_eq!(chats[1]["content"], "hello");
}

#[tokio::test]
async fn given_caller_request_id_when_responding_then_it_is_echoed() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-abc-123"
    );
}

#[tokio::test]
async fn given_no_request_id_when_responding_then_one_is_generated() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let header = response.headers().get("x-request-id").unwrap();
    assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
}
