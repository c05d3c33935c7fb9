use serde_json::{Value, json};

use samtal::application::ports::{ServerEvent, StatusPhase};
use samtal::domain::{Chat, ChatRole, Thread, UserId};

fn to_json(event: &ServerEvent) -> Value {
    serde_json::to_value(event).expect("Event serialization failed")
}

#[test]
fn given_connected_event_then_wire_shape_matches_contract() {
    let value = to_json(&ServerEvent::authenticated());
    assert_eq!(
        value,
        json!({"event": "connected", "status": "authenticated"})
    );
}

#[test]
fn given_handshake_refusal_then_only_status_field_is_present() {
    let value = to_json(&ServerEvent::unauthenticated());
    assert_eq!(value, json!({"event": "error", "status": "unauthenticated"}));
}

#[test]
fn given_generation_failure_then_error_carries_phase_thread_and_chat() {
    let thread = Thread::new(UserId::new("alice"));
    let chat = Chat::new(thread.id, ChatRole::Assistant, String::new());

    let value = to_json(&ServerEvent::generation_failure("provider down", &thread, &chat));

    assert_eq!(value["event"], "error");
    assert_eq!(value["phase"], "error");
    assert_eq!(value["message"], "provider down");
    assert_eq!(value["thread_id"], thread.id.as_uuid().to_string());
    assert_eq!(value["chat_id"], chat.id.as_uuid().to_string());
    assert!(value.get("status").is_none());
}

#[test]
fn given_chat_message_event_then_role_is_lowercase_on_the_wire() {
    let thread = Thread::new(UserId::new("alice"));
    let chat = Chat::new(thread.id, ChatRole::User, "hi".to_string());

    let value = to_json(&ServerEvent::chat_message(&chat));

    assert_eq!(value["event"], "chat_message");
    assert_eq!(value["role"], "user");
    assert_eq!(value["content"], "hi");
    assert_eq!(value["thread_id"], thread.id.as_uuid().to_string());
}

#[test]
fn given_status_event_then_phase_serializes_lowercase() {
    let thread = Thread::new(UserId::new("alice"));
    let chat = Chat::new(thread.id, ChatRole::Assistant, String::new());

    let value = to_json(&ServerEvent::status(
        StatusPhase::Started,
        "Processing your message",
        &chat,
    ));

    assert_eq!(value["event"], "status");
    assert_eq!(value["phase"], "started");
    assert_eq!(value["message"], "Processing your message");
}

#[test]
fn given_response_chunk_then_chunk_text_is_verbatim() {
    let thread = Thread::new(UserId::new("alice"));
    let chat = Chat::new(thread.id, ChatRole::Assistant, String::new());

    let value = to_json(&ServerEvent::response_chunk("Hel".to_string(), &chat));

    assert_eq!(value["event"], "response_chunk");
    assert_eq!(value["chunk"], "Hel");
    assert_eq!(value["chat_id"], chat.id.as_uuid().to_string());
}
