//! Integration tests for resumeguide-session crate
//!
//! These tests cover the full lifecycle of sessions including:
//! - Session creation
//! - Adding messages
//! - History retrieval with limits
//! - Max message truncation
//! - Registry create/get/append with typed errors
//! - Delete and list operations
//! - Isolation between identities
//! - Concurrent access through a shared registry

use resumeguide_session::{
    session_key, Session, SessionError, SessionService, DEFAULT_MAX_MESSAGES,
};

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const APP: &str = "resume_guide";

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_session_key_composition() {
    assert_eq!(
        session_key("resume_guide", "user_profile", "session_profile_1"),
        "resume_guide:user_profile:session_profile_1"
    );
}

#[test]
fn test_session_creation() {
    let session = Session::new("resume_guide:user_a:s1");

    assert_eq!(session.key, "resume_guide:user_a:s1");
    assert!(session.messages.is_empty());
    assert!(session.metadata.is_empty());
    assert_eq!(session.created_at, session.updated_at);
    assert_eq!(session.max_messages(), DEFAULT_MAX_MESSAGES);
}

#[test]
fn test_session_creation_with_different_key_types() {
    // String key
    let session1 = Session::new("app:user:chat".to_string());
    assert_eq!(session1.key, "app:user:chat");

    // &str key
    let session2 = Session::new("app:user:456");
    assert_eq!(session2.key, "app:user:456");
}

#[tokio::test]
async fn test_adding_messages() {
    let mut session = Session::new("app:user:s1");
    let original_updated_at = session.updated_at;

    // Wait a tiny bit to ensure timestamp difference
    sleep(Duration::from_millis(10)).await;

    session.add_message("user", "Hello");

    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].role, "user");
    assert_eq!(session.messages[0].content, "Hello");
    assert!(session.messages[0].extra.is_empty());
    assert!(session.updated_at > original_updated_at);

    // Add another message
    session.add_message("assistant", "Hi there!");

    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[1].role, "assistant");
    assert_eq!(session.messages[1].content, "Hi there!");
}

#[test]
fn test_history_retrieval() {
    let mut session = Session::new("app:user:s1");

    session.add_message("user", "Hello");
    session.add_message("assistant", "Hi!");
    session.add_message("user", "How are you?");
    session.add_message("assistant", "I'm doing well!");

    // Get all history
    let history = session.get_history(10);
    assert_eq!(history.len(), 4);

    // Get last 3 messages
    let history = session.get_history(3);
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].role, "assistant");
    assert_eq!(history[0].content, Some("Hi!".to_string()));
    assert_eq!(history[1].role, "user");
    assert_eq!(history[1].content, Some("How are you?".to_string()));
    assert_eq!(history[2].role, "assistant");
    assert_eq!(history[2].content, Some("I'm doing well!".to_string()));
}

#[test]
fn test_history_retrieval_with_limits() {
    let mut session = Session::new("app:user:s1");

    // Add 5 messages
    for i in 0..5 {
        session.add_message("user", format!("Message {}", i));
    }

    // Get last 2
    let history = session.get_history(2);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, Some("Message 3".to_string()));
    assert_eq!(history[1].content, Some("Message 4".to_string()));

    // Get more than available
    let history = session.get_history(100);
    assert_eq!(history.len(), 5);

    // Get 0
    let history = session.get_history(0);
    assert_eq!(history.len(), 0);
}

#[test]
fn test_history_retrieval_empty_session() {
    let session = Session::new("app:user:s1");

    let history = session.get_history(10);
    assert!(history.is_empty());
}

#[test]
fn test_history_entries_carry_no_tool_fields() {
    let mut session = Session::new("app:user:s1");
    session.add_message("user", "Hello");

    let history = session.get_history(10);
    assert!(history[0].tool_calls.is_none());
    assert!(history[0].tool_call_id.is_none());
    assert!(history[0].name.is_none());
}

#[test]
fn test_max_messages_truncation() {
    let mut session = Session::with_max_messages("app:user:s1", 3);

    for i in 0..5 {
        session.add_message("user", format!("Message {}", i));
    }

    // Oldest messages dropped, newest kept
    assert_eq!(session.messages.len(), 3);
    assert_eq!(session.messages[0].content, "Message 2");
    assert_eq!(session.messages[2].content, "Message 4");
}

#[tokio::test]
async fn test_clear_operation() {
    let mut session = Session::new("app:user:s1");

    session.add_message("user", "Hello");
    session.add_message("assistant", "Hi!");

    let updated_before_clear = session.updated_at;
    sleep(Duration::from_millis(10)).await;

    session.clear();

    assert!(session.messages.is_empty());
    assert!(session.updated_at > updated_before_clear);
}

#[test]
fn test_clear_empty_session() {
    let mut session = Session::new("app:user:s1");

    // Should not panic
    session.clear();

    assert!(session.messages.is_empty());
}

#[test]
fn test_session_with_special_characters_in_content() {
    let mut session = Session::new("app:user:special");

    session.add_message("user", "Hello \"world\"");
    session.add_message("user", "Line 1\nLine 2");
    session.add_message("assistant", "✅ Branch saved: CSE");
    session.add_message("assistant", "🔥 'python' is HIGH DEMAND in 2024-25!");

    assert_eq!(session.messages.len(), 4);
    assert_eq!(session.messages[0].content, "Hello \"world\"");
    assert_eq!(session.messages[1].content, "Line 1\nLine 2");
    assert_eq!(session.messages[2].content, "✅ Branch saved: CSE");
    assert_eq!(
        session.messages[3].content,
        "🔥 'python' is HIGH DEMAND in 2024-25!"
    );
}

// ============================================================================
// SessionService Tests
// ============================================================================

#[tokio::test]
async fn test_create_session() {
    let service = SessionService::new();

    let session = service
        .create_session(APP, "user_profile", "session_1")
        .await
        .unwrap();

    assert_eq!(session.key, "resume_guide:user_profile:session_1");
    assert!(session.messages.is_empty());
    assert_eq!(service.session_count().await, 1);
}

#[tokio::test]
async fn test_create_duplicate_session_fails() {
    let service = SessionService::new();

    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    let result = service.create_session(APP, "user_a", "session_1").await;

    match result {
        Err(SessionError::AlreadyExists(key)) => {
            assert_eq!(key, "resume_guide:user_a:session_1");
        }
        other => panic!("Expected AlreadyExists, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_missing_session_is_not_found() {
    let service = SessionService::new();

    let result = service.get_session(APP, "user_a", "never_created").await;

    match result {
        Err(SessionError::NotFound(key)) => {
            assert_eq!(key, "resume_guide:user_a:never_created");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_session_returns_snapshot() {
    let service = SessionService::new();
    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    service
        .append_message(APP, "user_a", "session_1", "user", "Hello")
        .await
        .unwrap();

    let mut snapshot = service
        .get_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    snapshot.add_message("user", "Local only");

    // Mutating the snapshot must not affect the stored session
    let stored = service
        .get_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    assert_eq!(stored.messages.len(), 1);
}

#[tokio::test]
async fn test_append_to_missing_session_is_not_found() {
    let service = SessionService::new();

    let result = service
        .append_message(APP, "user_a", "nope", "user", "Hello")
        .await;

    assert!(matches!(result, Err(SessionError::NotFound(_))));
}

#[tokio::test]
async fn test_append_and_history_through_service() {
    let service = SessionService::new();
    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();

    service
        .append_message(APP, "user_a", "session_1", "user", "My branch is CSE")
        .await
        .unwrap();
    service
        .append_message(APP, "user_a", "session_1", "assistant", "Saved!")
        .await
        .unwrap();

    let history = service
        .get_history(APP, "user_a", "session_1", 10)
        .await
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, "user");
    assert_eq!(history[0].content, Some("My branch is CSE".to_string()));
    assert_eq!(history[1].role, "assistant");
}

#[tokio::test]
async fn test_history_for_missing_session_is_not_found() {
    let service = SessionService::new();

    let result = service.get_history(APP, "user_a", "nope", 10).await;

    assert!(matches!(result, Err(SessionError::NotFound(_))));
}

#[tokio::test]
async fn test_service_applies_max_messages() {
    let service = SessionService::with_max_messages(2);
    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();

    for i in 0..4 {
        service
            .append_message(APP, "user_a", "session_1", "user", format!("Message {}", i))
            .await
            .unwrap();
    }

    let session = service
        .get_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].content, "Message 2");
}

#[tokio::test]
async fn test_delete_session() {
    let service = SessionService::new();
    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();

    assert!(service.delete_session(APP, "user_a", "session_1").await);
    assert_eq!(service.session_count().await, 0);

    // Deleting again reports that nothing was there
    assert!(!service.delete_session(APP, "user_a", "session_1").await);
}

#[tokio::test]
async fn test_deleted_session_is_not_found() {
    let service = SessionService::new();
    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    service.delete_session(APP, "user_a", "session_1").await;

    let result = service.get_session(APP, "user_a", "session_1").await;
    assert!(matches!(result, Err(SessionError::NotFound(_))));
}

#[tokio::test]
async fn test_list_sessions_filters_by_identity() {
    let service = SessionService::new();
    service
        .create_session(APP, "user_profile", "session_b")
        .await
        .unwrap();
    service
        .create_session(APP, "user_profile", "session_a")
        .await
        .unwrap();
    service
        .create_session(APP, "user_reviewer", "session_c")
        .await
        .unwrap();

    let listed = service.list_sessions(APP, "user_profile").await;

    assert_eq!(listed, vec!["session_a", "session_b"]);
}

#[tokio::test]
async fn test_list_sessions_empty() {
    let service = SessionService::new();

    let listed = service.list_sessions(APP, "user_nobody").await;

    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_clear_all() {
    let service = SessionService::new();
    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    service
        .create_session(APP, "user_b", "session_2")
        .await
        .unwrap();

    service.clear_all().await;

    assert_eq!(service.session_count().await, 0);
}

// ============================================================================
// Isolation and Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_sessions_with_same_id_different_users_are_isolated() {
    let service = SessionService::new();
    service
        .create_session(APP, "user_profile", "session_1")
        .await
        .unwrap();
    service
        .create_session(APP, "user_reviewer", "session_1")
        .await
        .unwrap();

    service
        .append_message(APP, "user_profile", "session_1", "user", "profile talk")
        .await
        .unwrap();

    let profile = service
        .get_session(APP, "user_profile", "session_1")
        .await
        .unwrap();
    let reviewer = service
        .get_session(APP, "user_reviewer", "session_1")
        .await
        .unwrap();

    assert_eq!(profile.messages.len(), 1);
    assert!(reviewer.messages.is_empty());
}

#[tokio::test]
async fn test_concurrent_appends_through_shared_service() {
    let service = Arc::new(SessionService::new());
    service
        .create_session(APP, "user_a", "session_1")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .append_message(APP, "user_a", "session_1", "user", format!("Message {}", i))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let session = service
        .get_session(APP, "user_a", "session_1")
        .await
        .unwrap();
    assert_eq!(session.messages.len(), 10);
}

#[tokio::test]
async fn test_concurrent_creates_only_one_wins() {
    let service = Arc::new(SessionService::new());

    let mut handles = Vec::new();
    for _ in 0..5 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.create_session(APP, "user_a", "session_1").await
        }));
    }

    let mut created = 0;
    let mut already_exists = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(SessionError::AlreadyExists(_)) => already_exists += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(already_exists, 4);
    assert_eq!(service.session_count().await, 1);
}
