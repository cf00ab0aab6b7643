//! Session operation tests
//!
//! Exercise the operations against a scripted `Api` transport and assert on
//! both the dispatched store state and the requests that went out.

use std::sync::Arc;
use std::time::Duration;

use integration_tests::fixtures::*;
use integration_tests::helpers::MockApi;
use parlor_client::{ApiError, FetchMessagesQuery, HttpMethod, MessageDraft, Session};
use parlor_core::{Action, EntityId, MessageStatus};
use parlor_store::Store;
use serde_json::json;

fn session_with(api: &Arc<MockApi>) -> Arc<Session> {
    let store = Arc::new(Store::new());
    store.dispatch(&Action::InitialDataFetched {
        data: initial_data(),
    });
    Arc::new(Session::new(
        Arc::clone(api) as Arc<dyn parlor_client::Api>,
        store,
    ))
}

fn wire_message(id: &str, channel: &str, author: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "channel": channel,
        "author": author,
        "created_at": "2024-05-01T12:00:00Z",
        "content": content,
    })
}

#[tokio::test]
async fn test_fetch_initial_data_populates_the_store() {
    let api = MockApi::new();
    api.push_json(json!({
        "user": {"id": "u1", "display_name": "alice", "wallet_address": "0xaaa"},
        "users": [{"id": "u2", "display_name": "bob", "wallet_address": "0xbbb"}],
        "channels": [{"id": "c1", "kind": "topic", "name": "general"}],
        "read_states": [],
    }));
    let store = Arc::new(Store::new());
    let session = Session::new(Arc::clone(&api) as Arc<dyn parlor_client::Api>, store);

    session.fetch_initial_data().await.unwrap();

    let state = session.store().state();
    assert_eq!(state.me.user().unwrap().name(), "alice");
    assert_eq!(state.users.len(), 2);
    assert!(state.channels.get(&EntityId::from("c1")).is_some());
    assert_eq!(api.calls()[0].path, "/ready");
}

#[tokio::test]
async fn test_create_message_reconciles_and_marks_read() {
    let api = MockApi::new();
    api.push_json(wire_message("m9", "c1", "u1", "hello"));
    api.push_empty(); // ack
    let session = session_with(&api);
    let c1 = EntityId::from("c1");

    let confirmed_id = session
        .create_message(
            &c1,
            &MessageDraft {
                content: "hello".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(confirmed_id, EntityId::from("m9"));

    let state = session.store().state();
    let order = state.messages.channel_message_ids(&c1);
    assert_eq!(order.len(), 1);
    assert!(!order[0].is_placeholder());
    assert_eq!(
        state.messages.get(&confirmed_id).unwrap().status,
        MessageStatus::Confirmed
    );

    let calls = api.calls();
    assert_eq!(calls[0].method, HttpMethod::Post);
    assert_eq!(calls[0].path, "/channels/c1/messages");
    assert_eq!(calls[1].path, "/channels/c1/ack");
}

#[tokio::test]
async fn test_create_message_failure_keeps_the_placeholder() {
    let api = MockApi::new();
    api.push_error(500);
    let session = session_with(&api);
    let c1 = EntityId::from("c1");

    let result = session
        .create_message(
            &c1,
            &MessageDraft {
                content: "doomed".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Http { status: 500, .. })));

    let state = session.store().state();
    let order = state.messages.channel_message_ids(&c1);
    assert_eq!(order.len(), 1);
    assert!(order[0].is_placeholder());
    assert_eq!(
        state.messages.get(&order[0]).unwrap().status,
        MessageStatus::FailedSend
    );
}

#[tokio::test]
async fn test_undecodable_create_response_fails_the_send() {
    let api = MockApi::new();
    // 200 with a body that is not a message
    api.push_json(json!({"ok": true}));
    let session = session_with(&api);
    let c1 = EntityId::from("c1");

    let result = session
        .create_message(
            &c1,
            &MessageDraft {
                content: "hello".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Decode(_))));

    // The placeholder must not be left pending forever
    let state = session.store().state();
    let order = state.messages.channel_message_ids(&c1);
    assert_eq!(order.len(), 1);
    assert!(order[0].is_placeholder());
    assert_eq!(
        state.messages.get(&order[0]).unwrap().status,
        MessageStatus::FailedSend
    );
}

#[tokio::test]
async fn test_fetch_messages_requires_a_limit() {
    let api = MockApi::new();
    let session = session_with(&api);

    let result = session
        .fetch_messages(
            &EntityId::from("c1"),
            &FetchMessagesQuery {
                limit: 0,
                before_message_id: None,
                after_message_id: None,
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::MissingArgument("limit"))));
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_fetch_messages_builds_cursor_query() {
    let api = MockApi::new();
    api.push_json(json!([]));
    let session = session_with(&api);

    session
        .fetch_messages(
            &EntityId::from("c1"),
            &FetchMessagesQuery {
                limit: 50,
                before_message_id: Some(EntityId::from("m1")),
                after_message_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(api.calls()[0].path, "/channels/c1/messages?limit=50&before=m1");
}

#[tokio::test(start_paused = true)]
async fn test_deleted_reply_target_becomes_a_tombstone() {
    let api = MockApi::new();
    let mut reply = wire_message("m2", "c1", "u2", "replying to a ghost");
    reply["reply_to"] = json!("m1");
    api.push_json(json!([reply]));
    api.push_error(404); // the reply target is gone
    let session = session_with(&api);

    session
        .fetch_messages(
            &EntityId::from("c1"),
            &FetchMessagesQuery {
                limit: 50,
                before_message_id: None,
                after_message_id: None,
            },
        )
        .await
        .unwrap();

    // Let the spawned reply-target fetch settle
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = session.store().state();
    let target = state.messages.get(&EntityId::from("m1")).unwrap();
    assert!(target.deleted);
    // The tombstone stands in for the entry but never joins the timeline
    assert!(!state
        .messages
        .channel_message_ids(&EntityId::from("c1"))
        .contains(&EntityId::from("m1")));
}

#[tokio::test]
async fn test_invalid_reaction_emoji_is_rejected_before_any_request() {
    let api = MockApi::new();
    let session = session_with(&api);
    session.store().dispatch(&Action::MessageFetched {
        message: message("m1", "c1", "u2", 0),
    });

    let result = session
        .add_message_reaction(&EntityId::from("m1"), "not an emoji")
        .await;

    assert!(matches!(result, Err(ApiError::InvalidEmoji(_))));
    assert_eq!(api.call_count(), 0);
    let state = session.store().state();
    assert!(state.messages.get(&EntityId::from("m1")).unwrap().reactions.is_empty());
}

#[tokio::test]
async fn test_rejected_reaction_is_compensated() {
    let api = MockApi::new();
    api.push_error(403);
    let session = session_with(&api);
    session.store().dispatch(&Action::MessageFetched {
        message: message("m1", "c1", "u2", 0),
    });

    let result = session
        .add_message_reaction(&EntityId::from("m1"), "🔥")
        .await;
    assert!(matches!(result, Err(ApiError::Http { status: 403, .. })));

    let state = session.store().state();
    assert!(state.messages.get(&EntityId::from("m1")).unwrap().reactions.is_empty());
}

#[tokio::test]
async fn test_accepted_reaction_stays_applied() {
    let api = MockApi::new();
    api.push_empty();
    let session = session_with(&api);
    session.store().dispatch(&Action::MessageFetched {
        message: message("m1", "c1", "u2", 0),
    });

    session
        .add_message_reaction(&EntityId::from("m1"), "🔥")
        .await
        .unwrap();

    let state = session.store().state();
    let reactions = &state.messages.get(&EntityId::from("m1")).unwrap().reactions;
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].count, 1);
}

#[tokio::test]
async fn test_unstar_of_unstarred_channel_is_a_local_no_op() {
    let api = MockApi::new();
    let session = session_with(&api);

    session.unstar_channel(&EntityId::from("c1")).await.unwrap();

    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_typing_notifications_are_throttled() {
    let api = MockApi::new();
    let session = session_with(&api);
    let c1 = EntityId::from("c1");

    session.register_typing_activity(&c1).await.unwrap();
    session.register_typing_activity(&c1).await.unwrap();

    assert_eq!(api.call_count(), 1);
    assert_eq!(api.calls()[0].path, "/channels/c1/typing");
}

#[tokio::test]
async fn test_logout_clears_the_store() {
    let api = MockApi::new();
    let session = session_with(&api);

    session.logout().await;

    let state = session.store().state();
    assert!(state.me.user().is_none());
    assert!(state.channels.get(&EntityId::from("c1")).is_none());
}
