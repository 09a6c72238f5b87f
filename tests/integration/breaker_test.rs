//! Degradation behavior: breaker transitions and reasoning timeouts as
//! seen from whole turns.

use std::time::Duration;

use taskline_core::{ChatRole, ConversationStore};
use taskline_server::services::FALLBACK_REPLY;

use crate::support::{harness_with, test_config, turn, ScriptedProvider};

#[tokio::test]
async fn test_breaker_opens_after_consecutive_failures() {
    let h = harness_with(
        test_config(),
        ScriptedProvider::new(vec![
            ScriptedProvider::failure(),
            ScriptedProvider::failure(),
            ScriptedProvider::failure(),
            ScriptedProvider::failure(),
            ScriptedProvider::failure(),
        ]),
    );

    // Five failing turns: each degrades but still answers.
    for i in 0..5 {
        let response = h
            .state
            .turns
            .handle_turn("user-1", turn("user-1", &format!("message {}", i), None))
            .await
            .unwrap();
        assert!(response.degraded);
        assert_eq!(response.reply, FALLBACK_REPLY);
    }
    assert_eq!(h.provider.call_count(), 5);

    // The breaker is open now: the next turn fails fast without a call.
    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "one more", None))
        .await
        .unwrap();
    assert!(response.degraded);
    assert_eq!(h.provider.call_count(), 5);

    // Every user message survived the outage.
    let messages = h
        .conversations
        .load_messages(&response.conversation_id)
        .await
        .unwrap();
    assert_eq!(messages[0].content, "one more");
    assert_eq!(messages[1].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_probe_recovers_after_cooldown() {
    let mut config = test_config();
    config.breaker_failure_threshold = 2;
    config.breaker_cooldown_secs = 0;

    let h = harness_with(
        config,
        ScriptedProvider::new(vec![
            ScriptedProvider::failure(),
            ScriptedProvider::failure(),
            ScriptedProvider::reply("back online"),
        ]),
    );

    for _ in 0..2 {
        let response = h
            .state
            .turns
            .handle_turn("user-1", turn("user-1", "hello?", None))
            .await
            .unwrap();
        assert!(response.degraded);
    }

    // Cooldown elapsed immediately: the next turn is the probe, and it
    // closes the breaker.
    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "hello again", None))
        .await
        .unwrap();
    assert!(!response.degraded);
    assert_eq!(response.reply, "back online");
    assert_eq!(h.provider.call_count(), 3);
}

#[tokio::test]
async fn test_reasoning_timeout_degrades_and_keeps_message() {
    let mut config = test_config();
    config.reasoning_timeout_secs = 1;

    let h = harness_with(
        config,
        ScriptedProvider::new(vec![ScriptedProvider::reply("too late")])
            .with_delay(Duration::from_secs(5)),
    );

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "add a task to buy milk", None))
        .await
        .unwrap();

    // The turn degraded to the fixed fallback, not an unhandled failure.
    assert!(response.degraded);
    assert_eq!(response.reply, FALLBACK_REPLY);

    // The user's message is still in storage.
    let messages = h
        .conversations
        .load_messages(&response.conversation_id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[0].content, "add a task to buy milk");
}
