//! End-to-end turn flows: tool execution, direct replies, multi-turn
//! context, and disambiguation.

use taskline_core::{ChatRole, ConversationStore, Task, TaskFilters, TaskStatus, TaskStore};

use crate::support::{harness, turn, ScriptedProvider};

#[tokio::test]
async fn test_add_task_turn_persists_two_messages() {
    let h = harness(vec![ScriptedProvider::tool_call(
        "add_task",
        serde_json::json!({"title": "buy milk"}),
    )]);

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "Add a task to buy milk", None))
        .await
        .unwrap();

    assert!(!response.degraded);
    assert!(response.reply.contains("buy milk"));

    // Exactly two messages: the user's and the assistant's confirmation.
    let messages = h
        .conversations
        .load_messages(&response.conversation_id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[0].content, "Add a task to buy milk");
    assert_eq!(messages[1].role, ChatRole::Assistant);

    // The task landed, scoped to the caller.
    let tasks = h.tasks.list("user-1", &TaskFilters::default()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "buy milk");
}

#[tokio::test]
async fn test_direct_reply_skips_tools() {
    let h = harness(vec![ScriptedProvider::reply("You're welcome!")]);

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "thanks!", None))
        .await
        .unwrap();

    assert_eq!(response.reply, "You're welcome!");
    assert!(h
        .tasks
        .list("user-1", &TaskFilters::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_tool_catalog_reaches_provider() {
    let h = harness(vec![ScriptedProvider::reply("hi")]);
    h.state
        .turns
        .handle_turn("user-1", turn("user-1", "hello", None))
        .await
        .unwrap();
    // All five tools are offered on every reasoning call.
    assert_eq!(h.provider.last_tool_count(), 5);
}

#[tokio::test]
async fn test_second_turn_carries_history() {
    let h = harness(vec![
        ScriptedProvider::reply("Hello!"),
        ScriptedProvider::reply("Still here."),
    ]);

    let first = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "hi", None))
        .await
        .unwrap();
    assert_eq!(h.provider.last_history_len(), 1);

    let second = h
        .state
        .turns
        .handle_turn(
            "user-1",
            turn("user-1", "are you there?", Some(first.conversation_id.clone())),
        )
        .await
        .unwrap();

    assert_eq!(second.conversation_id, first.conversation_id);
    // user + assistant from turn one, plus the new user message.
    assert_eq!(h.provider.last_history_len(), 3);
}

#[tokio::test]
async fn test_chained_tool_calls_execute_in_order() {
    let h = harness(vec![ScriptedProvider::tool_calls(vec![
        ("add_task", serde_json::json!({"title": "buy milk"})),
        ("list_tasks", serde_json::json!({})),
    ])]);

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "add milk and show my list", None))
        .await
        .unwrap();

    // The listing ran after the add, so it already sees the new task.
    let added_at = response.reply.find("Added task").unwrap();
    let listed_at = response.reply.find("You have 1 task").unwrap();
    assert!(added_at < listed_at);
}

#[tokio::test]
async fn test_ambiguous_reference_asks_for_clarification() {
    let h = harness(vec![ScriptedProvider::tool_call(
        "complete_task",
        serde_json::json!({"task_ref": "report"}),
    )]);

    let write = Task::new("user-1", "write report");
    let review = Task::new("user-1", "review report");
    h.tasks.insert(&write).await.unwrap();
    h.tasks.insert(&review).await.unwrap();

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "complete the report task", None))
        .await
        .unwrap();

    // A clarifying question, not an error, and nothing was mutated.
    assert!(!response.degraded);
    assert!(response.reply.contains("Which one"));
    assert!(response.reply.contains("write report"));
    assert!(response.reply.contains("review report"));

    for task in h.tasks.list("user-1", &TaskFilters::default()).await.unwrap() {
        assert_eq!(task.status, TaskStatus::Pending);
    }
}

#[tokio::test]
async fn test_clarifying_question_is_persisted_for_next_turn() {
    let h = harness(vec![
        ScriptedProvider::tool_call("complete_task", serde_json::json!({"task_ref": "report"})),
        ScriptedProvider::tool_call(
            "complete_task",
            serde_json::json!({"task_ref": "write report"}),
        ),
    ]);

    let write = Task::new("user-1", "write report");
    let review = Task::new("user-1", "review report");
    h.tasks.insert(&write).await.unwrap();
    h.tasks.insert(&review).await.unwrap();

    let first = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "complete the report task", None))
        .await
        .unwrap();

    // The follow-up resolves the ambiguity through normal context flow.
    let second = h
        .state
        .turns
        .handle_turn(
            "user-1",
            turn(
                "user-1",
                "the write one",
                Some(first.conversation_id.clone()),
            ),
        )
        .await
        .unwrap();
    assert!(second.reply.contains("Completed"));

    let stored = h.tasks.get("user-1", &write.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
    let untouched = h.tasks.get("user-1", &review.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_tool_not_found_reads_as_conversation() {
    let h = harness(vec![ScriptedProvider::tool_call(
        "delete_task",
        serde_json::json!({"task_ref": "dentist"}),
    )]);

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "delete the dentist task", None))
        .await
        .unwrap();

    assert!(!response.degraded);
    assert!(response.reply.contains("no task matching"));
}
