//! Round-trip and recurrence flows driven through whole turns.

use chrono::{TimeZone, Utc};

use taskline_core::{Recurrence, Task, TaskFilters, TaskStatus, TaskStore};

use crate::support::{harness, turn, ScriptedProvider};

#[tokio::test]
async fn test_add_then_list_round_trip() {
    let h = harness(vec![
        ScriptedProvider::tool_call("add_task", serde_json::json!({"title": "buy milk"})),
        ScriptedProvider::tool_call("list_tasks", serde_json::json!({})),
    ]);

    h.state
        .turns
        .handle_turn("user-1", turn("user-1", "add a task to buy milk", None))
        .await
        .unwrap();

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "what's on my list?", None))
        .await
        .unwrap();
    assert!(response.reply.contains("buy milk"));
    assert!(response.reply.contains("1 task"));
}

#[tokio::test]
async fn test_completing_daily_task_schedules_next_occurrence() {
    let h = harness(vec![ScriptedProvider::tool_call(
        "complete_task",
        serde_json::json!({"task_ref": "water plants"}),
    )]);

    let due = Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap();
    let mut task = Task::new("user-1", "water plants");
    task.recurrence = Recurrence::Daily;
    task.due_date = Some(due);
    h.tasks.insert(&task).await.unwrap();

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "done watering the plants", None))
        .await
        .unwrap();
    assert!(response.reply.contains("Completed"));

    // Exactly one successor exists, due one day later; the completed
    // task's own due date is unchanged.
    let all = h.tasks.list("user-1", &TaskFilters::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let completed = all.iter().find(|t| t.id == task.id).unwrap();
    assert_eq!(completed.status, TaskStatus::Completed);
    assert_eq!(completed.due_date, Some(due));

    let successor = all.iter().find(|t| t.id != task.id).unwrap();
    assert_eq!(successor.status, TaskStatus::Pending);
    assert_eq!(successor.recurrence, Recurrence::Daily);
    assert_eq!(successor.due_date, Some(due + chrono::Duration::days(1)));
}

#[tokio::test]
async fn test_update_then_filtered_list() {
    let h = harness(vec![
        ScriptedProvider::tool_call(
            "update_task",
            serde_json::json!({"task_ref": "report", "priority": "high"}),
        ),
        ScriptedProvider::tool_call("list_tasks", serde_json::json!({"priority": "high"})),
    ]);

    h.tasks
        .insert(&Task::new("user-1", "write report"))
        .await
        .unwrap();
    h.tasks.insert(&Task::new("user-1", "buy milk")).await.unwrap();

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "make the report high priority", None))
        .await
        .unwrap();
    assert!(response.reply.contains("Updated"));

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "show high priority tasks", None))
        .await
        .unwrap();
    assert!(response.reply.contains("write report"));
    assert!(!response.reply.contains("buy milk"));
}

#[tokio::test]
async fn test_delete_turn() {
    let h = harness(vec![ScriptedProvider::tool_call(
        "delete_task",
        serde_json::json!({"task_ref": "buy milk"}),
    )]);

    let task = Task::new("user-1", "buy milk");
    h.tasks.insert(&task).await.unwrap();

    let response = h
        .state
        .turns
        .handle_turn("user-1", turn("user-1", "remove the milk task", None))
        .await
        .unwrap();
    assert!(response.reply.contains("Deleted"));
    assert!(h.tasks.get("user-1", &task.id).await.unwrap().is_none());
}
