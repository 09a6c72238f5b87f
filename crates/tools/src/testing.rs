//! In-memory task store for handler unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use taskline_core::{CoreResult, Task, TaskFilters, TaskPatch, TaskStatus, TaskStore};

/// A `TaskStore` backed by a vector, mirroring the SQLite implementation's
/// scoping and filter semantics closely enough for handler tests.
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Seed a task without going through a handler
    pub fn insert_direct(&self, task: Task) {
        self.tasks.lock().unwrap().push(task);
    }

    fn matches(task: &Task, filters: &TaskFilters) -> bool {
        if let Some(status) = filters.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = filters.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(ref tag) = filters.tag {
            if !task.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(due_before) = filters.due_before {
            match task.due_date {
                Some(due) if due < due_before => {}
                _ => return false,
            }
        }
        true
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: &Task) -> CoreResult<()> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str, id: &str) -> CoreResult<Option<Task>> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.user_id == user_id && t.id == id)
            .cloned())
    }

    async fn list(&self, user_id: &str, filters: &TaskFilters) -> CoreResult<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id && Self::matches(t, filters))
            .cloned()
            .collect())
    }

    async fn find_open_by_title(&self, user_id: &str, needle: &str) -> CoreResult<Vec<Task>> {
        let needle = needle.to_lowercase();
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.user_id == user_id
                    && t.is_open()
                    && t.title.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: &TaskPatch,
    ) -> CoreResult<Option<Task>> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks
            .iter_mut()
            .find(|t| t.user_id == user_id && t.id == id)
        else {
            return Ok(None);
        };
        if let Some(ref title) = patch.title {
            task.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            task.description = Some(description.clone());
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(ref tags) = patch.tags {
            task.tags = tags.clone();
        }
        if let Some(recurrence) = patch.recurrence {
            task.recurrence = recurrence;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn set_status(
        &self,
        user_id: &str,
        id: &str,
        status: TaskStatus,
    ) -> CoreResult<Option<Task>> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks
            .iter_mut()
            .find(|t| t.user_id == user_id && t.id == id)
        else {
            return Ok(None);
        };
        task.status = status;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, user_id: &str, id: &str) -> CoreResult<bool> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| !(t.user_id == user_id && t.id == id));
        Ok(tasks.len() < before)
    }
}
