//! Task Store
//!
//! SQLite implementation of `TaskStore`. Every query filters by the owning
//! user in the WHERE clause; there is no path that reads another user's
//! rows and filters afterwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use taskline_core::{
    CoreError, CoreResult, Recurrence, Task, TaskFilters, TaskPatch, TaskPriority, TaskStatus,
    TaskStore,
};

use super::database::{db_err, Database};

/// Parse a stored RFC 3339 timestamp
fn parse_ts(raw: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::storage(format!("bad timestamp {}: {}", raw, e)))
}

/// Columns selected for every task query, in `task_from_row` order
const TASK_COLUMNS: &str =
    "id, user_id, title, description, priority, due_date, status, tags, recurrence, \
     created_at, updated_at";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<RawTask> {
    Ok(RawTask {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        priority: row.get(4)?,
        due_date: row.get(5)?,
        status: row.get(6)?,
        tags: row.get(7)?,
        recurrence: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Raw task row before enum/timestamp decoding
struct RawTask {
    id: String,
    user_id: String,
    title: String,
    description: Option<String>,
    priority: String,
    due_date: Option<String>,
    status: String,
    tags: String,
    recurrence: String,
    created_at: String,
    updated_at: String,
}

impl RawTask {
    fn decode(self) -> CoreResult<Task> {
        let priority = TaskPriority::parse(&self.priority)
            .ok_or_else(|| CoreError::storage(format!("bad priority: {}", self.priority)))?;
        let status = TaskStatus::parse(&self.status)
            .ok_or_else(|| CoreError::storage(format!("bad status: {}", self.status)))?;
        let recurrence = Recurrence::parse(&self.recurrence)
            .ok_or_else(|| CoreError::storage(format!("bad recurrence: {}", self.recurrence)))?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;
        let due_date = match self.due_date {
            Some(raw) => Some(parse_ts(&raw)?),
            None => None,
        };
        Ok(Task {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            priority,
            due_date,
            status,
            tags,
            recurrence,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

/// SQLite-backed task store
#[derive(Clone)]
pub struct SqliteTaskStore {
    db: Database,
}

impl SqliteTaskStore {
    /// Create a store over an open database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn write_task(&self, task: &Task, insert: bool) -> CoreResult<()> {
        let conn = self.db.conn()?;
        let tags = serde_json::to_string(&task.tags)?;
        let sql = if insert {
            "INSERT INTO tasks (id, user_id, title, description, priority, due_date,
                                status, tags, recurrence, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        } else {
            "UPDATE tasks SET title = ?3, description = ?4, priority = ?5, due_date = ?6,
                              status = ?7, tags = ?8, recurrence = ?9, created_at = ?10,
                              updated_at = ?11
             WHERE id = ?1 AND user_id = ?2"
        };
        conn.execute(
            sql,
            params![
                task.id,
                task.user_id,
                task.title,
                task.description,
                task.priority.as_str(),
                task.due_date.map(|d| d.to_rfc3339()),
                task.status.as_str(),
                tags,
                task.recurrence.as_str(),
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn insert(&self, task: &Task) -> CoreResult<()> {
        self.write_task(task, true)
    }

    async fn get(&self, user_id: &str, id: &str) -> CoreResult<Option<Task>> {
        let conn = self.db.conn()?;
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = ?1 AND user_id = ?2",
            TASK_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        match stmt.query_row(params![id, user_id], task_from_row) {
            Ok(raw) => Ok(Some(raw.decode()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn list(&self, user_id: &str, filters: &TaskFilters) -> CoreResult<Vec<Task>> {
        let mut sql = format!("SELECT {} FROM tasks WHERE user_id = ?1", TASK_COLUMNS);
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string())];

        if let Some(status) = filters.status {
            args.push(Box::new(status.as_str().to_string()));
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if let Some(priority) = filters.priority {
            args.push(Box::new(priority.as_str().to_string()));
            sql.push_str(&format!(" AND priority = ?{}", args.len()));
        }
        if let Some(ref tag) = filters.tag {
            // Tags are stored as a JSON array; match the quoted element.
            args.push(Box::new(format!("%\"{}\"%", tag)));
            sql.push_str(&format!(" AND tags LIKE ?{}", args.len()));
        }
        if let Some(due_before) = filters.due_before {
            args.push(Box::new(due_before.to_rfc3339()));
            sql.push_str(&format!(
                " AND due_date IS NOT NULL AND due_date < ?{}",
                args.len()
            ));
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let params = rusqlite::params_from_iter(args.iter().map(|a| a.as_ref()));
        let rows = stmt.query_map(params, task_from_row).map_err(db_err)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.map_err(db_err)?.decode()?);
        }
        Ok(tasks)
    }

    async fn find_open_by_title(&self, user_id: &str, needle: &str) -> CoreResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks
             WHERE user_id = ?1 AND status = 'pending'
               AND LOWER(title) LIKE '%' || LOWER(?2) || '%'
             ORDER BY created_at ASC, id ASC",
            TASK_COLUMNS
        );
        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params![user_id, needle], task_from_row)
            .map_err(db_err)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.map_err(db_err)?.decode()?);
        }
        Ok(tasks)
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: &TaskPatch,
    ) -> CoreResult<Option<Task>> {
        let Some(mut task) = self.get(user_id, id).await? else {
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

        self.write_task(&task, false)?;
        Ok(Some(task))
    }

    async fn set_status(
        &self,
        user_id: &str,
        id: &str,
        status: TaskStatus,
    ) -> CoreResult<Option<Task>> {
        let Some(mut task) = self.get(user_id, id).await? else {
            return Ok(None);
        };
        task.status = status;
        task.updated_at = Utc::now();
        self.write_task(&task, false)?;
        Ok(Some(task))
    }

    async fn delete(&self, user_id: &str, id: &str) -> CoreResult<bool> {
        let conn = self.db.conn()?;
        let affected = conn
            .execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .map_err(db_err)?;
        Ok(affected > 0)
    }
}
