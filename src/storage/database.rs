//! SQLite Database
//!
//! Embedded database for persistent storage using rusqlite with r2d2
//! connection pooling. Schema covers conversations, messages, and tasks;
//! all three tables carry the owning user where ownership applies.

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use taskline_core::{CoreError, CoreResult};

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Map any database-layer error into the core taxonomy
pub(crate) fn db_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::storage(e.to_string())
}

/// Database service owning the SQLite connection pool
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the database file and initialize the schema
    pub fn open(path: &Path) -> CoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(db_err)?;
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| db_err(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database for testing.
    ///
    /// Pool size is pinned to 1: each in-memory SQLite connection is its
    /// own database, so a larger pool would hand out empty ones.
    pub fn new_in_memory() -> CoreResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| db_err(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Borrow a pooled connection
    pub fn conn(&self) -> CoreResult<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| db_err(format!("Failed to get connection: {}", e)))
    }

    /// Initialize the database schema
    fn init_schema(&self) -> CoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(db_err)?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_conversations_user
             ON conversations(user_id)",
            [],
        )
        .map_err(db_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                seq INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (conversation_id, seq),
                FOREIGN KEY (conversation_id) REFERENCES conversations(id)
            )",
            [],
        )
        .map_err(db_err)?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_conversation
             ON messages(conversation_id, seq)",
            [],
        )
        .map_err(db_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                priority TEXT NOT NULL,
                due_date TEXT,
                status TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                recurrence TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(db_err)?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id)",
            [],
        )
        .map_err(db_err)?;

        Ok(())
    }

    /// Check the store is reachable; used by the readiness probe
    pub fn is_healthy(&self) -> bool {
        match self.conn() {
            Ok(conn) => conn
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool_size", &self.pool.state().connections)
            .finish()
    }
}
