//! Conversation Store
//!
//! SQLite implementation of `ConversationStore`. Messages are append-only;
//! `seq` is assigned inside a transaction so interleaved turns still get a
//! strict per-conversation order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use taskline_core::{
    ChatMessage, ChatRole, Conversation, ConversationStore, CoreError, CoreResult,
};

use super::database::{db_err, Database};

/// Parse a stored RFC 3339 timestamp
fn parse_ts(raw: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::storage(format!("bad timestamp {}: {}", raw, e)))
}

/// SQLite-backed conversation store
#[derive(Clone)]
pub struct SqliteConversationStore {
    db: Database,
}

impl SqliteConversationStore {
    /// Create a store over an open database
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn create_conversation(&self, user_id: &str) -> CoreResult<Conversation> {
        let conversation = Conversation::new(user_id);
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO conversations (id, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                conversation.id,
                conversation.user_id,
                conversation.created_at.to_rfc3339(),
                conversation.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(conversation)
    }

    async fn load_conversation(
        &self,
        id: &str,
        caller_user_id: &str,
    ) -> CoreResult<Conversation> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, created_at, updated_at
                 FROM conversations WHERE id = ?1",
            )
            .map_err(db_err)?;

        let row = stmt
            .query_row(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    CoreError::not_found(format!("conversation {}", id))
                }
                other => db_err(other),
            })?;

        let (id, user_id, created_at, updated_at) = row;
        if user_id != caller_user_id {
            return Err(CoreError::unauthorized(format!("conversation {}", id)));
        }

        Ok(Conversation {
            id,
            user_id,
            created_at: parse_ts(&created_at)?,
            updated_at: parse_ts(&updated_at)?,
        })
    }

    async fn load_messages(&self, conversation_id: &str) -> CoreResult<Vec<ChatMessage>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, role, content, seq, created_at
                 FROM messages WHERE conversation_id = ?1
                 ORDER BY seq ASC",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![conversation_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(db_err)?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, conversation_id, role, content, seq, created_at) = row.map_err(db_err)?;
            let role = ChatRole::parse(&role)
                .ok_or_else(|| CoreError::storage(format!("bad message role: {}", role)))?;
            messages.push(ChatMessage {
                id,
                conversation_id,
                role,
                content,
                seq,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(messages)
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        role: ChatRole,
        content: &str,
    ) -> CoreResult<ChatMessage> {
        let mut conn = self.db.conn()?;
        let tx = conn.transaction().map_err(db_err)?;

        let seq: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM messages
                 WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )
            .map_err(db_err)?;

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            seq,
            created_at: Utc::now(),
        };

        tx.execute(
            "INSERT INTO messages (id, conversation_id, role, content, seq, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id,
                message.conversation_id,
                message.role.as_str(),
                message.content,
                message.seq,
                message.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;

        tx.commit().map_err(db_err)?;
        Ok(message)
    }

    async fn touch(&self, conversation_id: &str) -> CoreResult<()> {
        let conn = self.db.conn()?;
        conn.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), conversation_id],
        )
        .map_err(db_err)?;
        Ok(())
    }
}
