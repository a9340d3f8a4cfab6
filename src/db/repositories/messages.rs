use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::{
    db::{
        connection::Database,
        helpers::{parse_datetime, to_timestamp},
        models::{Message, NewMessage},
        MessageRepository,
    },
    error::{Lookup, StoreError},
};

const MESSAGE_COLUMNS: &str = "id, session_id, sender_name, message, spotify_url, created_at";

fn row_to_message(row: &Row) -> Result<Message> {
    let created_at: String = row.get("created_at")?;

    Ok(Message {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        sender_name: row.get("sender_name")?,
        message: row.get("message")?,
        spotify_url: row.get("spotify_url")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Insert a letter. Does not check that the session exists beyond what
    /// the foreign key enforces.
    pub async fn insert_message(&self, draft: NewMessage) -> Result<Message> {
        self.execute(move |conn| {
            let id = Uuid::new_v4().to_string();
            let created_at = to_timestamp(Utc::now());

            conn.execute(
                "INSERT INTO messages (id, session_id, sender_name, message, spotify_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    draft.session_id(),
                    draft.sender_name(),
                    draft.message(),
                    draft.spotify_url(),
                    created_at,
                ],
            )
            .with_context(|| format!("failed to insert message into {}", draft.session_id()))?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![id])?;
            let message = match rows.next()? {
                Some(row) => row_to_message(row)?,
                None => return Err(anyhow!("Message not found after insert")),
            };

            Ok(message)
        })
        .await
    }

    /// Letters for one session, newest first.
    pub async fn get_messages_for_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            // rowid breaks ties between letters written in the same microsecond.
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM messages
                 WHERE session_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let mut messages = Vec::new();
            while let Some(row) = rows.next()? {
                messages.push(row_to_message(row)?);
            }

            Ok(messages)
        })
        .await
    }

    pub async fn get_message_by_id(&self, message_id: &str) -> Result<Option<Message>> {
        let message_id = message_id.to_string();
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                    params![message_id],
                    |row| Ok(row_to_message(row)),
                )
                .optional()
                .context("failed to load message")?;

            row.transpose()
        })
        .await
    }
}

#[async_trait]
impl MessageRepository for Database {
    async fn create_message(&self, draft: NewMessage) -> Result<Message, StoreError> {
        Ok(self.insert_message(draft).await?)
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        Ok(self.get_messages_for_session(session_id).await?)
    }

    async fn get_message(&self, message_id: &str) -> Lookup<Message> {
        self.get_message_by_id(message_id)
            .await
            .map_err(StoreError::from)
            .into()
    }
}
