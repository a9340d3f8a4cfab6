use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::{
        connection::Database,
        helpers::{is_unique_violation, parse_datetime, to_count, to_timestamp},
        models::{Session, SessionSummary},
        SessionRepository,
    },
    error::{Lookup, StoreError},
    ids::is_valid_session_id,
};

fn row_to_session(row: &Row) -> Result<Session> {
    let created_at: String = row.get("created_at")?;

    Ok(Session {
        session_id: row.get("session_id")?,
        name: row.get("name")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn row_to_summary(row: &Row) -> Result<SessionSummary> {
    let session = row_to_session(row)?;
    let message_count: i64 = row.get("message_count")?;

    Ok(SessionSummary {
        session_id: session.session_id,
        name: session.name,
        created_at: session.created_at,
        message_count: to_count(message_count, "message_count")?,
    })
}

impl Database {
    /// Insert a letter box. A taken `session_id` fails with
    /// [`StoreError::DuplicateKey`] (wrapped in the anyhow error).
    pub async fn insert_session(&self, name: &str, session_id: &str) -> Result<Session> {
        let name = name.trim().to_string();
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let created_at = to_timestamp(Utc::now());

            let inserted = conn.execute(
                "INSERT INTO sessions (session_id, name, created_at)
                 VALUES (?1, ?2, ?3)",
                params![session_id, name, created_at],
            );
            match inserted {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => {
                    return Err(StoreError::duplicate(session_id).into());
                }
                Err(err) => return Err(anyhow::Error::new(err).context("failed to insert session")),
            }

            let row_id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(
                "SELECT session_id, name, created_at
                 FROM sessions
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![row_id])?;
            let session = match rows.next()? {
                Some(row) => row_to_session(row)?,
                None => return Err(anyhow!("Session not found after insert")),
            };

            Ok(session)
        })
        .await
    }

    pub async fn get_session_by_public_id(&self, session_id: &str) -> Result<Option<Session>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT session_id, name, created_at
                     FROM sessions
                     WHERE session_id = ?1",
                    params![session_id],
                    |row| Ok(row_to_session(row)),
                )
                .optional()
                .context("failed to load session")?;

            row.transpose()
        })
        .await
    }

    pub async fn list_recent_session_summaries(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT s.session_id, s.name, s.created_at,
                        (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.session_id) AS message_count
                 FROM sessions s
                 ORDER BY s.created_at DESC, s.id DESC
                 LIMIT ?1",
            )?;

            let mut rows = stmt.query(params![limit])?;
            let mut summaries = Vec::new();
            while let Some(row) = rows.next()? {
                summaries.push(row_to_summary(row)?);
            }

            Ok(summaries)
        })
        .await
    }
}

#[async_trait]
impl SessionRepository for Database {
    async fn create_session(&self, name: &str, session_id: &str) -> Result<Session, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::validation("recipient name must not be empty"));
        }
        if !is_valid_session_id(session_id) {
            return Err(StoreError::validation(format!(
                "invalid session id {session_id:?}"
            )));
        }

        Ok(self.insert_session(name, session_id).await?)
    }

    async fn get_session(&self, session_id: &str) -> Lookup<Session> {
        self.get_session_by_public_id(session_id)
            .await
            .map_err(StoreError::from)
            .into()
    }

    async fn list_recent_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>, StoreError> {
        Ok(self.list_recent_session_summaries(limit).await?)
    }
}
