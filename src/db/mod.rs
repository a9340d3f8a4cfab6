//! Letter store: a SQLite database behind a single worker thread.
//!
//! Flows talk to it only through [`SessionRepository`] and
//! [`MessageRepository`], so tests can substitute their own store.

use async_trait::async_trait;

use crate::error::{Lookup, StoreError};

pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use migrations::CURRENT_SCHEMA_VERSION;
pub use models::{Message, NewMessage, Session, SessionSummary, ANONYMOUS_SENDER};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts a letter box under `session_id`. A taken id yields
    /// [`StoreError::DuplicateKey`]; nothing is retried.
    async fn create_session(&self, name: &str, session_id: &str) -> Result<Session, StoreError>;

    async fn get_session(&self, session_id: &str) -> Lookup<Session>;

    /// Newest letter boxes with their letter counts, at most `limit`.
    async fn list_recent_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>, StoreError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create_message(&self, draft: NewMessage) -> Result<Message, StoreError>;

    /// Newest first. An unknown or empty session yields an empty list.
    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError>;

    async fn get_message(&self, message_id: &str) -> Lookup<Message>;
}

/// Everything the flows need from storage.
pub trait LetterStore: SessionRepository + MessageRepository {}

impl<T: SessionRepository + MessageRepository> LetterStore for T {}
