//! Letter data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const ANONYMOUS_SENDER: &str = "Anonymous";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub sender_name: String,
    pub message: String,
    pub spotify_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A letter that passed validation and is ready to insert.
///
/// The id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    session_id: String,
    sender_name: String,
    message: String,
    spotify_url: Option<String>,
}

impl NewMessage {
    /// Trims every field. A blank sender becomes [`ANONYMOUS_SENDER`] and a
    /// blank song link is dropped; a blank message is rejected.
    pub fn new(
        session_id: &str,
        sender_name: &str,
        message: &str,
        spotify_url: Option<&str>,
    ) -> Result<Self, StoreError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(StoreError::validation("session id is required"));
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(StoreError::validation("message must not be empty"));
        }

        let sender_name = match sender_name.trim() {
            "" => ANONYMOUS_SENDER,
            name => name,
        };

        let spotify_url = spotify_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(Self {
            session_id: session_id.to_string(),
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            spotify_url,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spotify_url(&self) -> Option<&str> {
        self.spotify_url.as_deref()
    }
}
