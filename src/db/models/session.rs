//! Letter box data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Public slug used in links.
    pub session_id: String,
    /// Recipient's display name.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A letter box together with how many letters it holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub message_count: u64,
}

impl SessionSummary {
    pub fn letters_label(&self) -> String {
        letters_label(self.message_count)
    }
}

pub fn letters_label(count: u64) -> String {
    if count == 1 {
        "1 letter".to_string()
    } else {
        format!("{count} letters")
    }
}
