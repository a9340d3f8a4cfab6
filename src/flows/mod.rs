//! Per-view controllers.
//!
//! Each controller owns an explicit state enum, calls the letter store at most
//! once per user action and reports the outcome through that state plus
//! [`FlowEvent`](crate::events::FlowEvent)s. User-facing wording lives here;
//! the repositories only classify errors.

use serde::Serialize;
use thiserror::Error;

use crate::error::StoreError;

pub mod browse;
pub mod create;
pub mod message_detail;
pub mod session_view;
pub mod state;
pub mod write;

pub use browse::{BrowseFlow, BrowseState};
pub use create::CreateFlow;
pub use message_detail::{LetterView, MessageDetail, MessageDetailState};
pub use session_view::{MessagePreview, SessionPage, SessionView, SessionViewState};
pub use state::{InFlight, SubmitState, TransitionError};
pub use write::{SessionCheck, WriteDraft, WriteFlow};

pub const DUPLICATE_SESSION_MESSAGE: &str =
    "Could not create the letter page: that session ID is already taken. Please try again.";

/// Error as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "message")]
pub enum FlowError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    DuplicateKey(String),
    #[error("{0}")]
    Other(String),
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether resubmitting the same input can succeed. Validation errors
    /// need an edit first.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FlowError::Validation(_))
    }

    pub fn message(&self) -> &str {
        match self {
            FlowError::Validation(message)
            | FlowError::DuplicateKey(message)
            | FlowError::Other(message) => message,
        }
    }
}

impl From<StoreError> for FlowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => FlowError::Validation(message),
            StoreError::DuplicateKey(_) => {
                FlowError::DuplicateKey(DUPLICATE_SESSION_MESSAGE.to_string())
            }
            StoreError::Other(message) => FlowError::Other(message),
        }
    }
}
