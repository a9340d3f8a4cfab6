use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    db::{models::letters_label, LetterStore, Message, Session},
    error::Lookup,
    log_error,
    routes::Route,
};

use super::FlowError;

const ENABLE_LOGS: bool = true;

/// Characters of a letter shown on its card before it is cut off.
pub const PREVIEW_CHARS: usize = 120;

pub const EMPTY_STATE_TEXT: &str = "No letters yet. Be the first to write one!";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagePreview {
    pub id: String,
    pub preview: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
    pub route: Route,
}

impl From<&Message> for MessagePreview {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            preview: preview_text(&message.message),
            sender_name: message.sender_name.clone(),
            created_at: message.created_at,
            route: Route::message(&message.id),
        }
    }
}

fn preview_text(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", body[..cut].trim_end()),
        None => body.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    pub session: Session,
    pub letters: Vec<MessagePreview>,
    /// Set when the letter list could not be loaded; `letters` is then empty.
    pub error: Option<FlowError>,
}

impl SessionPage {
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// `None` when the letters could not be loaded, so no count is shown.
    pub fn letters_label(&self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        Some(format!("{} received", letters_label(self.letters.len() as u64)))
    }

    pub fn empty_state(&self) -> Option<&'static str> {
        (self.is_empty() && self.error.is_none()).then_some(EMPTY_STATE_TEXT)
    }

    pub fn write_route(&self) -> Route {
        Route::write(&self.session.session_id)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "status", content = "page")]
pub enum SessionViewState {
    Loading,
    Loaded(SessionPage),
    /// Terminal: the letter box does not exist.
    NotFound,
    Failed(FlowError),
}

/// A recipient's letter box with the letters it has received.
#[derive(Clone)]
pub struct SessionView {
    store: Arc<dyn LetterStore>,
    state: Arc<Mutex<SessionViewState>>,
}

impl fmt::Debug for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionView").finish_non_exhaustive()
    }
}

impl SessionView {
    pub fn new(store: Arc<dyn LetterStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(SessionViewState::Loading)),
        }
    }

    pub async fn state(&self) -> SessionViewState {
        self.state.lock().await.clone()
    }

    pub async fn load(&self, session_id: &str) -> SessionViewState {
        *self.state.lock().await = SessionViewState::Loading;

        let next = match self.store.get_session(session_id).await {
            Lookup::NotFound => SessionViewState::NotFound,
            Lookup::Failed(err) => {
                log_error!("Error loading session {session_id}: {err}");
                SessionViewState::Failed(err.into())
            }
            Lookup::Found(session) => {
                let (letters, error) = match self.store.list_messages(session_id).await {
                    Ok(messages) => (messages.iter().map(MessagePreview::from).collect(), None),
                    Err(err) => {
                        log_error!("Error loading letters for {session_id}: {err}");
                        (Vec::new(), Some(err.into()))
                    }
                };
                SessionViewState::Loaded(SessionPage {
                    session,
                    letters,
                    error,
                })
            }
        };

        let mut state = self.state.lock().await;
        *state = next;
        state.clone()
    }
}
