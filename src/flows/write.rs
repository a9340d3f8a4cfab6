use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    db::{LetterStore, Message, NewMessage, Session},
    error::Lookup,
    events::{EventBus, FlowEvent},
    log_error, log_info, log_warn,
    routes::Route,
};

use super::{FlowError, SubmitState, TransitionError};

const ENABLE_LOGS: bool = true;

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WriteDraft {
    pub sender_name: String,
    pub message: String,
    pub spotify_url: String,
}

/// Result of the up-front session lookup. Only informs the UI; submission is
/// never blocked on it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "status", content = "detail")]
pub enum SessionCheck {
    Unchecked,
    Valid(Session),
    Missing,
    Error(FlowError),
}

/// The "write a letter" form for one letter box.
#[derive(Clone)]
pub struct WriteFlow {
    store: Arc<dyn LetterStore>,
    events: EventBus,
    session_id: String,
    redirect_delay: Duration,
    check: Arc<Mutex<SessionCheck>>,
    state: Arc<Mutex<SubmitState<Message>>>,
}

impl fmt::Debug for WriteFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteFlow")
            .field("session_id", &self.session_id)
            .field("redirect_delay", &self.redirect_delay)
            .finish_non_exhaustive()
    }
}

impl WriteFlow {
    pub fn new(
        store: Arc<dyn LetterStore>,
        events: EventBus,
        session_id: impl Into<String>,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            store,
            events,
            session_id: session_id.into(),
            redirect_delay,
            check: Arc::new(Mutex::new(SessionCheck::Unchecked)),
            state: Arc::new(Mutex::new(SubmitState::new())),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn back_route(&self) -> Route {
        Route::session(&self.session_id)
    }

    pub async fn state(&self) -> SubmitState<Message> {
        self.state.lock().await.clone()
    }

    pub async fn session_check(&self) -> SessionCheck {
        self.check.lock().await.clone()
    }

    /// Looks the letter box up so the form can warn about a bad link.
    pub async fn open(&self) -> SessionCheck {
        let check = match self.store.get_session(&self.session_id).await {
            Lookup::Found(session) => SessionCheck::Valid(session),
            Lookup::NotFound => {
                log_warn!("Writing to unknown session {}", self.session_id);
                SessionCheck::Missing
            }
            Lookup::Failed(err) => {
                log_error!("Error checking session {}: {err}", self.session_id);
                SessionCheck::Error(err.into())
            }
        };

        let mut guard = self.check.lock().await;
        *guard = check;
        guard.clone()
    }

    /// Call when the user edits the form after an error.
    pub async fn edit(&self) {
        self.state.lock().await.reset();
    }

    /// Sends the letter. On success emits [`FlowEvent::Submitted`] followed by
    /// a delayed navigation back to the letter box.
    pub async fn submit(
        &self,
        draft: &WriteDraft,
    ) -> Result<SubmitState<Message>, TransitionError> {
        let (ticket, new_message) = {
            let mut state = self.state.lock().await;
            let new_message = match NewMessage::new(
                &self.session_id,
                &draft.sender_name,
                &draft.message,
                Some(draft.spotify_url.as_str()),
            ) {
                Ok(new_message) => new_message,
                Err(err) => {
                    state.reject(err.into())?;
                    return Ok(state.clone());
                }
            };
            (state.begin()?, new_message)
        };

        let outcome = self.store.create_message(new_message).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(message) => {
                log_info!("Letter {} sent to {}", message.id, message.session_id);
                self.events.emit(FlowEvent::Submitted {
                    message_id: message.id.clone(),
                    session_id: message.session_id.clone(),
                });
                self.events.emit(FlowEvent::Navigate {
                    route: self.back_route(),
                    after: self.redirect_delay,
                });
                state.finish(ticket, Ok(message));
            }
            Err(err) => {
                log_error!("Error sending letter to {}: {err}", self.session_id);
                state.finish(ticket, Err(err.into()));
            }
        }

        Ok(state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_support::temp_db, MessageRepository, SessionRepository, ANONYMOUS_SENDER};
    use crate::flows::test_support::UnreachableStore;

    const DELAY: Duration = Duration::from_millis(2_000);

    fn draft(sender: &str, message: &str, url: &str) -> WriteDraft {
        WriteDraft {
            sender_name: sender.into(),
            message: message.into(),
            spotify_url: url.into(),
        }
    }

    #[tokio::test]
    async fn test_open_checks_session() {
        let (_dir, db) = temp_db();
        db.create_session("Alex", "alex-abc123").await.unwrap();
        let store: Arc<dyn LetterStore> = Arc::new(db);

        let flow = WriteFlow::new(store.clone(), EventBus::new(), "alex-abc123", DELAY);
        assert_eq!(flow.session_check().await, SessionCheck::Unchecked);
        assert!(matches!(flow.open().await, SessionCheck::Valid(_)));

        let missing = WriteFlow::new(store, EventBus::new(), "ghost-zzzzzz", DELAY);
        assert_eq!(missing.open().await, SessionCheck::Missing);
    }

    #[tokio::test]
    async fn test_check_failure_is_advisory() {
        let flow = WriteFlow::new(Arc::new(UnreachableStore), EventBus::new(), "alex-abc123", DELAY);
        assert!(matches!(flow.open().await, SessionCheck::Error(_)));
        assert_eq!(flow.state().await, SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_submit_stores_and_redirects_after_delay() {
        let (_dir, db) = temp_db();
        db.create_session("Alex", "alex-abc123").await.unwrap();
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let flow = WriteFlow::new(Arc::new(db.clone()), events, "alex-abc123", DELAY);

        let state = flow
            .submit(&draft("", "Hello", "https://open.spotify.com/track/abc123"))
            .await
            .unwrap();
        let message = state.value().cloned().expect("letter sent");
        assert_eq!(message.sender_name, ANONYMOUS_SENDER);
        assert_eq!(message.message, "Hello");

        assert_eq!(
            rx.recv().await.unwrap(),
            FlowEvent::Submitted {
                message_id: message.id.clone(),
                session_id: "alex-abc123".into(),
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            FlowEvent::Navigate {
                route: Route::session("alex-abc123"),
                after: DELAY,
            }
        );

        let stored = db.list_messages("alex-abc123").await.unwrap();
        assert_eq!(stored, vec![message]);
    }

    #[tokio::test]
    async fn test_blank_url_is_stored_as_absent() {
        let (_dir, db) = temp_db();
        db.create_session("Alex", "alex-abc123").await.unwrap();
        let flow = WriteFlow::new(Arc::new(db), EventBus::new(), "alex-abc123", DELAY);

        let state = flow.submit(&draft("Jordan", "Hi", "")).await.unwrap();
        assert_eq!(state.value().unwrap().spotify_url, None);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_locally() {
        let flow = WriteFlow::new(Arc::new(UnreachableStore), EventBus::new(), "alex-abc123", DELAY);
        let state = flow.submit(&draft("Jordan", "   ", "")).await.unwrap();
        assert!(matches!(state, SubmitState::Failed(FlowError::Validation(_))));

        flow.edit().await;
        assert_eq!(flow.state().await, SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_store_failure_allows_resubmit() {
        let flow = WriteFlow::new(Arc::new(UnreachableStore), EventBus::new(), "alex-abc123", DELAY);
        let state = flow.submit(&draft("Jordan", "Hi", "")).await.unwrap();
        assert_eq!(
            state,
            SubmitState::Failed(FlowError::Other("network unreachable".into()))
        );

        // Still failing, but the form accepted the second attempt.
        let state = flow.submit(&draft("Jordan", "Hi", "")).await.unwrap();
        assert!(state.error().is_some());
    }

    #[tokio::test]
    async fn test_no_second_letter_from_same_form() {
        let (_dir, db) = temp_db();
        db.create_session("Alex", "alex-abc123").await.unwrap();
        let flow = WriteFlow::new(Arc::new(db), EventBus::new(), "alex-abc123", DELAY);

        flow.submit(&draft("Jordan", "Hi", "")).await.unwrap();
        assert_eq!(
            flow.submit(&draft("Jordan", "Again", "")).await.unwrap_err(),
            TransitionError::AlreadyCompleted
        );
    }
}
