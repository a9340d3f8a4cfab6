use std::{fmt, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    db::{LetterStore, Session},
    events::{EventBus, FlowEvent},
    ids::generate_session_id,
    log_error, log_info, log_warn,
    routes::Route,
};

use super::{FlowError, SubmitState, TransitionError};

const ENABLE_LOGS: bool = true;

type IdGenerator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The "create a letter page" form.
#[derive(Clone)]
pub struct CreateFlow {
    store: Arc<dyn LetterStore>,
    events: EventBus,
    state: Arc<Mutex<SubmitState<Session>>>,
    id_generator: IdGenerator,
}

impl fmt::Debug for CreateFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateFlow").finish_non_exhaustive()
    }
}

impl CreateFlow {
    pub fn new(store: Arc<dyn LetterStore>, events: EventBus) -> Self {
        Self {
            store,
            events,
            state: Arc::new(Mutex::new(SubmitState::new())),
            id_generator: Arc::new(generate_session_id),
        }
    }

    /// Replaces the random identifier source.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.id_generator = Arc::new(generator);
        self
    }

    pub async fn state(&self) -> SubmitState<Session> {
        self.state.lock().await.clone()
    }

    /// Call when the user edits the name after an error.
    pub async fn edit(&self) {
        self.state.lock().await.reset();
    }

    /// Creates a letter box for `recipient_name`. Every attempt draws a fresh
    /// identifier, so retrying after a collision usually succeeds. The id is
    /// derived from the name as typed; only the stored name is trimmed.
    pub async fn submit(
        &self,
        recipient_name: &str,
    ) -> Result<SubmitState<Session>, TransitionError> {
        let name = recipient_name.trim();

        let (ticket, session_id) = {
            let mut state = self.state.lock().await;
            if name.is_empty() {
                state.reject(FlowError::validation("Recipient name must not be empty."))?;
                return Ok(state.clone());
            }
            let ticket = state.begin()?;
            (ticket, (self.id_generator)(recipient_name))
        };

        let outcome = self.store.create_session(name, &session_id).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(session) => {
                log_info!("Created session {}", session.session_id);
                self.events.emit(FlowEvent::SessionCreated {
                    session_id: session.session_id.clone(),
                });
                self.events
                    .emit(FlowEvent::navigate_now(Route::session(&session.session_id)));
                state.finish(ticket, Ok(session));
            }
            Err(err) => {
                if err.is_duplicate_key() {
                    log_warn!("Session id {session_id} already taken");
                } else {
                    log_error!("Error creating session: {err}");
                }
                state.finish(ticket, Err(err.into()));
            }
        }

        Ok(state.clone())
    }
}
