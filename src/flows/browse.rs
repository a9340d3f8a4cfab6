use std::{fmt, sync::Arc};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    db::{LetterStore, SessionSummary},
    log_error,
};

use super::FlowError;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "status", content = "sessions")]
pub enum BrowseState {
    Loading,
    Loaded(Vec<SessionSummary>),
    Failed(FlowError),
}

/// Recently created letter boxes.
#[derive(Clone)]
pub struct BrowseFlow {
    store: Arc<dyn LetterStore>,
    limit: usize,
    state: Arc<Mutex<BrowseState>>,
}

impl fmt::Debug for BrowseFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowseFlow")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl BrowseFlow {
    pub fn new(store: Arc<dyn LetterStore>, limit: usize) -> Self {
        Self {
            store,
            limit,
            state: Arc::new(Mutex::new(BrowseState::Loading)),
        }
    }

    pub async fn load(&self) -> BrowseState {
        *self.state.lock().await = BrowseState::Loading;

        let next = match self.store.list_recent_sessions(self.limit).await {
            Ok(sessions) => BrowseState::Loaded(sessions),
            Err(err) => {
                log_error!("Error listing sessions: {err}");
                BrowseState::Failed(err.into())
            }
        };

        let mut state = self.state.lock().await;
        *state = next;
        state.clone()
    }
}
