use std::{fmt, sync::Arc};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    db::{LetterStore, Message},
    error::Lookup,
    log_error,
    media::MediaEmbed,
    routes::Route,
};

use super::FlowError;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LetterView {
    pub message: Message,
    /// `None` when the letter has no song link.
    pub media: Option<MediaEmbed>,
    pub back: Route,
}

impl From<Message> for LetterView {
    fn from(message: Message) -> Self {
        Self {
            media: MediaEmbed::for_optional(message.spotify_url.as_deref()),
            back: Route::session(&message.session_id),
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "status", content = "letter")]
pub enum MessageDetailState {
    Loading,
    Loaded(LetterView),
    /// Terminal; the view offers a way back home.
    NotFound,
    Failed(FlowError),
}

#[derive(Clone)]
pub struct MessageDetail {
    store: Arc<dyn LetterStore>,
    state: Arc<Mutex<MessageDetailState>>,
}

impl fmt::Debug for MessageDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDetail").finish_non_exhaustive()
    }
}

impl MessageDetail {
    pub fn new(store: Arc<dyn LetterStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(MessageDetailState::Loading)),
        }
    }

    pub async fn state(&self) -> MessageDetailState {
        self.state.lock().await.clone()
    }

    pub async fn load(&self, message_id: &str) -> MessageDetailState {
        *self.state.lock().await = MessageDetailState::Loading;

        let next = match self.store.get_message(message_id).await {
            Lookup::Found(message) => MessageDetailState::Loaded(message.into()),
            Lookup::NotFound => MessageDetailState::NotFound,
            Lookup::Failed(err) => {
                log_error!("Error loading letter {message_id}: {err}");
                MessageDetailState::Failed(err.into())
            }
        };

        let mut state = self.state.lock().await;
        *state = next;
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_support::temp_db, Database, MessageRepository, NewMessage, SessionRepository};
    use crate::flows::test_support::UnreachableStore;

    async fn letter_with_url(db: &Database, url: &str) -> Message {
        db.create_session("Alex", "alex-abc123").await.ok();
        db.create_message(NewMessage::new("alex-abc123", "Jordan", "Hello", Some(url)).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_track_link_renders_widget() {
        let (_dir, db) = temp_db();
        let message = letter_with_url(&db, "https://open.spotify.com/track/abc123").await;

        let detail = MessageDetail::new(Arc::new(db));
        let MessageDetailState::Loaded(view) = detail.load(&message.id).await else {
            panic!("expected letter");
        };
        assert_eq!(view.message.message, "Hello");
        assert_eq!(view.back, Route::session("alex-abc123"));
        match view.media {
            Some(MediaEmbed::Track { track_id, .. }) => assert_eq!(track_id, "abc123"),
            other => panic!("expected track embed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_link_renders_placeholder() {
        let (_dir, db) = temp_db();
        let message = letter_with_url(&db, "not-a-url").await;

        let detail = MessageDetail::new(Arc::new(db));
        let MessageDetailState::Loaded(view) = detail.load(&message.id).await else {
            panic!("expected letter");
        };
        assert_eq!(view.media, Some(MediaEmbed::Invalid));
    }

    #[tokio::test]
    async fn test_no_link_no_widget() {
        let (_dir, db) = temp_db();
        let message = letter_with_url(&db, "").await;

        let detail = MessageDetail::new(Arc::new(db));
        let MessageDetailState::Loaded(view) = detail.load(&message.id).await else {
            panic!("expected letter");
        };
        assert_eq!(view.message.spotify_url, None);
        assert_eq!(view.media, None);
    }

    #[tokio::test]
    async fn test_missing_letter_is_terminal() {
        let (_dir, db) = temp_db();
        let detail = MessageDetail::new(Arc::new(db));
        assert_eq!(detail.load("missing").await, MessageDetailState::NotFound);
        assert_eq!(detail.state().await, MessageDetailState::NotFound);
    }

    #[tokio::test]
    async fn test_store_failure() {
        let detail = MessageDetail::new(Arc::new(UnreachableStore));
        assert!(matches!(
            detail.load("any").await,
            MessageDetailState::Failed(FlowError::Other(_))
        ));
    }
}
