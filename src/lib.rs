//! Letter boxes: someone creates a named box, shares its link, and visitors
//! leave letters in it, optionally with a song.
//!
//! [`App`] wires the letter store, configuration and event bus together and
//! turns a [`Route`] into the [`View`] a UI shell should show.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod flows;
pub mod ids;
pub mod media;
pub mod routes;
pub mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use tokio::sync::broadcast;

pub use config::{AppConfig, ConfigStore};
pub use db::{Database, LetterStore, Message, NewMessage, Session, SessionSummary};
pub use error::{Lookup, StoreError};
pub use events::{EventBus, FlowEvent};
pub use flows::{
    BrowseFlow, BrowseState, CreateFlow, FlowError, MessageDetail, MessageDetailState,
    SessionView, SessionViewState, SubmitState, TransitionError, WriteDraft, WriteFlow,
};
pub use media::MediaEmbed;
pub use routes::Route;

/// What to render for a route.
#[derive(Debug)]
pub enum View {
    /// Landing page; it hosts the create form.
    Home(CreateFlow),
    Create(CreateFlow),
    Browse(BrowseState),
    Session(SessionViewState),
    Write(WriteFlow),
    Message(MessageDetailState),
    UnknownRoute(String),
}

pub struct App {
    config: AppConfig,
    db: Option<Database>,
    store: Arc<dyn LetterStore>,
    events: EventBus,
}

impl App {
    /// Reads the config file (plus `LETTERBOX_*` overrides) and opens the
    /// database it points at.
    pub fn from_config_file(path: PathBuf) -> Result<Self> {
        let config = ConfigStore::load(path)?.get();
        Self::open(config)
    }

    pub fn open(config: AppConfig) -> Result<Self> {
        utils::init_logging(config.debug);
        log::info!("Letterbox starting up...");

        let database = Database::new(config.database_path.clone())?;
        let store: Arc<dyn LetterStore> = Arc::new(database.clone());

        Ok(Self {
            config,
            db: Some(database),
            store,
            events: EventBus::new(),
        })
    }

    /// Runs against an arbitrary store instead of the SQLite database.
    pub fn with_store(config: AppConfig, store: Arc<dyn LetterStore>) -> Self {
        Self {
            config,
            db: None,
            store,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    pub fn store(&self) -> Arc<dyn LetterStore> {
        self.store.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn create_flow(&self) -> CreateFlow {
        CreateFlow::new(self.store(), self.events.clone())
    }

    pub fn write_flow(&self, session_id: &str) -> WriteFlow {
        WriteFlow::new(
            self.store(),
            self.events.clone(),
            session_id,
            self.config.redirect_delay(),
        )
    }

    pub async fn navigate(&self, route: Route) -> View {
        match route {
            Route::Home => View::Home(self.create_flow()),
            Route::Create => View::Create(self.create_flow()),
            Route::Browse => {
                let flow = BrowseFlow::new(self.store(), self.config.browse_limit);
                View::Browse(flow.load().await)
            }
            Route::Session(session_id) => {
                let view = SessionView::new(self.store());
                View::Session(view.load(&session_id).await)
            }
            Route::Write(session_id) => {
                let flow = self.write_flow(&session_id);
                flow.open().await;
                View::Write(flow)
            }
            Route::Message(message_id) => {
                let detail = MessageDetail::new(self.store());
                View::Message(detail.load(&message_id).await)
            }
        }
    }

    pub async fn open_path(&self, path: &str) -> View {
        match Route::parse(path) {
            Some(route) => self.navigate(route).await,
            None => {
                log::warn!("No view for path {path}");
                View::UnknownRoute(path.to_string())
            }
        }
    }
}
