use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::routes::Route;

const CHANNEL_CAPACITY: usize = 64;

/// Events a UI shell reacts to after a flow completes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum FlowEvent {
    /// Navigate to `route` once `after` has elapsed.
    Navigate {
        route: Route,
        #[serde(rename = "afterMs", serialize_with = "serialize_millis")]
        after: Duration,
    },
    SessionCreated {
        session_id: String,
    },
    Submitted {
        message_id: String,
        session_id: String,
    },
}

impl FlowEvent {
    pub fn navigate_now(route: Route) -> Self {
        FlowEvent::Navigate {
            route,
            after: Duration::ZERO,
        }
    }
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(value.as_millis() as u64)
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FlowEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.sender.subscribe()
    }

    /// Emitting without subscribers is fine; the event is dropped.
    pub fn emit(&self, event: FlowEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
