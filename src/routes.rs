use std::fmt;

use serde::{Deserialize, Serialize};

/// Client-side paths understood by the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "view", content = "id")]
pub enum Route {
    Home,
    Create,
    Browse,
    Session(String),
    Write(String),
    Message(String),
}

impl Route {
    /// Parses a path such as `/session/sam-lee-4k2x9q`. Query strings,
    /// fragments and a trailing slash are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        let mut segments = path.split('/').skip(1);
        let route = match (segments.next(), segments.next()) {
            (None, _) => Route::Home,
            (Some("create"), None) => Route::Create,
            (Some("browse"), None) => Route::Browse,
            (Some("session"), Some(id)) if !id.is_empty() => Route::Session(id.to_string()),
            (Some("write"), Some(id)) if !id.is_empty() => Route::Write(id.to_string()),
            (Some("message"), Some(id)) if !id.is_empty() => Route::Message(id.to_string()),
            _ => return None,
        };

        if segments.next().is_some() || !path.is_empty() && !path.starts_with('/') {
            return None;
        }
        Some(route)
    }

    pub fn session(session_id: impl Into<String>) -> Self {
        Route::Session(session_id.into())
    }

    pub fn write(session_id: impl Into<String>) -> Self {
        Route::Write(session_id.into())
    }

    pub fn message(message_id: impl Into<String>) -> Self {
        Route::Message(message_id.into())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Create => f.write_str("/create"),
            Route::Browse => f.write_str("/browse"),
            Route::Session(id) => write!(f, "/session/{id}"),
            Route::Write(id) => write!(f, "/write/{id}"),
            Route::Message(id) => write!(f, "/message/{id}"),
        }
    }
}
