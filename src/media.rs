//! Song links attached to letters.
//!
//! Only the track id is extracted; rendering the player widget is left to the
//! UI shell, which gets either an embed URL or the invalid-link placeholder.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TRACK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"track/([a-zA-Z0-9]+)").expect("track id pattern is valid"));

const EMBED_BASE: &str = "https://open.spotify.com/embed/track";

/// First `track/<id>` occurrence in `url`, if any.
pub fn extract_track_id(url: &str) -> Option<&str> {
    TRACK_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum MediaEmbed {
    Track { track_id: String, embed_url: String },
    /// The link did not contain a track id; show the placeholder.
    Invalid,
}

impl MediaEmbed {
    pub fn from_url(url: &str) -> Self {
        match extract_track_id(url) {
            Some(track_id) => MediaEmbed::Track {
                track_id: track_id.to_string(),
                embed_url: format!("{EMBED_BASE}/{track_id}?utm_source=generator"),
            },
            None => MediaEmbed::Invalid,
        }
    }

    /// `None` when the letter carries no song link at all.
    pub fn for_optional(url: Option<&str>) -> Option<Self> {
        url.map(Self::from_url)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, MediaEmbed::Track { .. })
    }
}
