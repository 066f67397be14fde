//! Video link grammar.
//!
//! Accepted shapes (scheme and `www.` optional, host case-insensitive):
//!
//! - `youtube.com/watch?v=<id>`
//! - `youtube.com/embed/<id>`, `youtube.com/v/<id>`, `youtube.com/shorts/<id>`
//! - `youtu.be/<id>`
//!
//! `<id>` is exactly 11 of `[A-Za-z0-9_-]`, optionally followed by a query
//! string or fragment. The check is syntactic only; nothing is fetched.

use regex::Regex;
use std::sync::OnceLock;

const LINK_PATTERN: &str = r"^(?i:(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be))/(?:watch\?v=|embed/|v/|shorts/)?([A-Za-z0-9_-]{11})(?:[?&#].*)?$";

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LINK_PATTERN).expect("link pattern compiles"))
}

/// A link that matched the grammar, with its 11-character video id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLink {
    url: String,
    video_id: String,
}

impl VideoLink {
    /// Trims `raw` and matches it against the grammar.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = raw.trim();
        let caps = link_regex().captures(url)?;
        let video_id = caps.get(1)?.as_str().to_string();

        Some(Self {
            url: url.to_string(),
            video_id,
        })
    }

    pub fn is_valid(raw: &str) -> bool {
        link_regex().is_match(raw.trim())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn into_parts(self) -> (String, String) {
        (self.url, self.video_id)
    }
}
