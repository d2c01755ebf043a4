//! Video reference resolution
//!
//! Accepts bare 11-character IDs and the common URL shapes
//! (`watch?v=`, `youtu.be/`, `shorts/`, `embed/`).

use regex::Regex;
use std::sync::OnceLock;

static BARE_ID: OnceLock<Regex> = OnceLock::new();
static URL_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn bare_id() -> &'static Regex {
    BARE_ID.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid bare id regex"))
}

fn url_patterns() -> &'static [Regex] {
    URL_PATTERNS.get_or_init(|| {
        [
            r"v=([A-Za-z0-9_-]{11})",
            r"youtu\.be/([A-Za-z0-9_-]{11})",
            r"shorts/([A-Za-z0-9_-]{11})",
            r"embed/([A-Za-z0-9_-]{11})",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid url pattern"))
        .collect()
    })
}

/// Resolve a URL or bare ID to a canonical video ID; first matching pattern wins
pub fn extract_video_id(reference: &str) -> Option<String> {
    let s = reference.trim();
    if bare_id().is_match(s) {
        return Some(s.to_string());
    }

    url_patterns()
        .iter()
        .find_map(|re| re.captures(s))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Canonical watch URL for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
