//! Search key normalization
//!
//! Platform titles carry annotations that no metadata source indexes
//! ("Song - Remastered 2011", "Track (feat. Someone)", "Name [Live]").
//! They are stripped before querying.

use crate::types::SearchKey;
use hitster_common::TrackRef;
use once_cell::sync::Lazy;
use regex::Regex;

/// Parenthetical remaster/featuring notes, or any bracketed content
static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\(.*(remaster(ed)?|feat\.).*\)|\[.*\])")
        .expect("annotation pattern is a valid regex")
});

const SUFFIX_SEPARATOR: &str = " - ";

/// Derive a clean search title from a raw platform title
pub fn normalize_title(raw: &str) -> String {
    let title = match raw.rfind(SUFFIX_SEPARATOR) {
        Some(idx) => raw[..idx].trim(),
        None => raw,
    };
    ANNOTATION.replace_all(title, "").trim().to_string()
}

/// Build the search key for a title and its credited artists
pub fn search_key(title: &str, artists: &[String]) -> SearchKey {
    SearchKey {
        title: normalize_title(title),
        artists: artists.to_vec(),
    }
}

/// Build the search key for a platform track
pub fn track_search_key(track: &TrackRef) -> SearchKey {
    search_key(&track.name, &track.artist_names())
}
