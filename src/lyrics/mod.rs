//! Verse segmentation for stored lyric text.
//!
//! A verse is a chunk of text delimited by a blank line (two consecutive
//! newlines). Consecutive delimiters are not collapsed, so an empty verse is
//! possible and preserved, and a text without any blank line is one verse.

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
#[error("verse {verse} is out of range for a lyric with {verse_count} verses")]
pub struct VerseOutOfRange {
    pub verse: i64,
    pub verse_count: usize,
}

/// Splits a lyric text into its ordered verses.
pub fn verses(text: &str) -> Vec<&str> {
    text.split("\n\n").collect()
}

/// Resolves a 1-based verse index against a lyric text. Index 0 means the
/// whole text unchanged; anything outside [0, verse count] is an error.
pub fn select_verse(text: &str, verse: i64) -> Result<&str, VerseOutOfRange> {
    if verse == 0 {
        return Ok(text);
    }
    let parts = verses(text);
    if verse < 0 || verse as usize > parts.len() {
        return Err(VerseOutOfRange {
            verse,
            verse_count: parts.len(),
        });
    }
    Ok(parts[(verse - 1) as usize])
}
