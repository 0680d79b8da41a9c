//! Song records and the query inputs accepted by the library store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The mutable, enrichment-provided attributes of a song. Absent fields
/// deserialize as empty strings and empty fields are omitted on output,
/// matching the wire format of the original service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetail {
    #[serde(
        rename = "releaseDate",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub release_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
}

/// A stored song. The (author, title) pair is its identity and never changes
/// after insertion; the detail fields are replaceable via update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "group", default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(rename = "song", default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(flatten)]
    pub detail: SongDetail,
}

/// Exact-match listing constraints. An empty field constrains nothing.
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub author: String,
    pub title: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Pagination as supplied by the caller. Values stay text until the query
/// builder parses them, so malformed input is rejected explicitly instead of
/// silently ignored; empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct PageWindow {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no song matches the given author and title")]
    NotFound,
    #[error("a song with this author and title already exists")]
    Conflict,
    #[error("{param} is not a valid non-negative integer: {value:?}")]
    MalformedPagination { param: &'static str, value: String },
    #[error("library database failure: {0}")]
    Backend(#[from] rusqlite::Error),
}
