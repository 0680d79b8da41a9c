//! Library service: validation, lyric selection and enrichment on top of the store.

use std::sync::Arc;

use thiserror::Error;

use crate::enrichment::{Enricher, EnrichmentOutcome};
use crate::library_store::{LibraryStore, PageWindow, Song, SongDetail, SongFilter, StoreError};
use crate::lyrics;

/// Everything that can go wrong serving a library request. The server maps
/// each variant to a status code, so the split here is the split between
/// response classes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LibraryError {
    #[error("author and song are both required")]
    MissingIdentity,
    #[error("{param} is not a valid non-negative integer: {value:?}")]
    MalformedPagination { param: &'static str, value: String },
    /// Verse selector that is not an integer or points outside the lyric.
    #[error("{0}")]
    InvalidVerseIndex(String),
    #[error("no song matches the given author and title")]
    NotFound,
    #[error("a song with this author and title already exists")]
    Conflict,
    #[error("external api rejected the request")]
    UpstreamBadRequest,
    #[error("external api is not working")]
    UpstreamUnavailable,
    #[error("error trying to access external api: {0}")]
    UpstreamTransport(String),
    #[error("external api returned status {0}")]
    UpstreamUnexpected(u16),
    #[error("{0}")]
    StoreFailure(String),
}

impl From<StoreError> for LibraryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LibraryError::NotFound,
            StoreError::Conflict => LibraryError::Conflict,
            StoreError::MalformedPagination { param, value } => {
                LibraryError::MalformedPagination { param, value }
            }
            err @ StoreError::Backend(_) => LibraryError::StoreFailure(err.to_string()),
        }
    }
}

pub struct LibraryService {
    store: Arc<dyn LibraryStore>,
    enricher: Enricher,
}

impl LibraryService {
    pub fn new(store: Arc<dyn LibraryStore>, enricher: Enricher) -> Self {
        Self { store, enricher }
    }

    fn require_identity(&self, author: &str, title: &str) -> Result<(), LibraryError> {
        if author.is_empty() || title.is_empty() {
            return Err(LibraryError::MissingIdentity);
        }
        Ok(())
    }

    /// Filtered, paginated listing. An empty result is returned as-is; the
    /// server decides how to respond to it.
    pub fn list(&self, filter: &SongFilter, window: &PageWindow) -> Result<Vec<Song>, LibraryError> {
        Ok(self.store.list(filter, window)?)
    }

    /// The song's lyric, whole or a single verse. `verse` is the raw query
    /// value: absent or empty means the whole text, otherwise a 1-based
    /// verse number.
    pub fn song_text(
        &self,
        author: &str,
        title: &str,
        verse: Option<&str>,
    ) -> Result<String, LibraryError> {
        self.require_identity(author, title)?;
        let verse = match verse {
            None | Some("") => 0,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                LibraryError::InvalidVerseIndex(format!("verse {:?} is not a valid number", raw))
            })?,
        };
        let song = self.store.get(author, title)?;
        let text = lyrics::select_verse(&song.detail.text, verse)
            .map_err(|err| LibraryError::InvalidVerseIndex(err.to_string()))?;
        Ok(text.to_string())
    }

    pub fn delete(&self, author: &str, title: &str) -> Result<(), LibraryError> {
        self.require_identity(author, title)?;
        let affected = self.store.delete(author, title)?;
        if affected == 0 {
            return Err(LibraryError::NotFound);
        }
        Ok(())
    }

    /// Enrich the identity against the external song info service, then
    /// persist the result. The enricher owns the retry budget; a duplicate
    /// identity surfaces as `Conflict` after enrichment has already run.
    pub async fn create(&self, author: &str, title: &str) -> Result<Song, LibraryError> {
        self.require_identity(author, title)?;
        let detail = match self.enricher.enrich(author, title).await {
            EnrichmentOutcome::Succeeded(detail) => detail,
            EnrichmentOutcome::FailedClient => return Err(LibraryError::UpstreamBadRequest),
            EnrichmentOutcome::FailedServer => return Err(LibraryError::UpstreamUnavailable),
            EnrichmentOutcome::FailedUnexpected {
                status: Some(status),
                ..
            } => return Err(LibraryError::UpstreamUnexpected(status)),
            EnrichmentOutcome::FailedUnexpected {
                status: None,
                detail,
            } => return Err(LibraryError::UpstreamTransport(detail)),
        };
        let song = Song {
            author: author.to_string(),
            title: title.to_string(),
            detail,
        };
        self.store.insert(&song)?;
        Ok(song)
    }

    /// Replace all detail fields of an existing song.
    pub fn update(
        &self,
        author: &str,
        title: &str,
        detail: SongDetail,
    ) -> Result<(), LibraryError> {
        self.require_identity(author, title)?;
        let song = Song {
            author: author.to_string(),
            title: title.to_string(),
            detail,
        };
        self.store.update(&song)?;
        Ok(())
    }
}
