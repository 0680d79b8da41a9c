//! LibraryStore trait definition.

use super::models::{PageWindow, Song, SongFilter, StoreError};

/// Storage backend for the music library.
pub trait LibraryStore: Send + Sync {
    /// Filtered, paginated listing in (author, title) order. An empty result
    /// is not an error; the caller decides what "nothing matched" means.
    fn list(&self, filter: &SongFilter, window: &PageWindow) -> Result<Vec<Song>, StoreError>;

    /// Point lookup by identity.
    fn get(&self, author: &str, title: &str) -> Result<Song, StoreError>;

    /// Inserts a new song; `Conflict` when the identity is already taken.
    fn insert(&self, song: &Song) -> Result<(), StoreError>;

    /// Replaces the detail fields of the song with this identity; `NotFound`
    /// when no such song exists (no upsert).
    fn update(&self, song: &Song) -> Result<(), StoreError>;

    /// Removes a song, returning the number of rows deleted (0 or 1).
    fn delete(&self, author: &str, title: &str) -> Result<usize, StoreError>;
}
