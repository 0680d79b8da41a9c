//! Test fixture creation for the library database

use super::constants::*;
use anyhow::Result;
use music_library_server::library_store::{
    LibraryStore, SchemaResetPolicy, Song, SongDetail, SqliteLibraryStore,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// The three songs every seeded test library starts with.
///
/// Listing order is (author, song), so these are already sorted the way
/// `/library/all` returns them.
pub fn seeded_songs() -> Vec<Song> {
    vec![
        Song {
            author: SONG_1_AUTHOR.to_string(),
            title: SONG_1_TITLE.to_string(),
            detail: SongDetail {
                release_date: SONG_1_RELEASE_DATE.to_string(),
                text: SONG_1_TEXT.to_string(),
                link: SONG_1_LINK.to_string(),
            },
        },
        Song {
            author: SONG_2_AUTHOR.to_string(),
            title: SONG_2_TITLE.to_string(),
            detail: SongDetail {
                release_date: SONG_2_RELEASE_DATE.to_string(),
                text: SONG_2_TEXT.to_string(),
                link: SONG_2_LINK.to_string(),
            },
        },
        Song {
            author: SONG_3_AUTHOR.to_string(),
            title: SONG_3_TITLE.to_string(),
            detail: SongDetail {
                release_date: SONG_3_RELEASE_DATE.to_string(),
                text: SONG_3_TEXT.to_string(),
                link: SONG_3_LINK.to_string(),
            },
        },
    ]
}

/// Creates a temporary library database seeded with [`seeded_songs`].
/// Returns (temp_dir, db_path).
pub fn create_seeded_library() -> Result<(TempDir, PathBuf)> {
    let (dir, db_path) = create_empty_library()?;

    let store = SqliteLibraryStore::new(&db_path, SchemaResetPolicy::FailOnMismatch)?;
    for song in seeded_songs() {
        store.insert(&song)?;
    }

    Ok((dir, db_path))
}

/// Creates a temporary library database with the schema in place but no
/// songs. Returns (temp_dir, db_path).
pub fn create_empty_library() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("library.db");

    SqliteLibraryStore::new(&db_path, SchemaResetPolicy::WipeAndRecreate)?;

    Ok((dir, db_path))
}
