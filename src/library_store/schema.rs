//! SQLite schema for the music library database.
//!
//! Two tables: the song rows themselves, keyed by (author, song), and a
//! single-row version marker checked on startup. Column names follow the
//! original service's relation so existing databases stay readable.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table};

/// Expected value of the version marker row.
pub const SCHEMA_VERSION: i64 = 1;

/// Song rows, one per (author, song) identity.
pub const SONGS_TABLE: Table = Table {
    name: "music_library",
    columns: &[
        sqlite_column!(
            "author",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!(
            "song",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("releasedate", &SqlType::Text, non_null = true),
        sqlite_column!("song_text", &SqlType::Text, non_null = true),
        sqlite_column!("link", &SqlType::Text, non_null = true),
    ],
};

/// Single-row schema version marker.
pub const VERSION_TABLE: Table = Table {
    name: "version",
    columns: &[sqlite_column!("version", &SqlType::Integer, non_null = true)],
};

/// All library tables in creation order.
pub const LIBRARY_TABLES: &[Table] = &[SONGS_TABLE, VERSION_TABLE];
