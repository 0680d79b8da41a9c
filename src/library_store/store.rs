//! SQLite-backed library store implementation.

use super::models::{PageWindow, Song, SongDetail, SongFilter, StoreError};
use super::query::build_list_query;
use super::schema::{LIBRARY_TABLES, SCHEMA_VERSION, VERSION_TABLE};
use super::trait_def::LibraryStore;
use anyhow::{bail, Context, Result};
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Number of read-only connections handed out round-robin.
const READ_POOL_SIZE: usize = 4;

/// What to do when the database on disk does not match the expected schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SchemaResetPolicy {
    /// Drop and recreate all tables, losing stored songs (the historical
    /// behavior).
    #[default]
    WipeAndRecreate,
    /// Refuse to start so the operator can intervene.
    FailOnMismatch,
}

/// SQLite-backed music library store: one serialized write connection plus a
/// small pool of read-only connections.
#[derive(Clone)]
pub struct SqliteLibraryStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn create_schema(conn: &Connection) -> Result<()> {
    for table in LIBRARY_TABLES {
        table.create(conn)?;
    }
    conn.execute(
        "INSERT INTO version (version) VALUES (?1)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Returns a human-readable reason when the stored schema cannot be used
/// as-is, or `None` when everything matches.
fn schema_mismatch(conn: &Connection) -> Result<Option<String>> {
    let version_table_exists: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?1",
            params![VERSION_TABLE.name],
            |_| Ok(true),
        )
        .unwrap_or(false);
    if !version_table_exists {
        return Ok(Some("the version marker table is missing".to_string()));
    }

    let stored_version = match conn.query_row("SELECT version FROM version LIMIT 1", [], |r| {
        r.get::<_, i64>(0)
    }) {
        Ok(version) => Some(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e.into()),
    };
    match stored_version {
        None => return Ok(Some("the version marker row is missing".to_string())),
        Some(version) if version != SCHEMA_VERSION => {
            return Ok(Some(format!(
                "schema version is {}, expected {}",
                version, SCHEMA_VERSION
            )))
        }
        Some(_) => {}
    }

    for table in LIBRARY_TABLES {
        if let Err(err) = table.validate(conn) {
            return Ok(Some(err.to_string()));
        }
    }
    Ok(None)
}

fn migrate_if_needed(conn: &mut Connection, policy: SchemaResetPolicy) -> Result<()> {
    // Brand new database, create the schema directly
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);
    if table_count == 0 {
        info!(
            "Creating music library schema at version {}",
            SCHEMA_VERSION
        );
        return create_schema(conn);
    }

    let Some(reason) = schema_mismatch(conn)? else {
        return Ok(());
    };

    match policy {
        SchemaResetPolicy::FailOnMismatch => bail!(
            "Library database does not match the expected schema: {}. \
             Start with --schema-policy wipe-and-recreate to rebuild it \
             (all stored songs are lost).",
            reason
        ),
        SchemaResetPolicy::WipeAndRecreate => {
            warn!(
                "Library database does not match the expected schema ({}), \
                 wiping and recreating it. All stored songs are lost.",
                reason
            );
            let tx = conn.transaction()?;
            for table in LIBRARY_TABLES {
                tx.execute(&format!("DROP TABLE IF EXISTS {}", table.name), [])?;
            }
            create_schema(&tx)?;
            tx.commit()?;
            Ok(())
        }
    }
}

impl SqliteLibraryStore {
    pub fn new<P: AsRef<Path>>(db_path: P, schema_policy: SchemaResetPolicy) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open library database")?;

        migrate_if_needed(&mut write_conn, schema_policy)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let song_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM music_library", [], |r| r.get(0))
            .unwrap_or(0);
        info!("Opened music library: {} songs", song_count);

        let mut read_pool = Vec::with_capacity(READ_POOL_SIZE);
        for _ in 0..READ_POOL_SIZE {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteLibraryStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn parse_song_row(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        Ok(Song {
            author: row.get(0)?,
            title: row.get(1)?,
            detail: SongDetail {
                release_date: row.get(2)?,
                text: row.get(3)?,
                link: row.get(4)?,
            },
        })
    }
}

impl LibraryStore for SqliteLibraryStore {
    fn list(&self, filter: &SongFilter, window: &PageWindow) -> Result<Vec<Song>, StoreError> {
        let query = build_list_query(filter, window)?;

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&query.sql)?;
        let songs = stmt
            .query_map(params_from_iter(query.params.iter()), Self::parse_song_row)?
            .collect::<Result<Vec<Song>, _>>()?;
        Ok(songs)
    }

    fn get(&self, author: &str, title: &str) -> Result<Song, StoreError> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT author, song, releasedate, song_text, link FROM music_library \
             WHERE author = ?1 AND song = ?2",
        )?;

        match stmt.query_row(params![author, title], Self::parse_song_row) {
            Ok(song) => Ok(song),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn insert(&self, song: &Song) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        match conn.execute(
            "INSERT INTO music_library (author, song, releasedate, song_text, link) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                song.author,
                song.title,
                song.detail.release_date,
                song.detail.text,
                song.detail.link
            ],
        ) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, song: &Song) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let affected = conn.execute(
            "UPDATE music_library SET releasedate = ?1, song_text = ?2, link = ?3 \
             WHERE author = ?4 AND song = ?5",
            params![
                song.detail.release_date,
                song.detail.text,
                song.detail.link,
                song.author,
                song.title
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, author: &str, title: &str) -> Result<usize, StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let affected = conn.execute(
            "DELETE FROM music_library WHERE author = ?1 AND song = ?2",
            params![author, title],
        )?;
        Ok(affected)
    }
}
