//! Music Library Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod enrichment;
pub mod library_store;
pub mod lyrics;
pub mod server;
pub mod service;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use library_store::{LibraryStore, SqliteLibraryStore};
pub use server::{run_server, RequestsLoggingLevel};
pub use service::{LibraryError, LibraryService};
