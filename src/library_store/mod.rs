mod models;
mod query;
mod schema;
mod store;
mod trait_def;

pub use models::{PageWindow, Song, SongDetail, SongFilter, StoreError};
pub use query::{build_list_query, ListQuery};
pub use schema::SCHEMA_VERSION;
pub use store::{SchemaResetPolicy, SqliteLibraryStore};
pub use trait_def::LibraryStore;
