//! Translation of a sparse song filter plus pagination window into SQL.

use super::models::{PageWindow, SongFilter, StoreError};

/// A ready-to-run listing query: SQL text plus the five filter bindings.
#[derive(Debug)]
pub struct ListQuery {
    pub sql: String,
    pub params: [String; 5],
}

/// Builds the listing query. Every filter constraint is conditionally active,
/// so an empty value never excludes rows (exact-match semantics, never
/// substring). Ordering is always (author, song), independent of the filter,
/// which keeps pagination offsets stable between calls.
pub fn build_list_query(filter: &SongFilter, window: &PageWindow) -> Result<ListQuery, StoreError> {
    let mut sql = String::from(
        "SELECT author, song, releasedate, song_text, link FROM music_library \
         WHERE (?1 = '' OR author = ?1) \
         AND (?2 = '' OR song = ?2) \
         AND (?3 = '' OR releasedate = ?3) \
         AND (?4 = '' OR song_text = ?4) \
         AND (?5 = '' OR link = ?5) \
         ORDER BY author, song",
    );

    let offset = parse_window_value(&window.offset, "offset")?;
    let limit = parse_window_value(&window.limit, "limit")?;
    match (limit, offset) {
        (Some(limit), Some(offset)) => {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset))
        }
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
        (None, None) => {}
    }

    Ok(ListQuery {
        sql,
        params: [
            filter.author.clone(),
            filter.title.clone(),
            filter.release_date.clone(),
            filter.text.clone(),
            filter.link.clone(),
        ],
    })
}

fn parse_window_value(
    value: &Option<String>,
    param: &'static str,
) -> Result<Option<u64>, StoreError> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| StoreError::MalformedPagination {
                param,
                value: raw.to_string(),
            }),
    }
}
