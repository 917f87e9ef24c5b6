//! Track query executor and filter query builders.
//!
//! # Responsibility
//! - Run one SELECT-shaped statement and map every row to a `Track`.
//! - Provide fixed lookups by artist, type, tag substring and name substring.
//!
//! # Invariants
//! - Row order is the storage engine's order unless the SQL says otherwise.
//! - `LIMIT` is always bound as a numeric parameter.
//! - An empty `Vec` means the query ran and matched nothing.
//!
//! `LIKE` lookups inherit SQLite's default matching: ASCII-only case folding,
//! and `%`/`_` inside user text keep their wildcard meaning.

use crate::logging::sanitize_message;
use crate::model::track::{row_to_track, RowError, Track, TrackType};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const TRACK_SELECT_SQL: &str = "SELECT * FROM music_content";
const LIST_DEFAULT_LIMIT: u32 = 20;
const SQL_SUMMARY_MAX_CHARS: usize = 80;

pub type QueryResult<T> = Result<T, QueryError>;

/// Failure while preparing, binding, stepping or mapping a query.
#[derive(Debug)]
pub enum QueryError {
    Sqlite(rusqlite::Error),
    Row(RowError),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "query failed: {err}"),
            Self::Row(err) => write!(f, "query failed: {err}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Row(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<RowError> for QueryError {
    fn from(value: RowError) -> Self {
        match value {
            RowError::Sqlite(err) => Self::Sqlite(err),
            other => Self::Row(other),
        }
    }
}

/// Options for the catalog listing view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackListQuery {
    /// Maximum rows to return. Defaults to 20.
    pub limit: u32,
    /// Newest entries first (`created_at DESC`).
    pub recent: bool,
    /// Only entries whose `raw_tags` is NULL or empty.
    pub untagged: bool,
}

impl Default for TrackListQuery {
    fn default() -> Self {
        Self {
            limit: LIST_DEFAULT_LIMIT,
            recent: false,
            untagged: false,
        }
    }
}

/// Executes `sql` with positional `params` and maps every row.
///
/// An empty `params` slice runs the statement unparameterized.
///
/// # Errors
/// - Returns [`QueryError`] for any prepare, bind, step or row-mapping
///   failure. No partial results are returned.
pub fn query_tracks(conn: &Connection, sql: &str, params: &[Value]) -> QueryResult<Vec<Track>> {
    let started_at = Instant::now();
    debug!(
        "event=track_query module=repo status=start params={} sql={}",
        params.len(),
        sql_summary(sql)
    );

    match run_query(conn, sql, params) {
        Ok(tracks) => {
            debug!(
                "event=track_query module=repo status=ok rows={} duration_ms={}",
                tracks.len(),
                started_at.elapsed().as_millis()
            );
            Ok(tracks)
        }
        Err(err) => {
            error!(
                "event=track_query module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn run_query(conn: &Connection, sql: &str, params: &[Value]) -> QueryResult<Vec<Track>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut tracks = Vec::new();

    while let Some(row) = rows.next()? {
        tracks.push(row_to_track(row)?);
    }

    Ok(tracks)
}

/// Returns every entry, optionally capped at `limit` rows.
pub fn get_all_tracks(conn: &Connection, limit: Option<u32>) -> QueryResult<Vec<Track>> {
    filtered(conn, None, Vec::new(), limit)
}

/// Returns entries whose `artist_name` equals `artist` exactly.
pub fn get_tracks_by_artist(
    conn: &Connection,
    artist: &str,
    limit: Option<u32>,
) -> QueryResult<Vec<Track>> {
    filtered(
        conn,
        Some("artist_name = ?"),
        vec![Value::Text(artist.to_string())],
        limit,
    )
}

/// Returns entries of `kind`, compared against the uppercase storage form.
pub fn get_tracks_by_type(
    conn: &Connection,
    kind: TrackType,
    limit: Option<u32>,
) -> QueryResult<Vec<Track>> {
    filtered(
        conn,
        Some("type = ?"),
        vec![Value::Text(kind.storage_str().to_string())],
        limit,
    )
}

/// Returns entries whose `raw_tags` contains `tag` anywhere.
pub fn get_tracks_by_tag(
    conn: &Connection,
    tag: &str,
    limit: Option<u32>,
) -> QueryResult<Vec<Track>> {
    filtered(
        conn,
        Some("raw_tags LIKE ?"),
        vec![Value::Text(contains_pattern(tag))],
        limit,
    )
}

/// Returns entries whose `name` contains `name` anywhere.
pub fn find_track_by_name(
    conn: &Connection,
    name: &str,
    limit: Option<u32>,
) -> QueryResult<Vec<Track>> {
    filtered(
        conn,
        Some("name LIKE ?"),
        vec![Value::Text(contains_pattern(name))],
        limit,
    )
}

/// Gets one entry by primary key.
pub fn get_track_by_id(conn: &Connection, id: i64) -> QueryResult<Option<Track>> {
    let tracks = query_tracks(
        conn,
        &format!("{TRACK_SELECT_SQL} WHERE id = ? LIMIT 1"),
        &[Value::Integer(id)],
    )?;
    Ok(tracks.into_iter().next())
}

/// Lists entries for the catalog overview.
pub fn list_tracks(conn: &Connection, query: &TrackListQuery) -> QueryResult<Vec<Track>> {
    let mut sql = String::from(TRACK_SELECT_SQL);

    if query.untagged {
        sql.push_str(" WHERE (raw_tags IS NULL OR raw_tags = '')");
    }
    if query.recent {
        sql.push_str(" ORDER BY created_at DESC");
    }
    sql.push_str(" LIMIT ?");

    query_tracks(conn, &sql, &[Value::Integer(i64::from(query.limit))])
}

fn filtered(
    conn: &Connection,
    condition: Option<&str>,
    mut bind_values: Vec<Value>,
    limit: Option<u32>,
) -> QueryResult<Vec<Track>> {
    let mut sql = String::from(TRACK_SELECT_SQL);

    if let Some(condition) = condition {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }

    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
    }

    query_tracks(conn, &sql, &bind_values)
}

fn contains_pattern(text: &str) -> String {
    format!("%{text}%")
}

fn sql_summary(sql: &str) -> String {
    let normalized = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    sanitize_message(&normalized, SQL_SUMMARY_MAX_CHARS)
}
