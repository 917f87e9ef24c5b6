//! Interactive session context.
//!
//! # Responsibility
//! - Own the single catalog connection used by a shell.
//! - Route shell lookups to the repository functions.
//!
//! # Invariants
//! - At most one connection is held; `connect` replaces it only on success.
//! - Queries without a connection fail with `NotConnected`, never panic.
//! - An explicit lookup limit wins over the session default.

use crate::db::{connect, ConnectionError, DEFAULT_DB_PATH};
use crate::model::track::{Track, TrackType};
use crate::repo::track_repo::{
    find_track_by_name, get_all_tracks, get_track_by_id, get_tracks_by_artist,
    get_tracks_by_tag, get_tracks_by_type, list_tracks, query_tracks, QueryError,
    TrackListQuery,
};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type SessionResult<T> = Result<T, SessionError>;

/// Failure of one session operation.
#[derive(Debug)]
pub enum SessionError {
    NotConnected,
    Connection(ConnectionError),
    Query(QueryError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no database connection; run `connect` first"),
            Self::Connection(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotConnected => None,
            Self::Connection(err) => Some(err),
            Self::Query(err) => Some(err),
        }
    }
}

impl From<ConnectionError> for SessionError {
    fn from(value: ConnectionError) -> Self {
        Self::Connection(value)
    }
}

impl From<QueryError> for SessionError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

/// Connection holder for one interactive shell.
#[derive(Default)]
pub struct Session {
    conn: Option<Connection>,
    db_path: Option<PathBuf>,
    default_limit: Option<u32>,
}

impl Session {
    /// Creates a session with no connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already opened connection.
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Some(conn),
            ..Self::default()
        }
    }

    /// Sets the limit used by lookups called without one. `None` means unlimited.
    pub fn set_default_limit(&mut self, limit: Option<u32>) {
        self.default_limit = limit;
    }

    pub fn default_limit(&self) -> Option<u32> {
        self.default_limit
    }

    /// Opens `path` (or the default path) and makes it the active connection.
    ///
    /// The previous connection stays active when opening fails.
    pub fn connect(&mut self, path: Option<&Path>) -> SessionResult<()> {
        let conn = connect(path)?;
        self.conn = Some(conn);
        self.db_path = Some(
            path.map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), Path::to_path_buf),
        );
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Path given to the last successful `connect`, if any.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Runs caller SQL with positional parameters.
    pub fn query(&self, sql: &str, params: &[Value]) -> SessionResult<Vec<Track>> {
        Ok(query_tracks(self.conn()?, sql, params)?)
    }

    pub fn all(&self, limit: Option<u32>) -> SessionResult<Vec<Track>> {
        Ok(get_all_tracks(self.conn()?, self.limit(limit))?)
    }

    pub fn by_artist(&self, artist: &str, limit: Option<u32>) -> SessionResult<Vec<Track>> {
        Ok(get_tracks_by_artist(self.conn()?, artist, self.limit(limit))?)
    }

    pub fn by_type(&self, kind: TrackType, limit: Option<u32>) -> SessionResult<Vec<Track>> {
        Ok(get_tracks_by_type(self.conn()?, kind, self.limit(limit))?)
    }

    pub fn by_tag(&self, tag: &str, limit: Option<u32>) -> SessionResult<Vec<Track>> {
        Ok(get_tracks_by_tag(self.conn()?, tag, self.limit(limit))?)
    }

    pub fn by_name(&self, name: &str, limit: Option<u32>) -> SessionResult<Vec<Track>> {
        Ok(find_track_by_name(self.conn()?, name, self.limit(limit))?)
    }

    pub fn by_id(&self, id: i64) -> SessionResult<Option<Track>> {
        Ok(get_track_by_id(self.conn()?, id)?)
    }

    pub fn list(&self, query: &TrackListQuery) -> SessionResult<Vec<Track>> {
        Ok(list_tracks(self.conn()?, query)?)
    }

    fn limit(&self, requested: Option<u32>) -> Option<u32> {
        requested.or(self.default_limit)
    }

    fn conn(&self) -> SessionResult<&Connection> {
        self.conn.as_ref().ok_or(SessionError::NotConnected)
    }
}
