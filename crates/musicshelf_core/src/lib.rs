//! Core query layer for the musicshelf catalog.
//! Owns connection bootstrap, row mapping, filter queries and console output.

pub mod db;
pub mod logging;
pub mod model;
pub mod present;
pub mod repo;
pub mod session;

pub use db::{connect, ConnectionError, DEFAULT_DB_PATH};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::track::{
    row_to_track, youtube_music_url, FieldValue, RowError, Track, TrackType,
};
pub use present::{
    format_track_line, format_tracks, print_tracks, tracks_to_json, NO_RESULTS_LINE,
};
pub use repo::track_repo::{
    find_track_by_name, get_all_tracks, get_track_by_id, get_tracks_by_artist,
    get_tracks_by_tag, get_tracks_by_type, list_tracks, query_tracks, QueryError, QueryResult,
    TrackListQuery,
};
pub use session::{Session, SessionError, SessionResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
