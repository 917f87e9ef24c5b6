//! SQLite connection entry points.
//!
//! # Responsibility
//! - Open the catalog database for the query layer.
//! - Report open failures as values instead of panics.
//!
//! # Invariants
//! - The core never creates, migrates or closes the catalog database.
//! - A returned connection has answered at least one read against
//!   `sqlite_master`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;

pub use open::connect;

/// Database path used when `connect` is called without an explicit path.
pub const DEFAULT_DB_PATH: &str = "music.db";

/// Failure to open a usable catalog database.
#[derive(Debug)]
pub struct ConnectionError {
    pub path: PathBuf,
    pub source: rusqlite::Error,
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to open database `{}`: {}",
            self.path.display(),
            self.source
        )
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
