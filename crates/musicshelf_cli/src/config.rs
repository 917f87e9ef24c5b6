//! Shell configuration resolution.
//!
//! # Responsibility
//! - Resolve database path and logging settings for one shell process.
//!
//! # Invariants
//! - Precedence is command-line flag, then environment, then default.
//! - `log_dir` is always absolute after resolution.

use musicshelf_core::{default_log_level, DEFAULT_DB_PATH};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "MUSICSHELF_DB";
pub const ENV_LOG_LEVEL: &str = "MUSICSHELF_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MUSICSHELF_LOG_DIR";
const DEFAULT_LOG_DIR_NAME: &str = "musicshelf-logs";

pub const USAGE: &str = "usage: musicshelf [--db <path>] [--log-level <level>] [--log-dir <dir>]";

/// Resolved settings for the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingValue(String),
    UnknownArgument(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingValue(flag) => write!(f, "missing value for `{flag}`\n{USAGE}"),
            Self::UnknownArgument(arg) => write!(f, "unknown argument `{arg}`\n{USAGE}"),
        }
    }
}

impl Error for ConfigError {}

impl ReplConfig {
    /// Resolves settings from process arguments and environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// Returns `Ok(None)` when `--help` was requested.
    pub fn from_process() -> Result<Option<Self>, ConfigError> {
        dotenv::dotenv().ok();
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Resolves settings from explicit arguments and an environment lookup.
    pub fn resolve<I, F>(args: I, env: F) -> Result<Option<Self>, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut db_path = None;
        let mut log_level = None;
        let mut log_dir = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let slot = match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--db" => &mut db_path,
                "--log-level" => &mut log_level,
                "--log-dir" => &mut log_dir,
                _ => return Err(ConfigError::UnknownArgument(arg)),
            };
            let value = args.next().ok_or(ConfigError::MissingValue(arg))?;
            *slot = Some(value);
        }

        let db_path = db_path
            .or_else(|| env(ENV_DB_PATH))
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let log_level = log_level
            .or_else(|| env(ENV_LOG_LEVEL))
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = log_dir
            .or_else(|| env(ENV_LOG_DIR))
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));

        Ok(Some(Self {
            db_path: PathBuf::from(db_path),
            log_level,
            log_dir: absolutize(&log_dir),
        }))
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => std::env::temp_dir().join(path),
    }
}
