//! Track domain model and row mapper.
//!
//! # Responsibility
//! - Define the unified record for song/album/playlist/artist entries.
//! - Decode one `music_content` row into a `Track`.
//!
//! # Invariants
//! - `id`, `name` and `kind` are always present on a `Track`.
//! - `kind` falls back to `TrackType::Unknown` for NULL, absent or
//!   unrecognized stored values.
//! - Absent optional columns stay `None`; they are never defaulted to `""`.

use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const YOUTUBE_MUSIC_BASE_URL: &str = "https://music.youtube.com";

/// Serialized names of the core fields; extras never reuse them.
const CANONICAL_KEYS: [&str; 9] = [
    "id",
    "name",
    "artist-name",
    "type",
    "youtube-id",
    "description",
    "raw-tags",
    "created-at",
    "updated-at",
];

/// Entry category stored in `music_content.type`.
///
/// Storage keeps uppercase values (`SONG`, `ALBUM`, ...); the canonical tag
/// used in memory and output is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Song,
    Album,
    Playlist,
    Artist,
    /// Stored type was NULL, missing from the row, or not a known value.
    Unknown,
}

impl TrackType {
    /// Lowercase canonical tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Song => "song",
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Artist => "artist",
            Self::Unknown => "unknown",
        }
    }

    /// Uppercase form used by the storage convention.
    pub fn storage_str(self) -> &'static str {
        match self {
            Self::Song => "SONG",
            Self::Album => "ALBUM",
            Self::Playlist => "PLAYLIST",
            Self::Artist => "ARTIST",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a user or storage string, ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "song" => Some(Self::Song),
            "album" => Some(Self::Album),
            "playlist" => Some(Self::Playlist),
            "artist" => Some(Self::Artist),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Maps a stored type value, tolerating NULL and unexpected strings.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(Self::Unknown)
    }
}

impl Display for TrackType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-NULL value of a column the mapper does not rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Canonical catalog record.
///
/// Serialized field names use the hyphenated canonical spelling
/// (`artist-name`, `raw-tags`, ...); `extras` are flattened under their
/// original column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub artist_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TrackType,
    pub youtube_id: Option<String>,
    pub description: Option<String>,
    /// Opaque tag text; never split or validated here.
    pub raw_tags: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Columns outside the core set (`duration_ms`, `rating`, `parent_id`, ...).
    #[serde(flatten)]
    pub extras: BTreeMap<String, FieldValue>,
}

impl Track {
    /// Creates a record with only the required fields set.
    pub fn new(id: i64, name: impl Into<String>, kind: TrackType) -> Self {
        Self {
            id,
            name: name.into(),
            artist_name: None,
            kind,
            youtube_id: None,
            description: None,
            raw_tags: None,
            created_at: None,
            updated_at: None,
            extras: BTreeMap::new(),
        }
    }

    /// YouTube Music link for this entry, when it has a usable id and type.
    pub fn youtube_music_url(&self) -> Option<String> {
        youtube_music_url(self.kind, self.youtube_id.as_deref()?)
    }
}

/// Builds the YouTube Music URL for an entry of `kind`.
///
/// Returns `None` for `TrackType::Unknown` or a blank id.
pub fn youtube_music_url(kind: TrackType, youtube_id: &str) -> Option<String> {
    let youtube_id = youtube_id.trim();
    if youtube_id.is_empty() {
        return None;
    }
    match kind {
        TrackType::Artist => Some(format!("{YOUTUBE_MUSIC_BASE_URL}/channel/{youtube_id}")),
        TrackType::Song => Some(format!("{YOUTUBE_MUSIC_BASE_URL}/watch?v={youtube_id}")),
        TrackType::Album | TrackType::Playlist => Some(format!(
            "{YOUTUBE_MUSIC_BASE_URL}/playlist?list={youtube_id}"
        )),
        TrackType::Unknown => None,
    }
}

/// Row decoding failure at the storage boundary.
#[derive(Debug)]
pub enum RowError {
    /// A required column is not part of the result set.
    MissingColumn(&'static str),
    /// A required column is present but NULL.
    NullValue(&'static str),
    /// A column value has a storage type the record cannot hold.
    InvalidValue { column: String, message: String },
    Sqlite(rusqlite::Error),
}

impl Display for RowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "result row has no `{column}` column"),
            Self::NullValue(column) => write!(f, "result row has NULL `{column}`"),
            Self::InvalidValue { column, message } => {
                write!(f, "invalid value in column `{column}`: {message}")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for RowError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Maps one result row into a [`Track`].
///
/// Columns are matched by name (ASCII case-insensitive). Unrecognized
/// non-NULL columns are carried in `Track::extras`, except ones spelled like
/// a serialized core field (`raw-tags`, ...), which are dropped.
///
/// # Errors
/// - `MissingColumn`/`NullValue` when `id` or `name` is unavailable.
/// - `InvalidValue` when a core column holds an incompatible storage type.
pub fn row_to_track(row: &Row<'_>) -> Result<Track, RowError> {
    let mut id = None;
    let mut name = None;
    let mut seen_id = false;
    let mut seen_name = false;
    let mut stored_type = None;
    let mut track = Track::new(0, String::new(), TrackType::Unknown);

    let column_names = row.as_ref().column_names();
    for (index, column) in column_names.into_iter().enumerate() {
        let value = row.get_ref(index)?;
        match column.to_ascii_lowercase().as_str() {
            "id" => {
                seen_id = true;
                id = integer_value(column, value)?;
            }
            "name" => {
                seen_name = true;
                name = text_value(column, value)?;
            }
            "type" => stored_type = text_value(column, value)?,
            "artist_name" => track.artist_name = text_value(column, value)?,
            "youtube_id" => track.youtube_id = text_value(column, value)?,
            "description" => track.description = text_value(column, value)?,
            "raw_tags" => track.raw_tags = text_value(column, value)?,
            "created_at" => track.created_at = text_value(column, value)?,
            "updated_at" => track.updated_at = text_value(column, value)?,
            lowered if CANONICAL_KEYS.contains(&lowered) => {}
            _ => {
                if let Some(extra) = extra_value(value) {
                    track.extras.insert(column.to_string(), extra);
                }
            }
        }
    }

    if !seen_id {
        return Err(RowError::MissingColumn("id"));
    }
    if !seen_name {
        return Err(RowError::MissingColumn("name"));
    }
    track.id = id.ok_or(RowError::NullValue("id"))?;
    track.name = name.ok_or(RowError::NullValue("name"))?;
    track.kind = TrackType::from_stored(stored_type.as_deref());
    Ok(track)
}

fn integer_value(column: &str, value: ValueRef<'_>) -> Result<Option<i64>, RowError> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(number) => Ok(Some(number)),
        other => Err(RowError::InvalidValue {
            column: column.to_string(),
            message: format!("expected integer, got {}", other.data_type()),
        }),
    }
}

fn text_value(column: &str, value: ValueRef<'_>) -> Result<Option<String>, RowError> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Some(text.to_string()))
            .map_err(|err| RowError::InvalidValue {
                column: column.to_string(),
                message: err.to_string(),
            }),
        // Timestamps may be stored as epoch numbers in some deployments.
        ValueRef::Integer(number) => Ok(Some(number.to_string())),
        ValueRef::Real(number) => Ok(Some(number.to_string())),
        ValueRef::Blob(_) => Err(RowError::InvalidValue {
            column: column.to_string(),
            message: "expected text, got blob".to_string(),
        }),
    }
}

fn extra_value(value: ValueRef<'_>) -> Option<FieldValue> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(number) => Some(FieldValue::Integer(number)),
        ValueRef::Real(number) => Some(FieldValue::Real(number)),
        ValueRef::Text(bytes) => Some(FieldValue::Text(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
        ValueRef::Blob(bytes) => Some(FieldValue::Blob(bytes.to_vec())),
    }
}
