//! Console formatting for query results.
//!
//! # Invariants
//! - Formatting never filters, reorders or rewrites records.
//! - A missing result and an empty result render identically.

use crate::model::track::Track;
use std::io::Write;

/// Line emitted for an absent or empty result.
pub const NO_RESULTS_LINE: &str = "No results found.";
const MISSING_ARTIST: &str = "N/A";

/// Formats one record as `#<i>: <name> - Artist: <artist> - Type: <type>`,
/// with ` - YT: <id>` and ` - Tags: [<tags>]` appended when present.
pub fn format_track_line(index: usize, track: &Track) -> String {
    let mut line = format!(
        "#{index}: {} - Artist: {} - Type: {}",
        track.name,
        track.artist_name.as_deref().unwrap_or(MISSING_ARTIST),
        track.kind
    );
    if let Some(youtube_id) = &track.youtube_id {
        line.push_str(&format!(" - YT: {youtube_id}"));
    }
    if let Some(raw_tags) = &track.raw_tags {
        line.push_str(&format!(" - Tags: [{raw_tags}]"));
    }
    line
}

/// Formats a result set as display lines, numbered from 1.
pub fn format_tracks(tracks: Option<&[Track]>) -> Vec<String> {
    match tracks {
        Some(tracks) if !tracks.is_empty() => tracks
            .iter()
            .enumerate()
            .map(|(offset, track)| format_track_line(offset + 1, track))
            .collect(),
        _ => vec![NO_RESULTS_LINE.to_string()],
    }
}

/// Writes [`format_tracks`] output, one line each.
pub fn print_tracks(out: &mut impl Write, tracks: Option<&[Track]>) -> std::io::Result<()> {
    for line in format_tracks(tracks) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Pretty JSON array of records.
pub fn tracks_to_json(tracks: &[Track]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tracks)
}
