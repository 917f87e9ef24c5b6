use musicshelf_core::{
    find_track_by_name, format_tracks, get_all_tracks, get_track_by_id, get_tracks_by_artist,
    get_tracks_by_tag, get_tracks_by_type, list_tracks, query_tracks, FieldValue, QueryError,
    TrackListQuery, TrackType,
};
use rusqlite::types::Value;
use rusqlite::Connection;

fn seeded_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(include_str!("fixtures/schema.sql"))
        .unwrap();
    conn.execute_batch(include_str!("fixtures/seed.sql")).unwrap();
    conn
}

fn ids(tracks: &[musicshelf_core::Track]) -> Vec<i64> {
    tracks.iter().map(|track| track.id).collect()
}

#[test]
fn all_tracks_respects_limit_in_storage_order() {
    let conn = seeded_conn();

    let tracks = get_all_tracks(&conn, Some(2)).unwrap();
    assert_eq!(ids(&tracks), vec![1, 2]);

    let everything = get_all_tracks(&conn, None).unwrap();
    assert_eq!(everything.len(), 10);
}

#[test]
fn artist_filter_matches_exactly() {
    let conn = seeded_conn();

    let tracks = get_tracks_by_artist(&conn, "Flying Raccoon Suit", None).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "Moonflower");
    assert_eq!(tracks[0].kind, TrackType::Album);

    let partial = get_tracks_by_artist(&conn, "Flying Raccoon", None).unwrap();
    assert!(partial.is_empty());
}

#[test]
fn type_filter_uses_storage_uppercase() {
    let conn = seeded_conn();

    let playlists = get_tracks_by_type(&conn, TrackType::Playlist, None).unwrap();
    assert_eq!(ids(&playlists), vec![6, 7, 8]);
    assert!(playlists
        .iter()
        .all(|track| track.kind == TrackType::Playlist));
    assert!(playlists.iter().all(|track| track.artist_name.is_none()));

    let one_song = get_tracks_by_type(&conn, TrackType::Song, Some(1)).unwrap();
    assert_eq!(ids(&one_song), vec![1]);

    let unknown = get_tracks_by_type(&conn, TrackType::Unknown, None).unwrap();
    assert!(unknown.is_empty());
}

#[test]
fn tag_filter_matches_substring_anywhere() {
    let conn = seeded_conn();

    let tracks = get_tracks_by_tag(&conn, "chill", None).unwrap();
    assert_eq!(ids(&tracks), vec![2, 5, 6, 8]);
    assert!(tracks
        .iter()
        .all(|track| track.raw_tags.as_deref().unwrap().contains("chill")));
}

#[test]
fn name_filter_uses_ascii_case_folding() {
    let conn = seeded_conn();

    let moon = find_track_by_name(&conn, "moon", None).unwrap();
    assert_eq!(ids(&moon), vec![4, 10]);

    let folded = find_track_by_name(&conn, "für elise", None).unwrap();
    assert_eq!(ids(&folded), vec![2]);

    let non_ascii_upper = find_track_by_name(&conn, "FÜR", None).unwrap();
    assert!(non_ascii_upper.is_empty());
}

#[test]
fn unmatched_filter_returns_empty_not_error() {
    let conn = seeded_conn();

    let tracks = find_track_by_name(&conn, "nonexistent-xyz", None).unwrap();
    assert!(tracks.is_empty());
}

#[test]
fn raw_sql_with_and_without_params() {
    let conn = seeded_conn();

    let tracks = query_tracks(
        &conn,
        "SELECT * FROM music_content WHERE id IN (?, ?) ORDER BY id DESC",
        &[Value::Integer(3), Value::Integer(9)],
    )
    .unwrap();
    assert_eq!(ids(&tracks), vec![9, 3]);
    assert_eq!(tracks[0].kind, TrackType::Artist);

    let projected = query_tracks(&conn, "SELECT id, name FROM music_content LIMIT 1", &[])
        .unwrap();
    assert_eq!(projected[0].kind, TrackType::Unknown);
    assert_eq!(projected[0].youtube_id, None);
}

#[test]
fn malformed_sql_is_a_query_error() {
    let conn = seeded_conn();

    let err = query_tracks(&conn, "SELEC * FROM music_content", &[]).unwrap_err();
    assert!(matches!(err, QueryError::Sqlite(_)));

    let err = query_tracks(&conn, "SELECT * FROM no_such_table", &[]).unwrap_err();
    assert!(err.to_string().contains("no_such_table"));
}

#[test]
fn wrong_parameter_count_is_a_query_error() {
    let conn = seeded_conn();

    let err = query_tracks(
        &conn,
        "SELECT * FROM music_content WHERE id = ?",
        &[Value::Integer(1), Value::Integer(2)],
    )
    .unwrap_err();
    assert!(matches!(err, QueryError::Sqlite(_)));
}

#[test]
fn unmappable_row_fails_the_whole_query() {
    let conn = seeded_conn();

    let err = query_tracks(&conn, "SELECT name FROM music_content", &[]).unwrap_err();
    assert!(matches!(err, QueryError::Row(_)));
}

#[test]
fn extended_columns_pass_through() {
    let conn = seeded_conn();
    conn.execute_batch(
        "ALTER TABLE music_content ADD COLUMN duration_ms INTEGER;
         ALTER TABLE music_content ADD COLUMN thumbnail_url TEXT;
         UPDATE music_content SET duration_ms = 213000, thumbnail_url = 'https://i.ytimg.com/x.jpg' WHERE id = 1;",
    )
    .unwrap();

    let first = get_track_by_id(&conn, 1).unwrap().unwrap();
    assert_eq!(
        first.extras.get("duration_ms"),
        Some(&FieldValue::Integer(213000))
    );
    assert_eq!(
        first.extras.get("thumbnail_url"),
        Some(&FieldValue::Text("https://i.ytimg.com/x.jpg".to_string()))
    );

    let second = get_track_by_id(&conn, 2).unwrap().unwrap();
    assert!(second.extras.is_empty());
}

#[test]
fn get_track_by_id_returns_none_for_missing_row() {
    let conn = seeded_conn();

    let track = get_track_by_id(&conn, 4).unwrap().unwrap();
    assert_eq!(track.name, "Moonflower");
    assert_eq!(track.created_at.as_deref(), Some("2024-01-04 10:00:00"));
    assert!(track.updated_at.is_some());

    assert!(get_track_by_id(&conn, 999).unwrap().is_none());
}

#[test]
fn list_tracks_supports_recent_and_untagged() {
    let conn = seeded_conn();

    let default_list = list_tracks(&conn, &TrackListQuery::default()).unwrap();
    assert_eq!(default_list.len(), 10);

    let recent = list_tracks(
        &conn,
        &TrackListQuery {
            limit: 3,
            recent: true,
            untagged: false,
        },
    )
    .unwrap();
    assert_eq!(ids(&recent), vec![10, 9, 8]);

    let untagged = list_tracks(
        &conn,
        &TrackListQuery {
            untagged: true,
            ..TrackListQuery::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&untagged), vec![7, 9]);
}

#[test]
fn mapped_fixture_row_formats_with_name_and_artist() {
    let conn = seeded_conn();

    let tracks = get_tracks_by_artist(&conn, "Rick Astley", None).unwrap();
    let lines = format_tracks(Some(tracks.as_slice()));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Never Gonna Give You Up"));
    assert!(lines[0].contains("Rick Astley"));
    assert_eq!(
        lines[0],
        "#1: Never Gonna Give You Up - Artist: Rick Astley - Type: song - YT: dQw4w9WgXcQ - Tags: [pop 80s]"
    );
}
