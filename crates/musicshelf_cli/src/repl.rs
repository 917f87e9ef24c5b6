//! Line-oriented catalog shell.
//!
//! # Responsibility
//! - Parse one command per input line.
//! - Run it against the session and print results or error messages.
//!
//! # Invariants
//! - No command failure ends the loop; only `quit`/`exit` or end of input do.
//! - Output goes to the injected writer so the loop is testable.

use log::{info, warn};
use musicshelf_core::{
    logging_status, print_tracks, tracks_to_json, Session, SessionError, Track, TrackListQuery, TrackType,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "musicshelf> ";

pub const HELP: &str = "\
commands:
  connect [path]                      open a catalog database
  sql <statement>                     run raw SQL and print the rows
  all [n]                             every entry
  artist <name> [n]                   entries by exact artist name
  type <song|album|playlist|artist> [n]
  tag <text> [n]                      raw tags containing text
  name <text> [n]                     names containing text
  id <n>                              one entry by id
  list [--limit n] [--recent] [--untagged]
  url <id>                            YouTube Music link for an entry
  json on|off                         toggle JSON output
  limit <n>|off                       default row limit for lookups
  status                              connection and logging state
  help
trailing [n] may also be written `--limit n`
  quit | exit";

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect(Option<PathBuf>),
    Sql(String),
    All(Option<u32>),
    Artist { name: String, limit: Option<u32> },
    Type { kind: TrackType, limit: Option<u32> },
    Tag { text: String, limit: Option<u32> },
    Name { text: String, limit: Option<u32> },
    Id(i64),
    List(TrackListQuery),
    Url(i64),
    Json(bool),
    /// `None` clears the session default.
    Limit(Option<u32>),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    /// Command is known but its arguments are malformed.
    Usage(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommand(name) => {
                write!(f, "unknown command `{name}`; type `help` for commands")
            }
            Self::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

impl Error for ParseError {}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "connect" => Command::Connect((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "sql" | "query" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("sql <statement>"));
            }
            Command::Sql(rest.to_string())
        }
        "all" => Command::All(optional_number(rest).ok_or(ParseError::Usage("all [n]"))?),
        "artist" => {
            let (name, limit) =
                text_with_limit(rest).ok_or(ParseError::Usage("artist <name> [n]"))?;
            Command::Artist { name, limit }
        }
        "type" => {
            const USAGE: &str = "type <song|album|playlist|artist> [n]";
            let (kind, limit) = match rest.split_once(char::is_whitespace) {
                Some((kind, limit)) => (kind, limit.trim()),
                None => (rest, ""),
            };
            let kind = TrackType::parse(kind)
                .filter(|kind| *kind != TrackType::Unknown)
                .ok_or(ParseError::Usage(USAGE))?;
            let limit = optional_number(limit).ok_or(ParseError::Usage(USAGE))?;
            Command::Type { kind, limit }
        }
        "tag" => {
            let (text, limit) =
                text_with_limit(rest).ok_or(ParseError::Usage("tag <text> [n]"))?;
            Command::Tag { text, limit }
        }
        "name" | "find" => {
            let (text, limit) =
                text_with_limit(rest).ok_or(ParseError::Usage("name <text> [n]"))?;
            Command::Name { text, limit }
        }
        "id" => Command::Id(rest.parse().map_err(|_| ParseError::Usage("id <n>"))?),
        "list" => Command::List(
            list_query(rest)
                .ok_or(ParseError::Usage("list [--limit n] [--recent] [--untagged]"))?,
        ),
        "url" | "play" => Command::Url(rest.parse().map_err(|_| ParseError::Usage("url <id>"))?),
        "json" => match rest {
            "on" => Command::Json(true),
            "off" => Command::Json(false),
            _ => return Err(ParseError::Usage("json on|off")),
        },
        "limit" => match rest {
            "off" => Command::Limit(None),
            _ => Command::Limit(Some(
                rest.parse().map_err(|_| ParseError::Usage("limit <n>|off"))?,
            )),
        },
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

fn optional_number(text: &str) -> Option<Option<u32>> {
    if text.is_empty() {
        return Some(None);
    }
    text.parse().ok().map(Some)
}

/// Splits `<text> [n]` or `<text> --limit n`; text must be non-empty.
///
/// Only whole trailing tokens count as a limit, so a search text ending in a
/// bare integer is read as text plus limit. Inner whitespace collapses to
/// single spaces.
fn text_with_limit(rest: &str) -> Option<(String, Option<u32>)> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let (text, limit) = match tokens.as_slice() {
        [text @ .., "--limit", limit] => (text, Some(limit.parse().ok()?)),
        [text @ .., last] if !text.is_empty() => match last.parse::<u32>() {
            Ok(limit) => (text, Some(limit)),
            Err(_) => (tokens.as_slice(), None),
        },
        all => (all, None),
    };
    if text.is_empty() {
        return None;
    }
    Some((text.join(" "), limit))
}

fn list_query(rest: &str) -> Option<TrackListQuery> {
    let mut query = TrackListQuery::default();
    let mut tokens = rest.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "--limit" => query.limit = tokens.next()?.parse().ok()?,
            "--recent" => query.recent = true,
            "--untagged" => query.untagged = true,
            _ => return None,
        }
    }
    Some(query)
}

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive shell bound to one session and one output.
pub struct Repl<W: Write> {
    session: Session,
    out: W,
    json: bool,
}

impl<W: Write> Repl<W> {
    pub fn new(session: Session, out: W) -> Self {
        Self {
            session,
            out,
            json: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }

    /// Reads commands until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> std::io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(self.out)?;
                return Ok(());
            };
            if self.handle_line(&line?)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Parses and executes one line, printing parse errors.
    pub fn handle_line(&mut self, line: &str) -> std::io::Result<Flow> {
        match parse_command(line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => Ok(Flow::Continue),
            Err(err) => {
                writeln!(self.out, "{err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Opens `path` (or the default path) and reports the outcome.
    pub fn connect(&mut self, path: Option<PathBuf>) -> std::io::Result<()> {
        match self.session.connect(path.as_deref()) {
            Ok(()) => {
                let shown = self
                    .session
                    .db_path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                writeln!(self.out, "Connected to database: {shown}")
            }
            Err(err) => writeln!(self.out, "Failed to connect to database: {err}"),
        }
    }

    pub fn execute(&mut self, command: Command) -> std::io::Result<Flow> {
        let outcome = match command {
            Command::Connect(path) => {
                self.connect(path)?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            Command::Quit => {
                info!("event=repl_quit module=cli status=ok");
                return Ok(Flow::Quit);
            }
            Command::Json(enabled) => {
                self.json = enabled;
                writeln!(
                    self.out,
                    "JSON output {}",
                    if enabled { "enabled" } else { "disabled" }
                )?;
                return Ok(Flow::Continue);
            }
            Command::Url(id) => {
                self.print_url(id)?;
                return Ok(Flow::Continue);
            }
            Command::Limit(limit) => {
                self.session.set_default_limit(limit);
                match limit {
                    Some(limit) => writeln!(self.out, "Default limit set to {limit}")?,
                    None => writeln!(self.out, "Default limit cleared")?,
                }
                return Ok(Flow::Continue);
            }
            Command::Status => {
                self.print_status()?;
                return Ok(Flow::Continue);
            }
            Command::Sql(sql) => self.session.query(&sql, &[]),
            Command::All(limit) => self.session.all(limit),
            Command::Artist { name, limit } => self.session.by_artist(&name, limit),
            Command::Type { kind, limit } => self.session.by_type(kind, limit),
            Command::Tag { text, limit } => self.session.by_tag(&text, limit),
            Command::Name { text, limit } => self.session.by_name(&text, limit),
            Command::Id(id) => self.session.by_id(id).map(|track| track.into_iter().collect()),
            Command::List(query) => self.session.list(&query),
        };

        match outcome {
            Ok(tracks) => self.print_result(&tracks)?,
            Err(err) => self.print_error(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn print_result(&mut self, tracks: &[Track]) -> std::io::Result<()> {
        if !self.json {
            return print_tracks(&mut self.out, Some(tracks));
        }
        match tracks_to_json(tracks) {
            Ok(json) => writeln!(self.out, "{json}"),
            Err(err) => writeln!(self.out, "Error encoding results: {err}"),
        }
    }

    fn print_error(&mut self, err: &SessionError) -> std::io::Result<()> {
        warn!("event=repl_command module=cli status=error");
        match err {
            SessionError::NotConnected => writeln!(self.out, "{err}"),
            _ => writeln!(self.out, "Error executing query: {err}"),
        }
    }

    fn print_status(&mut self) -> std::io::Result<()> {
        match self.session.db_path() {
            Some(path) => writeln!(self.out, "Database: {}", path.display())?,
            None if self.session.is_connected() => writeln!(self.out, "Database: connected")?,
            None => writeln!(self.out, "Database: not connected")?,
        }
        match self.session.default_limit() {
            Some(limit) => writeln!(self.out, "Default limit: {limit}")?,
            None => writeln!(self.out, "Default limit: none")?,
        }
        match logging_status() {
            Some((level, dir)) => {
                writeln!(self.out, "Logging: level={level} dir={}", dir.display())
            }
            None => writeln!(self.out, "Logging: disabled"),
        }
    }

    fn print_url(&mut self, id: i64) -> std::io::Result<()> {
        match self.session.by_id(id) {
            Ok(Some(track)) => match track.youtube_music_url() {
                Some(url) => writeln!(self.out, "{url}"),
                None => writeln!(self.out, "Entry {id} has no YouTube Music link"),
            },
            Ok(None) => writeln!(self.out, "No entry found with id {id}"),
            Err(err) => self.print_error(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, text_with_limit, Command, Flow, ParseError, Repl};
    use musicshelf_core::{Session, TrackListQuery, TrackType};
    use rusqlite::Connection;
    use std::path::PathBuf;

    const FIXTURE: &str = "
        CREATE TABLE music_content (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            youtube_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            artist_name TEXT,
            description TEXT,
            raw_tags TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );
        INSERT INTO music_content (type, youtube_id, name, artist_name, raw_tags) VALUES
            ('ALBUM', 'OLAK5uy_moonflower', 'Moonflower', 'Flying Raccoon Suit', NULL),
            ('PLAYLIST', 'PL_lofi', 'Lofi Beats', NULL, 'chill study'),
            ('SONG', 'dQw4w9WgXcQ', 'Never Gonna Give You Up', 'Rick Astley', 'pop'),
            ('PLAYLIST', 'PL_rain', 'Rainy Day', NULL, 'chill ambient'),
            ('SONG', 'yt_drift', 'Drift', 'Tycho', 'chill electronic');
    ";

    fn repl() -> Repl<Vec<u8>> {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(FIXTURE).unwrap();
        Repl::new(Session::with_connection(conn), Vec::new())
    }

    fn output(repl: Repl<Vec<u8>>) -> String {
        String::from_utf8(repl.into_output()).unwrap()
    }

    #[test]
    fn parses_filters_with_limits() {
        assert_eq!(
            parse_command("artist Flying Raccoon Suit --limit 3"),
            Ok(Some(Command::Artist {
                name: "Flying Raccoon Suit".to_string(),
                limit: Some(3),
            }))
        );
        assert_eq!(
            parse_command("TYPE playlist 2"),
            Ok(Some(Command::Type {
                kind: TrackType::Playlist,
                limit: Some(2),
            }))
        );
        assert_eq!(parse_command("all"), Ok(Some(Command::All(None))));
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("connect /tmp/music.db"),
            Ok(Some(Command::Connect(Some(PathBuf::from("/tmp/music.db")))))
        );
    }

    #[test]
    fn trailing_number_limits_text_lookups() {
        assert_eq!(
            parse_command("tag chill 2"),
            Ok(Some(Command::Tag {
                text: "chill".to_string(),
                limit: Some(2),
            }))
        );
        assert_eq!(
            parse_command("name moon 1"),
            Ok(Some(Command::Name {
                text: "moon".to_string(),
                limit: Some(1),
            }))
        );
        assert_eq!(
            parse_command("artist Flying Raccoon Suit 3"),
            Ok(Some(Command::Artist {
                name: "Flying Raccoon Suit".to_string(),
                limit: Some(3),
            }))
        );
        // A lone number is the search text itself.
        assert_eq!(text_with_limit("2"), Some(("2".to_string(), None)));
        assert!(matches!(parse_command("tag --limit 2"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_command("tag chill --limit x"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn limit_flag_only_matches_whole_tokens() {
        assert_eq!(
            parse_command("name Anti--limited"),
            Ok(Some(Command::Name {
                text: "Anti--limited".to_string(),
                limit: None,
            }))
        );
        assert_eq!(
            parse_command("tag --limited-edition --limit 4"),
            Ok(Some(Command::Tag {
                text: "--limited-edition".to_string(),
                limit: Some(4),
            }))
        );
    }

    #[test]
    fn parses_limit_and_status() {
        assert_eq!(parse_command("limit 5"), Ok(Some(Command::Limit(Some(5)))));
        assert_eq!(parse_command("limit off"), Ok(Some(Command::Limit(None))));
        assert!(matches!(parse_command("limit"), Err(ParseError::Usage(_))));
        assert_eq!(parse_command("status"), Ok(Some(Command::Status)));
    }

    #[test]
    fn parses_list_flags() {
        assert_eq!(
            parse_command("list --recent --limit 5"),
            Ok(Some(Command::List(TrackListQuery {
                limit: 5,
                recent: true,
                untagged: false,
            })))
        );
        assert!(matches!(
            parse_command("list --sideways"),
            Err(ParseError::Usage(_))
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_command("dance"),
            Err(ParseError::UnknownCommand(_))
        ));
        assert!(matches!(parse_command("type video"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_command("tag"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_command("all many"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_command("id x"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn filter_commands_print_numbered_lines() {
        let mut repl = repl();
        repl.handle_line("artist Flying Raccoon Suit").unwrap();
        repl.handle_line("name nonexistent-xyz").unwrap();

        let text = output(repl);
        assert!(text.contains("#1: Moonflower - Artist: Flying Raccoon Suit - Type: album - YT: OLAK5uy_moonflower"));
        assert!(text.contains("No results found."));
    }

    #[test]
    fn tag_with_trailing_number_caps_results() {
        let mut repl = repl();
        repl.handle_line("tag chill 2").unwrap();

        let text = output(repl);
        let lines = text.lines().filter(|line| line.starts_with('#')).count();
        assert_eq!(lines, 2);
    }

    #[test]
    fn default_limit_applies_until_cleared() {
        let mut repl = repl();
        repl.handle_line("limit 1").unwrap();
        repl.handle_line("tag chill").unwrap();
        assert_eq!(repl.session().default_limit(), Some(1));
        repl.handle_line("limit off").unwrap();
        repl.handle_line("tag chill").unwrap();

        let text = output(repl);
        assert!(text.contains("Default limit set to 1"));
        assert!(text.contains("Default limit cleared"));
        // One row before clearing, three after.
        assert_eq!(text.matches("#1:").count(), 2);
        assert_eq!(text.matches("#3:").count(), 1);
    }

    #[test]
    fn status_reports_connection_limit_and_logging() {
        let mut repl = repl();
        repl.handle_line("status").unwrap();

        let text = output(repl);
        assert!(text.contains("Database: connected"));
        assert!(text.contains("Default limit: none"));
        assert!(text.contains("Logging: "));

        let mut repl = Repl::new(Session::new(), Vec::new());
        repl.handle_line("status").unwrap();
        assert!(output(repl).contains("Database: not connected"));
    }

    #[test]
    fn query_errors_keep_the_shell_alive() {
        let mut repl = repl();
        assert_eq!(
            repl.handle_line("sql SELECT * FROM nowhere").unwrap(),
            Flow::Continue
        );
        assert_eq!(repl.handle_line("tag chill").unwrap(), Flow::Continue);

        let text = output(repl);
        assert!(text.contains("Error executing query:"));
        assert!(text.contains("Lofi Beats"));
    }

    #[test]
    fn url_and_json_commands() {
        let mut repl = repl();
        repl.handle_line("url 3").unwrap();
        repl.handle_line("url 42").unwrap();
        repl.handle_line("json on").unwrap();
        repl.handle_line("id 1").unwrap();

        let text = output(repl);
        assert!(text.contains("https://music.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(text.contains("No entry found with id 42"));
        assert!(text.contains("\"artist-name\": \"Flying Raccoon Suit\""));
    }

    #[test]
    fn run_stops_at_quit() {
        let mut repl = repl();
        let input = "all 1\nquit\nall\n";
        repl.run(input.as_bytes()).unwrap();

        let text = output(repl);
        assert_eq!(text.matches("#1:").count(), 1);
        assert!(!text.contains("#2:"));
    }

    #[test]
    fn unconnected_session_reports_missing_connection() {
        let mut repl = Repl::new(Session::new(), Vec::new());
        repl.handle_line("all").unwrap();
        assert!(output(repl).contains("no database connection"));
    }
}
