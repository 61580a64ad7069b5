//! Conversation transcript loading.
//!
//! Transcripts are JSONL files laid out as `<projects>/<project>/<session>.jsonl`,
//! with subagent transcripts under `<projects>/<project>/<session>/subagents/`.
//! Every `user` or `assistant` line carrying a valid timestamp becomes one
//! [`Event`]; everything else is skipped. Subagent records without their own
//! `sessionId` are attributed to the parent session.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::event::Event;
use crate::types::{SessionId, parse_timestamp};

/// Buffer size for `BufReader` (64KB for large transcripts)
const BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Minimal struct for typed deserialization (faster than `serde_json::Value`)
#[derive(Debug, Deserialize)]
struct RecordHeader {
    #[serde(rename = "type")]
    record_type: Option<String>,
    timestamp: Option<String>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Check if a line might be a message record (pre-filter before JSON parse)
fn might_be_message(line: &str) -> bool {
    line.contains("\"timestamp\"") && (line.contains("\"user\"") || line.contains("\"assistant\""))
}

/// Turn one JSONL line into an event, if it is a timestamped message.
fn parse_line(line: &str, fallback_session: Option<&SessionId>) -> Option<Event> {
    if !might_be_message(line) {
        return None;
    }

    let header: RecordHeader = match serde_json::from_str(line) {
        Ok(h) => h,
        Err(e) => {
            tracing::trace!(error = %e, "skipping malformed JSON line");
            return None;
        }
    };

    if !matches!(header.record_type.as_deref(), Some("user" | "assistant")) {
        return None;
    }

    let raw = header.timestamp?;
    let timestamp = match parse_timestamp(&raw) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::trace!(error = %e, "skipping record with invalid timestamp");
            return None;
        }
    };

    let session_id = header
        .session_id
        .and_then(|id| SessionId::new(id).ok())
        .or_else(|| fallback_session.cloned());

    Some(Event::new(timestamp, session_id))
}

/// Parse a transcript JSONL file.
///
/// Records without a session ID are attributed to `fallback_session`.
pub fn parse_transcript_file(
    path: &Path,
    fallback_session: Option<&SessionId>,
) -> Result<Vec<Event>, TranscriptError> {
    let file = File::open(path).map_err(|source| TranscriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut events = Vec::new();
    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line,
            Err(e) => {
                tracing::trace!(error = %e, "skipping non-UTF-8 line");
                continue;
            }
        };
        if let Some(event) = parse_line(line, fallback_session) {
            events.push(event);
        }
    }

    Ok(events)
}

#[derive(Debug)]
struct TranscriptFile {
    path: PathBuf,
    session_id: Option<SessionId>,
}

impl TranscriptFile {
    /// A top-level session transcript, named after its session.
    fn session(path: PathBuf) -> Self {
        let session_id = path
            .file_stem()
            .and_then(|n| n.to_str())
            .and_then(|stem| SessionId::new(stem).ok());
        Self { path, session_id }
    }

    /// A subagent transcript, attributed to its parent session.
    fn subagent(path: PathBuf, parent_session_id: Option<&SessionId>) -> Self {
        Self {
            path,
            session_id: parent_session_id.cloned(),
        }
    }
}

fn is_jsonl(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|e| e == "jsonl")
}

/// Find transcript files under a projects directory.
///
/// Only an unreadable root is an error; unreadable project or session
/// entries are logged and skipped.
fn discover(projects_dir: &Path) -> Result<Vec<TranscriptFile>, TranscriptError> {
    let mut files = Vec::new();

    for project_entry in std::fs::read_dir(projects_dir)? {
        let project_path = match project_entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(path = ?projects_dir, error = %e, "skipping unreadable project entry");
                continue;
            }
        };
        if !project_path.is_dir() {
            continue;
        }

        let session_entries = match std::fs::read_dir(&project_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = ?project_path, error = %e, "skipping unreadable project directory");
                continue;
            }
        };

        for session_entry in session_entries {
            let session_path = match session_entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(path = ?project_path, error = %e, "skipping unreadable session entry");
                    continue;
                }
            };

            if is_jsonl(&session_path) {
                files.push(TranscriptFile::session(session_path));
                continue;
            }

            let subagents_dir = session_path.join("subagents");
            if !subagents_dir.is_dir() {
                continue;
            }
            let parent_session_id = session_path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| SessionId::new(name).ok());
            match std::fs::read_dir(&subagents_dir) {
                Ok(entries) => files.extend(
                    entries
                        .flatten()
                        .map(|e| e.path())
                        .filter(|p| is_jsonl(p))
                        .map(|p| TranscriptFile::subagent(p, parent_session_id.as_ref())),
                ),
                Err(e) => {
                    tracing::warn!(path = ?subagents_dir, error = %e, "skipping unreadable subagents directory");
                }
            }
        }
    }

    Ok(files)
}

/// Scan a projects directory and load every transcript event.
///
/// A missing directory yields no events. Files are parsed in parallel;
/// unreadable files are logged and skipped.
pub fn scan_transcripts(projects_dir: &Path) -> Result<Vec<Event>, TranscriptError> {
    if !projects_dir.exists() {
        tracing::debug!(path = ?projects_dir, "projects directory does not exist");
        return Ok(Vec::new());
    }

    let files = discover(projects_dir)?;
    tracing::debug!(count = files.len(), "discovered transcript files");

    let events: Vec<Event> = files
        .par_iter()
        .filter_map(
            |tf| match parse_transcript_file(&tf.path, tf.session_id.as_ref()) {
                Ok(events) => Some(events),
                Err(e) => {
                    tracing::warn!(path = ?tf.path, error = %e, "skipping unreadable transcript");
                    None
                }
            },
        )
        .flatten()
        .collect();

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_lines(path: &Path, lines: &[&str]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
    }

    #[test]
    fn test_parse_keeps_user_and_assistant_messages() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type":"user","sessionId":"abc","timestamp":"2025-01-15T09:00:00.000Z","message":{{"role":"user","content":"hello"}}}}"#).unwrap();
        writeln!(file, r#"{{"type":"assistant","sessionId":"abc","timestamp":"2025-01-15T09:00:05.000Z","message":{{"role":"assistant","content":"hi"}}}}"#).unwrap();
        writeln!(file, r#"{{"type":"summary","summary":"Greeting","leafUuid":"x"}}"#).unwrap();
        writeln!(file, r#"{{"type":"system","timestamp":"2025-01-15T09:00:06.000Z","sessionId":"abc"}}"#).unwrap();

        let events = parse_transcript_file(file.path(), None).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].session_id.as_ref().unwrap().as_str(), "abc");
        assert_eq!(events[1].timestamp.to_rfc3339(), "2025-01-15T09:00:05+00:00");
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"2025-01-15T09:00:00Z""#).unwrap();
        writeln!(file, "not json at all").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"not a time","sessionId":"abc"}}"#).unwrap();
        writeln!(file, r#"{{"type":"user","sessionId":"abc"}}"#).unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"2025-01-15T09:01:00Z","sessionId":"abc"}}"#).unwrap();

        let events = parse_transcript_file(file.path(), None).unwrap();

        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_parse_assigns_fallback_session() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"2025-01-15T09:00:00Z"}}"#).unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"2025-01-15T09:01:00Z","sessionId":""}}"#).unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"2025-01-15T09:02:00Z","sessionId":"own"}}"#).unwrap();

        let fallback = SessionId::new("from-file").unwrap();
        let events = parse_transcript_file(file.path(), Some(&fallback)).unwrap();

        let sessions: Vec<&str> = events
            .iter()
            .map(|e| e.session_id.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(sessions, vec!["from-file", "from-file", "own"]);
    }

    #[test]
    fn test_parse_without_fallback_leaves_session_empty() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type":"assistant","timestamp":"2025-01-15T09:00:00Z"}}"#).unwrap();

        let events = parse_transcript_file(file.path(), None).unwrap();

        assert_eq!(events.len(), 1);
        assert!(events[0].session_id.is_none());
    }

    #[test]
    fn test_parse_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        let result = parse_transcript_file(&temp.path().join("gone.jsonl"), None);
        assert!(matches!(result, Err(TranscriptError::Read { .. })));
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let events = scan_transcripts(&temp.path().join("nope")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_scan_finds_sessions_and_subagents() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("-home-user-project");

        write_lines(
            &project.join("main-session.jsonl"),
            &[
                r#"{"type":"user","timestamp":"2025-01-15T09:00:00Z","sessionId":"main-session"}"#,
                r#"{"type":"assistant","timestamp":"2025-01-15T09:00:30Z","sessionId":"main-session"}"#,
            ],
        );
        write_lines(
            &project.join("main-session/subagents/agent-a1.jsonl"),
            &[r#"{"type":"assistant","timestamp":"2025-01-15T09:01:00Z"}"#],
        );
        write_lines(
            &project.join("notes.txt"),
            &[r#"{"type":"user","timestamp":"2025-01-15T09:02:00Z"}"#],
        );
        // Loose files at the root are not project directories.
        write_lines(
            &temp.path().join("stray.jsonl"),
            &[r#"{"type":"user","timestamp":"2025-01-15T09:03:00Z"}"#],
        );

        let mut events = scan_transcripts(temp.path()).unwrap();
        events.sort_by_key(|e| e.timestamp);

        let sessions: Vec<&str> = events
            .iter()
            .map(|e| e.session_id.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(sessions, vec!["main-session", "main-session", "main-session"]);
    }

    #[test]
    fn test_subagent_falls_back_to_parent_session() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("-home-user-project");

        write_lines(
            &project.join("parent/subagents/agent-b2.jsonl"),
            &[
                r#"{"type":"assistant","timestamp":"2025-01-15T09:01:00Z","sessionId":"explicit"}"#,
                r#"{"type":"assistant","timestamp":"2025-01-15T09:02:00Z"}"#,
            ],
        );

        let mut events = scan_transcripts(temp.path()).unwrap();
        events.sort_by_key(|e| e.timestamp);

        let sessions: Vec<&str> = events
            .iter()
            .map(|e| e.session_id.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(sessions, vec!["explicit", "parent"]);
    }

    #[test]
    fn test_parse_skips_invalid_utf8_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"2025-01-15T09:00:00Z","sessionId":"abc"}}"#).unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        writeln!(file, r#"{{"type":"user","timestamp":"2025-01-15T09:01:00Z","sessionId":"abc"}}"#).unwrap();

        let events = parse_transcript_file(file.path(), None).unwrap();

        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_handles_crlf_and_missing_trailing_newline() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"type\":\"user\",\"timestamp\":\"2025-01-15T09:00:00Z\"}\r\n")
            .unwrap();
        file.write_all(b"{\"type\":\"assistant\",\"timestamp\":\"2025-01-15T09:01:00Z\"}")
            .unwrap();

        let events = parse_transcript_file(file.path(), None).unwrap();

        assert_eq!(events.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_unreadable_project() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        write_lines(
            &temp.path().join("-home-user-open/s1.jsonl"),
            &[r#"{"type":"user","timestamp":"2025-01-15T09:00:00Z","sessionId":"s1"}"#],
        );
        let locked = temp.path().join("-home-user-locked");
        write_lines(
            &locked.join("s2.jsonl"),
            &[r#"{"type":"user","timestamp":"2025-01-15T09:05:00Z","sessionId":"s2"}"#],
        );
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let result = scan_transcripts(temp.path());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Privileged users can still read the locked project.
        let events = result.unwrap();
        assert!(events.iter().any(|e| e.session_id.as_ref().unwrap().as_str() == "s1"));
    }
}
