//! JSONL file writer for phase events.
//!
//! Each [`PhaseEvent`] becomes one JSON line: the payload's fields plus
//! `type` and an RFC 3339 `timestamp`. The file is opened in append mode so
//! successive runs accumulate in one log.

use relay_application::ports::event_logger::{PhaseEvent, PhaseEventLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on `Drop`.
pub struct JsonlPhaseLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlPhaseLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened; callers fall back to
    /// running without an event log.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!("Could not open event log {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Payload fields first, then `type` and `timestamp`. A non-object payload
/// is kept under `data`.
fn record(event: PhaseEvent, timestamp: String) -> Value {
    let mut map = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("type".to_string(), Value::from(event.event_type));
    map.insert("timestamp".to_string(), Value::String(timestamp));
    Value::Object(map)
}

impl PhaseEventLogger for JsonlPhaseLogger {
    fn log(&self, event: PhaseEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let Ok(line) = serde_json::to_string(&record(event, timestamp)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlPhaseLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let logger = JsonlPhaseLogger::open(&path).unwrap();

        logger.log(PhaseEvent::new(
            "phase_started",
            json!({ "phase": "requirements", "steps": ["a", "b"] }),
        ));
        logger.log(PhaseEvent::new(
            "step_completed",
            json!({ "phase": "requirements", "step": "a", "confidence": 0.8 }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "phase_started");
        assert_eq!(lines[0]["steps"], json!(["a", "b"]));
        assert_eq!(lines[1]["type"], "step_completed");
        assert_eq!(lines[1]["confidence"], 0.8);

        let ts = lines[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        for run in 0..2 {
            let logger = JsonlPhaseLogger::open(&path).unwrap();
            logger.log(PhaseEvent::new("phase_finished", json!({ "run": run })));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["run"], 1);
    }

    #[test]
    fn test_non_object_payload_kept_under_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlPhaseLogger::open(&path).unwrap();

        logger.log(PhaseEvent::new("approval_recorded", json!(true)));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "approval_recorded");
        assert_eq!(lines[0]["data"], true);
    }

    #[test]
    fn test_directory_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlPhaseLogger::open(dir.path()).is_none());
    }
}
