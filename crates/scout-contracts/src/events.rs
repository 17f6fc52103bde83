use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Every line in a Scout event log carries one of these in its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SessionStarted,
    SessionFinished,
    ModeChanged,
    QueryStarted,
    QuerySucceeded,
    QueryFailed,
    ImageSearchItemDropped,
    ImagesSaved,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::SessionStarted => "session_started",
            EventKind::SessionFinished => "session_finished",
            EventKind::ModeChanged => "mode_changed",
            EventKind::QueryStarted => "query_started",
            EventKind::QuerySucceeded => "query_succeeded",
            EventKind::QueryFailed => "query_failed",
            EventKind::ImageSearchItemDropped => "image_search_item_dropped",
            EventKind::ImagesSaved => "images_saved",
        }
    }
}

/// Append-only JSONL log for one chat or one-shot session.
///
/// Each line is a compact object with `type`, `session_id` and `ts`
/// followed by the event fields. The reserved keys cannot be overwritten
/// by fields.
#[derive(Debug, Clone)]
pub struct EventWriter {
    path: PathBuf,
    session_id: String,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            session_id: session_id.into(),
        }
    }

    pub fn for_new_session(path: impl Into<PathBuf>) -> Self {
        Self::new(path, uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Appends one event. `fields` must be a JSON object.
    pub fn emit(&self, kind: EventKind, fields: Value) -> Result<Value> {
        let Value::Object(fields) = fields else {
            bail!("{} event fields must be a JSON object", kind.as_str());
        };
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        event.insert(
            "session_id".to_string(),
            Value::String(self.session_id.clone()),
        );
        event.insert(
            "ts".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        for (key, value) in fields {
            event.entry(key).or_insert(value);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open event log {}", self.path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(Value::Object(event))
    }

    /// Like [`EventWriter::emit`], but a failed write only warns on stderr.
    pub fn record(&self, kind: EventKind, fields: Value) {
        if let Err(err) = self.emit(kind, fields) {
            eprintln!("scout warning: event log write failed: {err:#}");
        }
    }
}
