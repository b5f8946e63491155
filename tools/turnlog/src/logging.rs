use crate::errors::TurnlogError;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

#[derive(Serialize)]
struct LogLine<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: LogEvent<'a>,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), TurnlogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| TurnlogError::Io(e.to_string()))?;
            }
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogLine {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event: LogEvent {
                level: event.level,
                event_type: event.event_type,
                payload: truncated,
            },
        })
        .map_err(|e| TurnlogError::Encode(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TurnlogError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| TurnlogError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| TurnlogError::Io(e.to_string()))
    }

    /// Best-effort append; a broken log never fails the caller.
    pub fn emit(&self, level: &str, event_type: &str, payload: Value) {
        let _ = self.append(&LogEvent {
            level,
            event_type,
            payload,
        });
    }
}

/// Emits through an optional logger.
pub fn emit(logger: Option<&JsonlLogger>, level: &str, event_type: &str, payload: Value) {
    if let Some(logger) = logger {
        logger.emit(level, event_type, payload);
    }
}

pub fn structured_fallback_line(event: &str, subject: &str, message: &str) -> String {
    format!(
        "event={event} subject={subject} message={} ",
        message.replace('\n', "\\n")
    )
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while cut > 0 && !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}
