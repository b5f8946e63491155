//! Save envelope: one JSON object per line, tagged by `section`.
//!
//! ```text
//! {"section":"header","tool_version":"0.1.0","saved_at":"...","format_version_id":...,"action_count":2}
//! {"section":"snapshot","ruleset_id":"18XX-basic","options":{...},"participants":["Alice","Bob"]}
//! {"section":"action","index":0,"action":{"kind":"correction_mode",...}}
//! {"section":"action","index":1,"action":{"kind":"cash_correction",...}}
//! ```

use crate::action::{Action, RETIRED_ACTION_KINDS};
use crate::errors::TurnlogError;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::iter::Enumerate;
use std::str::Lines;

/// Bump whenever an action variant gains, loses or renames a field.
pub const ACTION_SCHEMA_VERSION: u32 = 1;

const FORMAT_DOMAIN: &str = "turnlog/action-schema/v";

pub fn format_version_id() -> i64 {
    format_version_id_for(ACTION_SCHEMA_VERSION)
}

pub fn format_version_id_for(schema_version: u32) -> i64 {
    let digest = Sha256::digest(format!("{FORMAT_DOMAIN}{schema_version}").as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub tool_version: String,
    pub saved_at: String,
    pub format_version_id: i64,
    pub action_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub index: usize,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SaveEntry {
    Header(SaveHeader),
    Snapshot(Snapshot),
    Action(ActionEntry),
}

impl SaveEntry {
    fn section(&self) -> &'static str {
        match self {
            Self::Header(_) => "header",
            Self::Snapshot(_) => "snapshot",
            Self::Action(_) => "action",
        }
    }
}

/// A fully decoded save, for callers that want everything at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub header: SaveHeader,
    pub snapshot: Snapshot,
    pub actions: Vec<Action>,
}

pub fn encode(header: &SaveHeader, snapshot: &Snapshot, actions: &[Action]) -> Result<String, TurnlogError> {
    let mut out = String::new();
    push_line(&mut out, &SaveEntry::Header(header.clone()))?;
    push_line(&mut out, &SaveEntry::Snapshot(snapshot.clone()))?;
    for (index, action) in actions.iter().enumerate() {
        push_line(
            &mut out,
            &SaveEntry::Action(ActionEntry {
                index,
                action: action.clone(),
            }),
        )?;
    }
    Ok(out)
}

fn push_line(out: &mut String, entry: &SaveEntry) -> Result<(), TurnlogError> {
    let line = serde_json::to_string(entry)
        .map_err(|e| TurnlogError::Encode(format!("{} section: {e}", entry.section())))?;
    out.push_str(&line);
    out.push('\n');
    Ok(())
}

/// Eager decode; does not check the format version.
pub fn decode(text: &str) -> Result<Envelope, TurnlogError> {
    let (header, mut reader) = EnvelopeReader::open(text)?;
    let snapshot = reader.read_snapshot()?;
    let actions = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(Envelope {
        header,
        snapshot,
        actions,
    })
}

/// Reads a save section by section. Actions are decoded one at a time as
/// the iterator is driven.
pub struct EnvelopeReader<'a> {
    lines: Enumerate<Lines<'a>>,
    expected_actions: usize,
    next_index: usize,
    snapshot_read: bool,
    done: bool,
}

impl<'a> EnvelopeReader<'a> {
    /// Decodes only the header line.
    pub fn open(text: &'a str) -> Result<(SaveHeader, Self), TurnlogError> {
        let mut reader = Self {
            lines: text.lines().enumerate(),
            expected_actions: 0,
            next_index: 0,
            snapshot_read: false,
            done: false,
        };
        let header = match reader.next_entry()? {
            Some(SaveEntry::Header(header)) => header,
            Some(other) => {
                return Err(TurnlogError::Decode(format!(
                    "save must start with a header, found {} section",
                    other.section()
                )))
            }
            None => return Err(TurnlogError::Decode("save is empty".to_string())),
        };
        reader.expected_actions = header.action_count;
        Ok((header, reader))
    }

    pub fn read_snapshot(&mut self) -> Result<Snapshot, TurnlogError> {
        if self.snapshot_read {
            return Err(TurnlogError::Decode("snapshot already read".to_string()));
        }
        match self.next_entry()? {
            Some(SaveEntry::Snapshot(snapshot)) => {
                self.snapshot_read = true;
                Ok(snapshot)
            }
            Some(other) => Err(TurnlogError::Decode(format!(
                "expected snapshot section after header, found {}",
                other.section()
            ))),
            None => Err(TurnlogError::Decode("save has no snapshot".to_string())),
        }
    }

    pub fn expected_actions(&self) -> usize {
        self.expected_actions
    }

    pub fn next_action(&mut self) -> Result<Option<Action>, TurnlogError> {
        if self.done {
            return Ok(None);
        }
        if !self.snapshot_read {
            self.read_snapshot()?;
        }
        let entry = match self.next_entry() {
            Ok(entry) => entry,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        match entry {
            Some(SaveEntry::Action(entry)) => {
                if entry.index != self.next_index {
                    self.done = true;
                    return Err(TurnlogError::Decode(format!(
                        "action entry {} found where {} was expected",
                        entry.index, self.next_index
                    )));
                }
                if let Some(kind) = entry.action.correction_type().filter(|t| t.is_retired()) {
                    self.done = true;
                    return Err(TurnlogError::RetiredAction {
                        index: self.next_index,
                        kind: kind.as_str().to_string(),
                    });
                }
                self.next_index += 1;
                Ok(Some(entry.action))
            }
            Some(other) => {
                self.done = true;
                Err(TurnlogError::Decode(format!(
                    "unexpected {} section at action {}",
                    other.section(),
                    self.next_index
                )))
            }
            None => {
                self.done = true;
                if self.next_index != self.expected_actions {
                    return Err(TurnlogError::Decode(format!(
                        "header promises {} actions, file holds {}",
                        self.expected_actions, self.next_index
                    )));
                }
                Ok(None)
            }
        }
    }

    fn next_entry(&mut self) -> Result<Option<SaveEntry>, TurnlogError> {
        for (idx, line) in self.lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)
                .map_err(|e| TurnlogError::Decode(format!("save line {}: {e}", idx + 1)))?;
            if let Some(kind) = retired_kind(&value) {
                return Err(TurnlogError::RetiredAction {
                    index: self.next_index,
                    kind,
                });
            }
            let entry = serde_json::from_value(value)
                .map_err(|e| TurnlogError::Decode(format!("save line {}: {e}", idx + 1)))?;
            return Ok(Some(entry));
        }
        Ok(None)
    }
}

impl Iterator for EnvelopeReader<'_> {
    type Item = Result<Action, TurnlogError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_action().transpose()
    }
}

fn retired_kind(value: &Value) -> Option<String> {
    if value.get("section").and_then(Value::as_str) != Some("action") {
        return None;
    }
    let kind = value.get("action")?.get("kind")?.as_str()?;
    RETIRED_ACTION_KINDS
        .contains(&kind)
        .then(|| kind.to_string())
}
