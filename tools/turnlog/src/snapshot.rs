use crate::errors::TurnlogError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Rule options by name. Ordered so serialized output is stable.
pub type OptionSet = BTreeMap<String, String>;

/// Starting configuration a game is built and rebuilt from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ruleset_id: String,
    #[serde(default)]
    pub options: OptionSet,
    pub participants: Vec<String>,
}

impl Snapshot {
    pub fn new(ruleset_id: impl Into<String>, participants: Vec<String>) -> Self {
        Self {
            ruleset_id: ruleset_id.into(),
            options: OptionSet::new(),
            participants,
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn validate(&self, min_players: usize, max_players: usize) -> Result<(), TurnlogError> {
        if self.ruleset_id.trim().is_empty() {
            return Err(TurnlogError::InvalidSnapshot(
                "ruleset id must not be empty".to_string(),
            ));
        }
        let count = self.participants.len();
        if count < min_players || count > max_players {
            return Err(TurnlogError::InvalidSnapshot(format!(
                "{} needs {min_players}..={max_players} participants, got {count}",
                self.ruleset_id
            )));
        }
        let mut seen = BTreeSet::new();
        for name in &self.participants {
            if name.trim().is_empty() {
                return Err(TurnlogError::InvalidSnapshot(
                    "participant names must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(TurnlogError::InvalidSnapshot(format!(
                    "duplicate participant {name}"
                )));
            }
        }
        Ok(())
    }

    pub fn option_i64(&self, name: &str) -> Result<i64, TurnlogError> {
        let raw = self.options.get(name).ok_or_else(|| {
            TurnlogError::InvalidSnapshot(format!("missing rule option {name}"))
        })?;
        raw.trim().parse::<i64>().map_err(|e| {
            TurnlogError::InvalidSnapshot(format!("rule option {name}={raw} is not a number: {e}"))
        })
    }
}

/// What happened while merging saved options over the ruleset defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMergeReport {
    /// Defaults the save did not mention; left at the default value.
    pub missing_from_save: Vec<String>,
    /// Saved options the current ruleset does not know; dropped.
    pub ignored_from_save: Vec<String>,
}

/// Rebuilds a snapshot: every default option, overridden by the saved
/// value of the same name when present.
pub fn reconstruct(saved: &Snapshot, defaults: &OptionSet) -> (Snapshot, OptionMergeReport) {
    let mut report = OptionMergeReport::default();
    let mut options = OptionSet::new();
    for (name, default) in defaults {
        match saved.options.get(name) {
            Some(value) => {
                options.insert(name.clone(), value.clone());
            }
            None => {
                report.missing_from_save.push(name.clone());
                options.insert(name.clone(), default.clone());
            }
        }
    }
    report.ignored_from_save = saved
        .options
        .keys()
        .filter(|name| !defaults.contains_key(*name))
        .cloned()
        .collect();
    let snapshot = Snapshot {
        ruleset_id: saved.ruleset_id.clone(),
        options,
        participants: saved.participants.clone(),
    };
    (snapshot, report)
}
