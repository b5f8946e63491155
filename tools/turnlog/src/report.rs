use crate::errors::TurnlogError;
use crate::runtime::FileSystem;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

const DEFAULT_TEXTS: &[(&str, &str)] = &[
    ("CorrectionModeActivate", "{0} activates {1} correction mode"),
    ("CorrectionModeDeactivate", "{0} deactivates {1} correction mode"),
    (
        "CorrectCashAddMoney",
        "{0} receives {1} from the bank (correction by {2})",
    ),
    (
        "CorrectCashSubtractMoney",
        "{0} pays {1} to the bank (correction by {2})",
    ),
    ("CorrectCashZero", "Cash correction for {0} ignored: amount is zero"),
    (
        "CorrectCashNegative",
        "Cash correction of {1} for {0} rejected: cash would drop below zero (has {2})",
    ),
    (
        "CorrectCashOutOfRange",
        "Cash correction of {1} for {0} rejected: amount out of range",
    ),
    ("CorrectCashUnknownHolder", "Cash correction target {0} holds no money"),
    ("PrivateForcedClosed", "{0} forces private {1} closed"),
    ("PrivateAlreadyClosed", "Private {0} is already closed"),
    (
        "OperatingCostPaid",
        "{0} pays {1} to the bank for {2} (correction by {3})",
    ),
    ("OperatingCostInvalid", "Operating cost of {1} for {0} rejected: {2}"),
    ("PlayerPasses", "{0} passes"),
    ("BuysPrivate", "{0} buys private {1} from the bank for {2}"),
    ("StartsCompany", "{0} starts {1} at par {2}"),
    ("GameStarted", "New {0} game with {1}"),
    ("GameLoaded", "Game loaded: {0} actions replayed"),
];

/// Localization lookup. Implementations return `None` for unknown keys;
/// callers never fail on a missing text.
pub trait TextCatalog: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultTextCatalog {
    overrides: BTreeMap<String, String>,
}

impl DefaultTextCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }
}

impl TextCatalog for DefaultTextCatalog {
    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(text) = self.overrides.get(key) {
            return Some(text.clone());
        }
        DEFAULT_TEXTS
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, text)| (*text).to_string())
    }
}

pub fn localized_text(catalog: &dyn TextCatalog, key: &str, args: &[&dyn Display]) -> String {
    let Some(template) = catalog.lookup(key) else {
        let rendered = args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
        if rendered.is_empty() {
            return key.to_string();
        }
        return format!("{key}: {}", rendered.join(", "));
    };
    let mut text = template;
    for (idx, arg) in args.iter().enumerate() {
        text = text.replace(&format!("{{{idx}}}"), &arg.to_string());
    }
    text
}

pub fn money(amount: i64) -> String {
    if amount < 0 {
        format!("-${}", amount.unsigned_abs())
    } else {
        format!("${amount}")
    }
}

/// Game report: ordinary messages, validation errors, and live-only notices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBuffer {
    lines: Vec<String>,
    errors: Vec<String>,
    notices: Vec<String>,
}

impl ReportBuffer {
    pub fn add(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn add_error(&mut self, line: impl Into<String>) {
        self.errors.push(line.into());
    }

    pub fn add_notice(&mut self, line: impl Into<String>) {
        self.notices.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        if !self.errors.is_empty() {
            out.push_str("-- errors --\n");
            for line in &self.errors {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    pub fn export(&self, fs: &dyn FileSystem, path: &Path) -> Result<(), TurnlogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs.create_dir_all(parent)?;
            }
        }
        fs.write_string(path, &self.render())
    }
}
