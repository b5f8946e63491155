use serde::{Deserialize, Serialize};
use std::fmt;

/// Correction families. Retired families stay listed so old save data that
/// names them is recognised and rejected with a clear diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionType {
    CashCorrection,
    ClosePrivate,
    OperatingCost,
    MapCorrection,
}

impl CorrectionType {
    pub const ALL: [CorrectionType; 4] = [
        Self::CashCorrection,
        Self::ClosePrivate,
        Self::OperatingCost,
        Self::MapCorrection,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CashCorrection => "CASH_CORRECTION",
            Self::ClosePrivate => "CLOSE_PRIVATE",
            Self::OperatingCost => "OPERATING_COST",
            Self::MapCorrection => "MAP_CORRECTION",
        }
    }

    pub fn is_retired(self) -> bool {
        matches!(self, Self::MapCorrection)
    }

    pub fn supported() -> impl Iterator<Item = CorrectionType> {
        Self::ALL.into_iter().filter(|kind| !kind.is_retired())
    }
}

impl fmt::Display for CorrectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passed into every apply call. `Reloading` suppresses side channels that
/// only make sense during live play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    Live,
    Reloading,
}

impl ReplayMode {
    pub fn is_reloading(self) -> bool {
        matches!(self, Self::Reloading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullMode {
    Pass,
    Done,
    Skip,
}

impl NullMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Done => "done",
            Self::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingCostKind {
    LayTile,
    LayBaseToken,
}

impl OperatingCostKind {
    pub const ALL: [OperatingCostKind; 2] = [Self::LayTile, Self::LayBaseToken];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LayTile => "lay_tile",
            Self::LayBaseToken => "lay_base_token",
        }
    }
}

/// Anything that can hold money besides the bank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashHolder {
    Player(String),
    Company(String),
}

impl CashHolder {
    pub fn name(&self) -> &str {
        match self {
            Self::Player(name) | Self::Company(name) => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Player(_) => "player",
            Self::Company(_) => "company",
        }
    }
}

impl fmt::Display for CashHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
