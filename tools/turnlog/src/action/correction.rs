use super::fields::{ActionFields, FieldList};
use super::ActionBase;
use crate::errors::TurnlogError;
use crate::types::{CashHolder, CorrectionType, OperatingCostKind};
use serde::{Deserialize, Serialize};

/// Layer shared by every correction action: the family it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionBase {
    #[serde(flatten)]
    pub base: ActionBase,
    pub correction_type: CorrectionType,
}

impl CorrectionBase {
    pub fn new(player: impl Into<String>, correction_type: CorrectionType) -> Self {
        Self {
            base: ActionBase::new(player),
            correction_type,
        }
    }
}

impl ActionFields for CorrectionBase {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.base.precondition_fields(out);
        out.text("correction_type", self.correction_type.as_str());
    }
}

/// Switches a correction family on or off. `active` is the state the
/// family was in when the toggle was offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionModeAction {
    #[serde(flatten)]
    pub correction: CorrectionBase,
    pub active: bool,
}

impl CorrectionModeAction {
    pub fn new(
        player: impl Into<String>,
        correction_type: CorrectionType,
        active: bool,
    ) -> Result<Self, TurnlogError> {
        if correction_type.is_retired() {
            return Err(TurnlogError::NotSupported(format!(
                "correction family {correction_type} is retired"
            )));
        }
        Ok(Self {
            correction: CorrectionBase::new(player, correction_type),
            active,
        })
    }

    pub fn correction_type(&self) -> CorrectionType {
        self.correction.correction_type
    }
}

impl ActionFields for CorrectionModeAction {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.correction.precondition_fields(out);
        out.flag("active", self.active);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCorrectionAction {
    #[serde(flatten)]
    pub correction: CorrectionBase,
    pub target: CashHolder,
    /// Largest amount that may be removed: the holder's cash when offered.
    pub max_negative: i64,
    #[serde(default)]
    pub amount: Option<i64>,
}

impl CashCorrectionAction {
    pub fn template(player: impl Into<String>, target: CashHolder, max_negative: i64) -> Self {
        Self {
            correction: CorrectionBase::new(player, CorrectionType::CashCorrection),
            target,
            max_negative,
            amount: None,
        }
    }

    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Uncommitted corrections move nothing.
    pub fn amount(&self) -> i64 {
        self.amount.unwrap_or(0)
    }
}

impl ActionFields for CashCorrectionAction {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.correction.precondition_fields(out);
        out.text("target_kind", self.target.kind());
        out.text("target", self.target.name());
        out.int("max_negative", self.max_negative);
    }

    fn postcondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.correction.postcondition_fields(out);
        out.push("amount", self.amount.into());
    }
}

/// Forces a private company closed outside the normal closing rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePrivateAction {
    #[serde(flatten)]
    pub correction: CorrectionBase,
    pub private_id: String,
}

impl ClosePrivateAction {
    pub fn new(player: impl Into<String>, private_id: impl Into<String>) -> Self {
        Self {
            correction: CorrectionBase::new(player, CorrectionType::ClosePrivate),
            private_id: private_id.into(),
        }
    }
}

impl ActionFields for ClosePrivateAction {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.correction.precondition_fields(out);
        out.text("private_id", &self.private_id);
    }
}

/// Charges a company an operating cost. Doubles as its own template: an
/// uncommitted action resolves to the suggested cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingCostAction {
    #[serde(flatten)]
    pub correction: CorrectionBase,
    pub company: String,
    pub cost_kind: OperatingCostKind,
    pub suggested: i64,
    pub max: i64,
    pub free_entry_allowed: bool,
    #[serde(default)]
    pub chosen: Option<i64>,
}

impl OperatingCostAction {
    pub fn template(
        player: impl Into<String>,
        company: impl Into<String>,
        cost_kind: OperatingCostKind,
        suggested: i64,
        max: i64,
        free_entry_allowed: bool,
    ) -> Self {
        Self {
            correction: CorrectionBase::new(player, CorrectionType::OperatingCost),
            company: company.into(),
            cost_kind,
            suggested,
            max,
            free_entry_allowed,
            chosen: None,
        }
    }

    pub fn with_chosen(mut self, amount: i64) -> Self {
        self.chosen = Some(amount);
        self
    }

    pub fn amount(&self) -> i64 {
        self.chosen.unwrap_or(self.suggested)
    }
}

impl ActionFields for OperatingCostAction {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.correction.precondition_fields(out);
        out.text("company", &self.company);
        out.text("cost_kind", self.cost_kind.as_str());
        out.int("suggested", self.suggested);
        out.int("max", self.max);
        out.flag("free_entry_allowed", self.free_entry_allowed);
    }

    fn postcondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.correction.postcondition_fields(out);
        out.push("chosen", self.chosen.into());
    }
}
