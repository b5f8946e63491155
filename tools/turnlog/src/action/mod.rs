//! Loggable decisions and the template/commitment matching protocol.
//!
//! The engine offers *templates* (precondition fields only). A participant
//! answers with a *commitment* (the same template plus postcondition
//! fields). `matches_template` confirms a submitted action is one of the
//! offered choices; `matches_commitment` additionally compares the chosen
//! values and is used when verifying replay against the log.

pub mod correction;
pub mod fields;
pub mod ordinary;

use crate::errors::TurnlogError;
use crate::types::CorrectionType;
use correction::{
    CashCorrectionAction, ClosePrivateAction, CorrectionModeAction, OperatingCostAction,
};
use fields::{ActionFields, FieldList};
use ordinary::{BuyPrivateAction, NullAction, StartCompanyAction};
use serde::{Deserialize, Serialize};

/// Action kinds that older tool versions wrote and this one refuses.
pub const RETIRED_ACTION_KINDS: &[&str] = &["map_correction"];

/// Innermost layer: who acts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBase {
    pub player: String,
}

impl ActionBase {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
        }
    }
}

impl ActionFields for ActionBase {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        out.text("player", &self.player);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Null(NullAction),
    BuyPrivate(BuyPrivateAction),
    StartCompany(StartCompanyAction),
    CorrectionMode(CorrectionModeAction),
    CashCorrection(CashCorrectionAction),
    ClosePrivate(ClosePrivateAction),
    OperatingCost(OperatingCostAction),
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null(_) => "null",
            Self::BuyPrivate(_) => "buy_private",
            Self::StartCompany(_) => "start_company",
            Self::CorrectionMode(_) => "correction_mode",
            Self::CashCorrection(_) => "cash_correction",
            Self::ClosePrivate(_) => "close_private",
            Self::OperatingCost(_) => "operating_cost",
        }
    }

    fn layers(&self) -> &dyn ActionFields {
        match self {
            Self::Null(action) => action,
            Self::BuyPrivate(action) => action,
            Self::StartCompany(action) => action,
            Self::CorrectionMode(action) => action,
            Self::CashCorrection(action) => action,
            Self::ClosePrivate(action) => action,
            Self::OperatingCost(action) => action,
        }
    }

    pub fn player(&self) -> &str {
        match self {
            Self::Null(action) => &action.base.player,
            Self::BuyPrivate(action) => &action.base.player,
            Self::StartCompany(action) => &action.base.player,
            Self::CorrectionMode(action) => &action.correction.base.player,
            Self::CashCorrection(action) => &action.correction.base.player,
            Self::ClosePrivate(action) => &action.correction.base.player,
            Self::OperatingCost(action) => &action.correction.base.player,
        }
    }

    /// The correction family for correction actions, `None` for ordinary ones.
    pub fn correction_type(&self) -> Option<CorrectionType> {
        match self {
            Self::CorrectionMode(action) => Some(action.correction.correction_type),
            Self::CashCorrection(action) => Some(action.correction.correction_type),
            Self::ClosePrivate(action) => Some(action.correction.correction_type),
            Self::OperatingCost(action) => Some(action.correction.correction_type),
            Self::Null(_) | Self::BuyPrivate(_) | Self::StartCompany(_) => None,
        }
    }

    pub fn is_correction(&self) -> bool {
        self.correction_type().is_some()
    }

    pub fn matches_template(&self, other: &Action) -> bool {
        self.kind() == other.kind() && self.layers().preconditions() == other.layers().preconditions()
    }

    pub fn matches_commitment(&self, other: &Action) -> bool {
        self.matches_template(other)
            && self.layers().postconditions() == other.layers().postconditions()
    }

    pub fn is_committed(&self) -> bool {
        self.layers().postconditions().is_complete()
    }

    /// Rejects actions naming a retired correction family.
    pub fn ensure_supported(&self) -> Result<(), TurnlogError> {
        match self.correction_type() {
            Some(kind) if kind.is_retired() => Err(TurnlogError::NotSupported(format!(
                "{} action for retired correction family {kind}",
                self.kind()
            ))),
            _ => Ok(()),
        }
    }

    /// One-line human summary used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Null(action) => format!("{} {}", action.base.player, action.mode.as_str()),
            Self::BuyPrivate(action) => format!(
                "{} buys {} for {}",
                action.base.player, action.private_id, action.price
            ),
            Self::StartCompany(action) => match action.par_price {
                Some(par) => format!(
                    "{} starts {} at par {par}",
                    action.base.player, action.company
                ),
                None => format!(
                    "{} starts {} (par {}..={})",
                    action.base.player, action.company, action.min_par, action.max_par
                ),
            },
            Self::CorrectionMode(action) => format!(
                "{} toggles {} (active={})",
                action.correction.base.player,
                action.correction.correction_type,
                action.active
            ),
            Self::CashCorrection(action) => format!(
                "{} corrects cash of {} {} by {}",
                action.correction.base.player,
                action.target.kind(),
                action.target.name(),
                action.amount()
            ),
            Self::ClosePrivate(action) => format!(
                "{} closes private {}",
                action.correction.base.player, action.private_id
            ),
            Self::OperatingCost(action) => format!(
                "{} charges {} {} for {}",
                action.correction.base.player,
                action.company,
                action.amount(),
                action.cost_kind.as_str()
            ),
        }
    }
}
