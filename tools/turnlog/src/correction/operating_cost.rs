use super::{CorrectionManager, Execution, ManagerCore};
use crate::action::correction::OperatingCostAction;
use crate::action::Action;
use crate::errors::TurnlogError;
use crate::game::context::ApplyContext;
use crate::game::state::GameState;
use crate::report::money;
use crate::snapshot::Snapshot;
use crate::types::{CashHolder, CorrectionType, OperatingCostKind};

pub const TILE_LAY_COST_OPTION: &str = "TileLayCost";
pub const BASE_TOKEN_COST_OPTION: &str = "BaseTokenCost";

/// Injects tile and token costs a company should have paid.
pub struct OperatingCostManager {
    core: ManagerCore,
    tile_lay_cost: i64,
    base_token_cost: i64,
}

impl OperatingCostManager {
    pub fn new(tile_lay_cost: i64, base_token_cost: i64) -> Self {
        Self {
            core: ManagerCore::new(CorrectionType::OperatingCost),
            tile_lay_cost,
            base_token_cost,
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, TurnlogError> {
        Ok(Self::new(
            snapshot.option_i64(TILE_LAY_COST_OPTION)?,
            snapshot.option_i64(BASE_TOKEN_COST_OPTION)?,
        ))
    }

    fn suggested(&self, kind: OperatingCostKind) -> i64 {
        match kind {
            OperatingCostKind::LayTile => self.tile_lay_cost,
            OperatingCostKind::LayBaseToken => self.base_token_cost,
        }
    }
}

impl CorrectionManager for OperatingCostManager {
    fn core(&self) -> &ManagerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManagerCore {
        &mut self.core
    }

    fn correction_templates(&self, state: &GameState, player: &str) -> Vec<Action> {
        let mut templates = Vec::new();
        for company in state.companies.iter().filter(|c| c.is_operating() && c.cash > 0) {
            for kind in OperatingCostKind::ALL {
                templates.push(Action::OperatingCost(OperatingCostAction::template(
                    player,
                    &company.id,
                    kind,
                    self.suggested(kind).min(company.cash),
                    company.cash,
                    true,
                )));
            }
        }
        templates
    }

    fn execute_correction(&mut self, action: &Action, ctx: &mut ApplyContext<'_>) -> Execution {
        let Action::OperatingCost(action) = action else {
            return Execution::Unhandled;
        };
        let company_id = &action.company;
        let amount = action.amount();
        let cash = match ctx.resolve_company(company_id) {
            Ok(company) if company.is_operating() => company.cash,
            Ok(_) => {
                return Execution::Rejected(ctx.error(
                    "OperatingCostInvalid",
                    &[company_id, &money(amount), &"company is not operating"],
                ))
            }
            Err(err) => {
                let reason = err.to_string();
                ctx.report.add_error(reason.clone());
                return Execution::Rejected(reason);
            }
        };
        let problem = if amount <= 0 {
            Some("amount must be positive")
        } else if amount > cash {
            Some("company cannot afford it")
        } else if !action.free_entry_allowed && amount != action.suggested {
            Some("only the suggested amount is allowed")
        } else {
            None
        };
        if let Some(problem) = problem {
            return Execution::Rejected(ctx.error(
                "OperatingCostInvalid",
                &[company_id, &money(amount), &problem],
            ));
        }
        let holder = CashHolder::Company(company_id.clone());
        if let Err(err) = ctx.state.move_cash_with_bank(&holder, -amount) {
            let reason = err.to_string();
            ctx.report.add_error(reason.clone());
            return Execution::Rejected(reason);
        }
        ctx.message(
            "OperatingCostPaid",
            &[
                company_id,
                &money(amount),
                &action.cost_kind.as_str(),
                &action.correction.base.player,
            ],
        );
        Execution::Applied
    }
}
