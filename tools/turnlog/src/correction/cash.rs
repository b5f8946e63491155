use super::{CorrectionManager, Execution, ManagerCore};
use crate::action::correction::CashCorrectionAction;
use crate::action::Action;
use crate::game::context::ApplyContext;
use crate::game::state::GameState;
use crate::report::money;
use crate::types::CorrectionType;

/// Adds money to or removes money from any holder, against the bank.
pub struct CashCorrectionManager {
    core: ManagerCore,
}

impl CashCorrectionManager {
    pub fn new() -> Self {
        Self {
            core: ManagerCore::new(CorrectionType::CashCorrection),
        }
    }
}

impl Default for CashCorrectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrectionManager for CashCorrectionManager {
    fn core(&self) -> &ManagerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManagerCore {
        &mut self.core
    }

    fn correction_templates(&self, state: &GameState, player: &str) -> Vec<Action> {
        state
            .cash_holders()
            .into_iter()
            .map(|(holder, cash)| {
                Action::CashCorrection(CashCorrectionAction::template(player, holder, cash))
            })
            .collect()
    }

    fn execute_correction(&mut self, action: &Action, ctx: &mut ApplyContext<'_>) -> Execution {
        let Action::CashCorrection(action) = action else {
            return Execution::Unhandled;
        };
        let target = &action.target;
        let amount = action.amount();
        let Some(cash) = ctx.state.cash_of(target) else {
            return Execution::Rejected(ctx.error("CorrectCashUnknownHolder", &[target]));
        };
        if amount == 0 {
            return Execution::Rejected(ctx.error("CorrectCashZero", &[target]));
        }
        match cash.checked_add(amount) {
            None => {
                return Execution::Rejected(ctx.error(
                    "CorrectCashOutOfRange",
                    &[target, &money(amount)],
                ));
            }
            Some(after) if after < 0 => {
                return Execution::Rejected(ctx.error(
                    "CorrectCashNegative",
                    &[target, &money(amount), &money(cash)],
                ));
            }
            Some(_) => {}
        }
        if let Err(err) = ctx.state.move_cash_with_bank(target, amount) {
            let reason = err.to_string();
            ctx.report.add_error(reason.clone());
            return Execution::Rejected(reason);
        }
        let by = &action.correction.base.player;
        if amount > 0 {
            ctx.message("CorrectCashAddMoney", &[target, &money(amount), by]);
        } else {
            ctx.message("CorrectCashSubtractMoney", &[target, &money(-amount), by]);
        }
        Execution::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ruleset::BasicRuleset;
    use crate::report::{DefaultTextCatalog, ReportBuffer};
    use crate::types::{CashHolder, ReplayMode};

    fn run(state: &mut GameState, action: CashCorrectionAction) -> (Execution, ReportBuffer) {
        let mut manager = CashCorrectionManager::new();
        let mut report = ReportBuffer::default();
        let text = DefaultTextCatalog::new();
        let mut ctx = ApplyContext {
            state,
            report: &mut report,
            text: &text,
            mode: ReplayMode::Live,
        };
        let outcome = manager.execute_correction(&Action::CashCorrection(action), &mut ctx);
        (outcome, report)
    }

    fn state_with_alice_cash(cash: i64) -> GameState {
        let snapshot = BasicRuleset::snapshot(&["Alice", "Bob"]);
        let mut state = BasicRuleset::initial_state(&snapshot).expect("state");
        if let Some(alice) = state.player_mut("Alice") {
            alice.cash = cash;
        }
        state
    }

    fn alice() -> CashHolder {
        CashHolder::Player("Alice".to_string())
    }

    #[test]
    fn overdraw_is_rejected_and_cash_unchanged() {
        let mut state = state_with_alice_cash(100);
        let bank = state.bank_cash;
        let action = CashCorrectionAction::template("Bob", alice(), 100).with_amount(-150);
        let (outcome, report) = run(&mut state, action);
        assert!(matches!(outcome, Execution::Rejected(_)));
        assert!(outcome.handled());
        assert_eq!(state.player("Alice").map(|p| p.cash), Some(100));
        assert_eq!(state.bank_cash, bank);
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn draining_to_exactly_zero_is_allowed() {
        let mut state = state_with_alice_cash(100);
        let bank = state.bank_cash;
        let action = CashCorrectionAction::template("Bob", alice(), 100).with_amount(-100);
        let (outcome, report) = run(&mut state, action);
        assert_eq!(outcome, Execution::Applied);
        assert_eq!(state.player("Alice").map(|p| p.cash), Some(0));
        assert_eq!(state.bank_cash, bank + 100);
        assert_eq!(
            report.lines(),
            &["Alice pays $100 to the bank (correction by Bob)".to_string()]
        );
    }

    #[test]
    fn zero_amount_is_rejected() {
        let mut state = state_with_alice_cash(100);
        let action = CashCorrectionAction::template("Bob", alice(), 100).with_amount(0);
        let (outcome, _) = run(&mut state, action);
        assert!(matches!(outcome, Execution::Rejected(reason) if reason.contains("zero")));
        assert_eq!(state.player("Alice").map(|p| p.cash), Some(100));
    }

    #[test]
    fn out_of_range_amount_is_rejected_without_touching_cash() {
        let mut state = state_with_alice_cash(600);
        let bank = state.bank_cash;
        let action = CashCorrectionAction::template("Bob", alice(), 600).with_amount(i64::MAX);
        let (outcome, report) = run(&mut state, action);
        assert!(matches!(outcome, Execution::Rejected(reason) if reason.contains("out of range")));
        assert_eq!(state.player("Alice").map(|p| p.cash), Some(600));
        assert_eq!(state.bank_cash, bank);
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn templates_cover_players_and_operating_companies() {
        let mut state = state_with_alice_cash(100);
        if let Some(prr) = state.company_mut("PRR") {
            prr.floated = true;
            prr.cash = 670;
        }
        let manager = CashCorrectionManager::new();
        let templates = manager.correction_templates(&state, "Alice");
        assert_eq!(templates.len(), 3);
        assert!(templates.contains(&Action::CashCorrection(CashCorrectionAction::template(
            "Alice",
            CashHolder::Company("PRR".to_string()),
            670
        ))));
        assert!(templates.contains(&Action::CashCorrection(CashCorrectionAction::template(
            "Alice",
            alice(),
            100
        ))));
    }
}
