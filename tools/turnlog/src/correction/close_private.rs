use super::{CorrectionManager, Execution, ManagerCore};
use crate::action::correction::ClosePrivateAction;
use crate::action::Action;
use crate::game::context::ApplyContext;
use crate::game::state::GameState;
use crate::types::CorrectionType;

pub struct ClosePrivateManager {
    core: ManagerCore,
}

impl ClosePrivateManager {
    pub fn new() -> Self {
        Self {
            core: ManagerCore::new(CorrectionType::ClosePrivate),
        }
    }
}

impl Default for ClosePrivateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrectionManager for ClosePrivateManager {
    fn core(&self) -> &ManagerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManagerCore {
        &mut self.core
    }

    fn correction_templates(&self, state: &GameState, player: &str) -> Vec<Action> {
        state
            .privates
            .iter()
            .filter(|private| !private.closed)
            .map(|private| Action::ClosePrivate(ClosePrivateAction::new(player, &private.id)))
            .collect()
    }

    fn execute_correction(&mut self, action: &Action, ctx: &mut ApplyContext<'_>) -> Execution {
        let Action::ClosePrivate(action) = action else {
            return Execution::Unhandled;
        };
        let id = &action.private_id;
        let already_closed = match ctx.resolve_private(id) {
            Ok(private) => private.closed,
            Err(err) => {
                let reason = err.to_string();
                ctx.report.add_error(reason.clone());
                return Execution::Rejected(reason);
            }
        };
        if already_closed {
            return Execution::Rejected(ctx.error("PrivateAlreadyClosed", &[id]));
        }
        if let Err(err) = ctx.state.close_private(id) {
            let reason = err.to_string();
            ctx.report.add_error(reason.clone());
            return Execution::Rejected(reason);
        }
        ctx.message("PrivateForcedClosed", &[&action.correction.base.player, id]);
        Execution::Applied
    }
}
