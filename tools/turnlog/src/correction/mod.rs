//! Correction mode: privileged, togglable actions for administrative state
//! fixes. Every state change goes through `CorrectionRegistry::execute` with
//! a logged action, so corrections replay exactly like ordinary actions.

pub mod cash;
pub mod close_private;
pub mod operating_cost;

use crate::action::correction::CorrectionModeAction;
use crate::action::Action;
use crate::errors::TurnlogError;
use crate::game::context::ApplyContext;
use crate::game::state::GameState;
use crate::snapshot::Snapshot;
use crate::types::CorrectionType;
use cash::CashCorrectionManager;
use close_private::ClosePrivateManager;
use operating_cost::OperatingCostManager;

/// Result of handing an action to a manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    Applied,
    /// Handled, but validation failed: nothing changed, the reason went to
    /// the report.
    Rejected(String),
    /// Not an action this manager owns.
    Unhandled,
}

impl Execution {
    pub fn handled(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// The `active` switch every manager carries. Only a committed toggle
/// flips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerCore {
    correction_type: CorrectionType,
    active: bool,
}

impl ManagerCore {
    fn new(correction_type: CorrectionType) -> Self {
        Self {
            correction_type,
            active: false,
        }
    }

    pub fn correction_type(&self) -> CorrectionType {
        self.correction_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn toggle_template(&self, player: &str) -> Action {
        Action::CorrectionMode(CorrectionModeAction {
            correction: crate::action::correction::CorrectionBase::new(
                player,
                self.correction_type,
            ),
            active: self.active,
        })
    }

    fn execute_toggle(
        &mut self,
        action: &CorrectionModeAction,
        ctx: &mut ApplyContext<'_>,
    ) -> Execution {
        if action.correction_type() != self.correction_type {
            return Execution::Unhandled;
        }
        self.active = !self.active;
        let key = if self.active {
            "CorrectionModeActivate"
        } else {
            "CorrectionModeDeactivate"
        };
        let player = &action.correction.base.player;
        ctx.message(key, &[player, &self.correction_type]);
        ctx.notice(key, &[player, &self.correction_type]);
        Execution::Applied
    }
}

pub trait CorrectionManager: Send {
    fn core(&self) -> &ManagerCore;

    fn core_mut(&mut self) -> &mut ManagerCore;

    /// Correction templates offered while the family is active.
    fn correction_templates(&self, state: &GameState, player: &str) -> Vec<Action>;

    fn execute_correction(&mut self, action: &Action, ctx: &mut ApplyContext<'_>) -> Execution;

    fn correction_type(&self) -> CorrectionType {
        self.core().correction_type()
    }

    fn is_active(&self) -> bool {
        self.core().is_active()
    }

    fn list_templates(&self, state: &GameState, player: &str) -> Vec<Action> {
        let mut templates = vec![self.core().toggle_template(player)];
        if self.is_active() {
            templates.extend(self.correction_templates(state, player));
        }
        templates
    }

    fn execute(&mut self, action: &Action, ctx: &mut ApplyContext<'_>) -> Execution {
        match action {
            Action::CorrectionMode(toggle) => self.core_mut().execute_toggle(toggle, ctx),
            other => self.execute_correction(other, ctx),
        }
    }
}

/// Factory keyed by family. Retired families are recognised but refused.
pub fn create_manager(
    correction_type: CorrectionType,
    snapshot: &Snapshot,
) -> Result<Box<dyn CorrectionManager>, TurnlogError> {
    match correction_type {
        CorrectionType::CashCorrection => Ok(Box::new(CashCorrectionManager::new())),
        CorrectionType::ClosePrivate => Ok(Box::new(ClosePrivateManager::new())),
        CorrectionType::OperatingCost => Ok(Box::new(OperatingCostManager::from_snapshot(
            snapshot,
        )?)),
        CorrectionType::MapCorrection => Err(TurnlogError::NotSupported(format!(
            "correction family {correction_type} is retired"
        ))),
    }
}

/// One manager per supported family, all inactive at start.
pub struct CorrectionRegistry {
    managers: Vec<Box<dyn CorrectionManager>>,
}

impl CorrectionRegistry {
    pub fn initialize(snapshot: &Snapshot) -> Result<Self, TurnlogError> {
        let managers = CorrectionType::supported()
            .map(|kind| create_manager(kind, snapshot))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { managers })
    }

    pub fn correction_types(&self) -> Vec<CorrectionType> {
        self.managers
            .iter()
            .map(|manager| manager.correction_type())
            .collect()
    }

    pub fn is_active(&self, correction_type: CorrectionType) -> bool {
        self.manager(correction_type)
            .map(|manager| manager.is_active())
            .unwrap_or(false)
    }

    pub fn active_types(&self) -> Vec<CorrectionType> {
        self.managers
            .iter()
            .filter(|manager| manager.is_active())
            .map(|manager| manager.correction_type())
            .collect()
    }

    pub fn manager(&self, correction_type: CorrectionType) -> Option<&dyn CorrectionManager> {
        self.managers
            .iter()
            .find(|manager| manager.correction_type() == correction_type)
            .map(|manager| manager.as_ref())
    }

    fn manager_mut(
        &mut self,
        correction_type: CorrectionType,
    ) -> Option<&mut Box<dyn CorrectionManager>> {
        self.managers
            .iter_mut()
            .find(|manager| manager.correction_type() == correction_type)
    }

    pub fn list_templates(&self, state: &GameState, player: &str) -> Vec<Action> {
        self.managers
            .iter()
            .flat_map(|manager| manager.list_templates(state, player))
            .collect()
    }

    pub fn execute(&mut self, action: &Action, ctx: &mut ApplyContext<'_>) -> Execution {
        let Some(correction_type) = action.correction_type() else {
            return Execution::Unhandled;
        };
        match self.manager_mut(correction_type) {
            Some(manager) => manager.execute(action, ctx),
            None => Execution::Unhandled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::correction::ClosePrivateAction;
    use crate::action::ordinary::NullAction;
    use crate::game::ruleset::BasicRuleset;
    use crate::report::{DefaultTextCatalog, ReportBuffer};
    use crate::types::{NullMode, ReplayMode};

    fn setup() -> (Snapshot, GameState) {
        let snapshot = BasicRuleset::snapshot(&["Alice", "Bob"]);
        let state = BasicRuleset::initial_state(&snapshot).expect("state");
        (snapshot, state)
    }

    fn toggle(player: &str, kind: CorrectionType, active: bool) -> Action {
        Action::CorrectionMode(CorrectionModeAction::new(player, kind, active).expect("supported"))
    }

    #[test]
    fn initialize_creates_inactive_managers_for_supported_families() {
        let (snapshot, _) = setup();
        let registry = CorrectionRegistry::initialize(&snapshot).expect("registry");
        assert_eq!(
            registry.correction_types(),
            vec![
                CorrectionType::CashCorrection,
                CorrectionType::ClosePrivate,
                CorrectionType::OperatingCost
            ]
        );
        assert!(registry.active_types().is_empty());
    }

    #[test]
    fn map_correction_manager_is_not_supported() {
        let (snapshot, _) = setup();
        let err = match create_manager(CorrectionType::MapCorrection, &snapshot) {
            Ok(_) => panic!("retired family must not construct"),
            Err(err) => err,
        };
        assert!(matches!(err, TurnlogError::NotSupported(_)));
    }

    #[test]
    fn inactive_registry_offers_only_toggles() {
        let (snapshot, state) = setup();
        let registry = CorrectionRegistry::initialize(&snapshot).expect("registry");
        let templates = registry.list_templates(&state, "Alice");
        assert_eq!(templates.len(), 3);
        assert!(templates
            .iter()
            .all(|t| matches!(t, Action::CorrectionMode(toggle) if !toggle.active)));
    }

    #[test]
    fn toggling_twice_restores_original_state() {
        let (snapshot, mut state) = setup();
        let mut registry = CorrectionRegistry::initialize(&snapshot).expect("registry");
        let mut report = ReportBuffer::default();
        let text = DefaultTextCatalog::new();
        let mut ctx = ApplyContext {
            state: &mut state,
            report: &mut report,
            text: &text,
            mode: ReplayMode::Live,
        };

        let first = registry.execute(&toggle("Alice", CorrectionType::ClosePrivate, false), &mut ctx);
        assert_eq!(first, Execution::Applied);
        assert!(registry.is_active(CorrectionType::ClosePrivate));
        let second = registry.execute(&toggle("Alice", CorrectionType::ClosePrivate, true), &mut ctx);
        assert_eq!(second, Execution::Applied);
        assert!(!registry.is_active(CorrectionType::ClosePrivate));
        assert_eq!(
            report.lines(),
            &[
                "Alice activates CLOSE_PRIVATE correction mode".to_string(),
                "Alice deactivates CLOSE_PRIVATE correction mode".to_string()
            ]
        );
        assert_eq!(report.notices().len(), 2);
    }

    #[test]
    fn reloading_suppresses_notices_but_keeps_report() {
        let (snapshot, mut state) = setup();
        let mut registry = CorrectionRegistry::initialize(&snapshot).expect("registry");
        let mut report = ReportBuffer::default();
        let text = DefaultTextCatalog::new();
        let mut ctx = ApplyContext {
            state: &mut state,
            report: &mut report,
            text: &text,
            mode: ReplayMode::Reloading,
        };
        registry.execute(&toggle("Bob", CorrectionType::CashCorrection, false), &mut ctx);
        assert_eq!(report.lines().len(), 1);
        assert!(report.notices().is_empty());
    }

    #[test]
    fn active_family_adds_its_templates() {
        let (snapshot, mut state) = setup();
        let mut registry = CorrectionRegistry::initialize(&snapshot).expect("registry");
        let mut report = ReportBuffer::default();
        let text = DefaultTextCatalog::new();
        {
            let mut ctx = ApplyContext {
                state: &mut state,
                report: &mut report,
                text: &text,
                mode: ReplayMode::Live,
            };
            registry.execute(&toggle("Alice", CorrectionType::ClosePrivate, false), &mut ctx);
        }
        let templates = registry.list_templates(&state, "Alice");
        let closes = templates
            .iter()
            .filter(|t| matches!(t, Action::ClosePrivate(_)))
            .count();
        assert_eq!(closes, state.privates.len());
        assert!(templates.contains(&Action::ClosePrivate(ClosePrivateAction::new(
            "Alice", "SVNRR"
        ))));
    }

    #[test]
    fn ordinary_actions_are_not_handled() {
        let (snapshot, mut state) = setup();
        let mut registry = CorrectionRegistry::initialize(&snapshot).expect("registry");
        let mut report = ReportBuffer::default();
        let text = DefaultTextCatalog::new();
        let mut ctx = ApplyContext {
            state: &mut state,
            report: &mut report,
            text: &text,
            mode: ReplayMode::Live,
        };
        let pass = Action::Null(NullAction::new("Alice", NullMode::Pass));
        let outcome = registry.execute(&pass, &mut ctx);
        assert!(!outcome.handled());
    }
}
