//! Reference rule-engine collaborator. The persistence layer only talks to
//! it through [`GameController`] and [`ruleset::RulesetCatalog`].

pub mod context;
pub mod rules;
pub mod ruleset;
pub mod state;

use crate::action::Action;
use crate::correction::{CorrectionRegistry, Execution};
use crate::errors::TurnlogError;
use crate::report::{localized_text, ReportBuffer, TextCatalog};
use crate::snapshot::Snapshot;
use crate::types::ReplayMode;
use context::ApplyContext;
use ruleset::BasicRuleset;
use state::GameState;
use std::sync::Arc;

/// What the save/load engine needs from a running game.
pub trait GameController {
    /// Applies one committed action. `Ok` means it was applied and logged.
    fn apply_action(&mut self, action: &Action, mode: ReplayMode) -> Result<(), TurnlogError>;

    fn begin_replay(&mut self);

    fn end_replay(&mut self);

    /// Called once a load has finished, halted or not.
    fn finish_loading(&mut self);

    fn snapshot(&self) -> &Snapshot;

    fn action_log(&self) -> &[Action];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed {
    Applied,
    Rejected(String),
}

pub struct Game {
    snapshot: Snapshot,
    state: GameState,
    corrections: CorrectionRegistry,
    report: ReportBuffer,
    log: Vec<Action>,
    text: Arc<dyn TextCatalog>,
    replaying: bool,
}

impl Game {
    pub fn new(snapshot: Snapshot, text: Arc<dyn TextCatalog>) -> Result<Self, TurnlogError> {
        let state = BasicRuleset::initial_state(&snapshot)?;
        let corrections = CorrectionRegistry::initialize(&snapshot)?;
        let mut report = ReportBuffer::default();
        report.add(localized_text(
            text.as_ref(),
            "GameStarted",
            &[&snapshot.ruleset_id, &snapshot.participants.join(", ")],
        ));
        Ok(Self {
            snapshot,
            state,
            corrections,
            report,
            log: Vec::new(),
            text,
            replaying: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn corrections(&self) -> &CorrectionRegistry {
        &self.corrections
    }

    pub fn report(&self) -> &ReportBuffer {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut ReportBuffer {
        &mut self.report
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Rule templates for the current player followed by correction
    /// templates offered on their behalf.
    pub fn possible_actions(&self) -> Vec<Action> {
        let mut actions = rules::rule_templates(&self.state);
        actions.extend(
            self.corrections
                .list_templates(&self.state, self.state.current_player_name()),
        );
        actions
    }

    /// Validates `action` against the offered templates and applies it.
    /// Validation failures of a matching action come back as `Rejected`
    /// and leave state and log untouched.
    pub fn process(&mut self, action: &Action, mode: ReplayMode) -> Result<Processed, TurnlogError> {
        action.ensure_supported()?;
        if !self
            .possible_actions()
            .iter()
            .any(|template| template.matches_template(action))
        {
            return Err(TurnlogError::ActionNotAllowed(action.describe()));
        }
        if !action.is_committed() {
            return Err(TurnlogError::ActionNotAllowed(format!(
                "{} is not committed",
                action.describe()
            )));
        }
        let mut ctx = ApplyContext {
            state: &mut self.state,
            report: &mut self.report,
            text: self.text.as_ref(),
            mode,
        };
        let outcome = if action.is_correction() {
            self.corrections.execute(action, &mut ctx)
        } else {
            rules::execute(action, &mut ctx)
        };
        match outcome {
            Execution::Applied => {
                self.log.push(action.clone());
                Ok(Processed::Applied)
            }
            Execution::Rejected(reason) => Ok(Processed::Rejected(reason)),
            Execution::Unhandled => Err(TurnlogError::NotSupported(format!(
                "no handler for {} action",
                action.kind()
            ))),
        }
    }
}

impl GameController for Game {
    fn apply_action(&mut self, action: &Action, mode: ReplayMode) -> Result<(), TurnlogError> {
        match self.process(action, mode)? {
            Processed::Applied => Ok(()),
            Processed::Rejected(reason) => Err(TurnlogError::ActionRejected(reason)),
        }
    }

    fn begin_replay(&mut self) {
        self.replaying = true;
    }

    fn end_replay(&mut self) {
        self.replaying = false;
    }

    fn finish_loading(&mut self) {
        self.replaying = false;
        let replayed = self.log.len();
        self.report.add(localized_text(
            self.text.as_ref(),
            "GameLoaded",
            &[&replayed],
        ));
    }

    fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn action_log(&self) -> &[Action] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::correction::{CashCorrectionAction, CorrectionModeAction};
    use crate::action::ordinary::NullAction;
    use crate::report::DefaultTextCatalog;
    use crate::types::{CashHolder, CorrectionType, NullMode};

    fn game() -> Game {
        Game::new(
            BasicRuleset::snapshot(&["Alice", "Bob"]),
            Arc::new(DefaultTextCatalog::new()),
        )
        .expect("game")
    }

    fn enable_cash(game: &mut Game) {
        let toggle = CorrectionModeAction::new("Alice", CorrectionType::CashCorrection, false)
            .expect("supported");
        game.apply_action(&Action::CorrectionMode(toggle), ReplayMode::Live)
            .expect("toggle");
    }

    #[test]
    fn out_of_turn_action_is_not_allowed() {
        let mut game = game();
        let err = game
            .apply_action(&Action::Null(NullAction::new("Bob", NullMode::Pass)), ReplayMode::Live)
            .expect_err("Bob is not current");
        assert!(matches!(err, TurnlogError::ActionNotAllowed(_)));
        assert!(game.action_log().is_empty());
    }

    #[test]
    fn offered_template_must_be_committed_before_it_applies() {
        let mut game = game();
        let template = Action::StartCompany(
            crate::action::ordinary::StartCompanyAction::template("Alice", "PRR", 67, 100),
        );
        assert!(game.possible_actions().contains(&template));
        assert!(matches!(
            game.apply_action(&template, ReplayMode::Live),
            Err(TurnlogError::ActionNotAllowed(msg)) if msg.contains("not committed")
        ));
    }

    #[test]
    fn correction_requires_active_mode() {
        let mut game = game();
        let correction = Action::CashCorrection(
            CashCorrectionAction::template("Alice", CashHolder::Player("Alice".into()), 600)
                .with_amount(50),
        );
        assert!(matches!(
            game.apply_action(&correction, ReplayMode::Live),
            Err(TurnlogError::ActionNotAllowed(_))
        ));
        enable_cash(&mut game);
        game.apply_action(&correction, ReplayMode::Live)
            .expect("correction applies");
        assert_eq!(game.state().player("Alice").map(|p| p.cash), Some(650));
        assert_eq!(game.action_log().len(), 2);
    }

    #[test]
    fn rejected_correction_leaves_log_and_state_alone() {
        let mut game = game();
        enable_cash(&mut game);
        let overdraw = Action::CashCorrection(
            CashCorrectionAction::template("Alice", CashHolder::Player("Bob".into()), 600)
                .with_amount(-700),
        );
        let processed = game.process(&overdraw, ReplayMode::Live).expect("processed");
        assert!(matches!(processed, Processed::Rejected(_)));
        assert_eq!(game.action_log().len(), 1);
        assert_eq!(game.state().player("Bob").map(|p| p.cash), Some(600));
        assert_eq!(game.report().errors().len(), 1);
    }

    #[test]
    fn finish_loading_reports_replayed_count() {
        let mut game = game();
        game.begin_replay();
        assert!(game.is_replaying());
        game.apply_action(
            &Action::Null(NullAction::new("Alice", NullMode::Pass)),
            ReplayMode::Reloading,
        )
        .expect("pass");
        game.end_replay();
        game.finish_loading();
        assert!(!game.is_replaying());
        assert_eq!(
            game.report().lines().last().map(String::as_str),
            Some("Game loaded: 1 actions replayed")
        );
    }
}
