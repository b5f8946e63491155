use super::state::{Company, GameState, Player, PrivateCompany};
use crate::errors::TurnlogError;
use crate::report::{localized_text, ReportBuffer, TextCatalog};
use crate::types::ReplayMode;
use std::fmt::Display;

/// Everything an action needs while it is applied. Threaded explicitly
/// through every apply call; saved names resolve against `state` here.
pub struct ApplyContext<'a> {
    pub state: &'a mut GameState,
    pub report: &'a mut ReportBuffer,
    pub text: &'a dyn TextCatalog,
    pub mode: ReplayMode,
}

impl<'a> ApplyContext<'a> {
    pub fn resolve_participant(&self, name: &str) -> Result<&Player, TurnlogError> {
        self.state
            .player(name)
            .ok_or_else(|| TurnlogError::ActionRejected(format!("unknown participant {name}")))
    }

    pub fn resolve_company(&self, id: &str) -> Result<&Company, TurnlogError> {
        self.state
            .company(id)
            .ok_or_else(|| TurnlogError::ActionRejected(format!("unknown company {id}")))
    }

    pub fn resolve_private(&self, id: &str) -> Result<&PrivateCompany, TurnlogError> {
        self.state
            .private(id)
            .ok_or_else(|| TurnlogError::ActionRejected(format!("unknown private {id}")))
    }

    pub fn text(&self, key: &str, args: &[&dyn Display]) -> String {
        localized_text(self.text, key, args)
    }

    /// Adds a line to the game report.
    pub fn message(&mut self, key: &str, args: &[&dyn Display]) {
        let line = self.text(key, args);
        self.report.add(line);
    }

    /// Records a validation failure and returns its text.
    pub fn error(&mut self, key: &str, args: &[&dyn Display]) -> String {
        let line = self.text(key, args);
        self.report.add_error(line.clone());
        line
    }

    /// Live-only side channel; dropped while reloading.
    pub fn notice(&mut self, key: &str, args: &[&dyn Display]) {
        if self.mode.is_reloading() {
            return;
        }
        let line = self.text(key, args);
        self.report.add_notice(line);
    }
}
