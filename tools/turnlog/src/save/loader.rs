use super::envelope::{format_version_id, EnvelopeReader, SaveHeader};
use crate::action::Action;
use crate::errors::TurnlogError;
use crate::game::ruleset::RulesetCatalog;
use crate::game::GameController;
use crate::logging::{emit, JsonlLogger};
use crate::runtime::FileSystem;
use crate::snapshot::{reconstruct, OptionMergeReport};
use crate::types::ReplayMode;
use serde_json::json;
use std::path::Path;

/// A load that got far enough to build a game. `error` is set when replay
/// stopped early; `game` then holds the first `applied` actions.
pub struct LoadOutcome<G> {
    pub header: SaveHeader,
    pub game: G,
    pub applied: usize,
    pub options: OptionMergeReport,
    pub error: Option<TurnlogError>,
}

impl<G> LoadOutcome<G> {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn halted_by_divergence(&self) -> bool {
        matches!(self.error, Some(TurnlogError::ReplayDivergence { .. }))
    }
}

pub struct GameLoader<C> {
    catalog: C,
    logger: Option<JsonlLogger>,
}

impl<C: RulesetCatalog> GameLoader<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn load_from_path(
        &self,
        file_system: &dyn FileSystem,
        path: &Path,
    ) -> Result<LoadOutcome<C::Game>, TurnlogError> {
        let text = file_system.read_to_string(path)?;
        self.load_from_str(&text)
    }

    /// Errors before a game exists come back as `Err`. Anything after that
    /// is carried in [`LoadOutcome::error`] with the partial game.
    pub fn load_from_str(&self, text: &str) -> Result<LoadOutcome<C::Game>, TurnlogError> {
        let (header, mut reader) = EnvelopeReader::open(text)?;
        let expected = format_version_id();
        if header.format_version_id != expected {
            emit(
                self.logger.as_ref(),
                "error",
                "load.version_mismatch",
                json!({
                    "found": header.format_version_id,
                    "expected": expected,
                    "tool_version": header.tool_version,
                }),
            );
            return Err(TurnlogError::IncompatibleFormat {
                found: header.format_version_id,
                expected,
                tool_version: header.tool_version,
            });
        }

        let saved = reader.read_snapshot()?;
        let defaults = self
            .catalog
            .default_options(&saved.ruleset_id)
            .ok_or_else(|| TurnlogError::UnknownRuleset(saved.ruleset_id.clone()))?;
        let (snapshot, options) = reconstruct(&saved, &defaults);
        if !options.missing_from_save.is_empty() {
            emit(
                self.logger.as_ref(),
                "warn",
                "load.options_missing",
                json!({ "options": options.missing_from_save }),
            );
        }
        if !options.ignored_from_save.is_empty() {
            emit(
                self.logger.as_ref(),
                "warn",
                "load.options_ignored",
                json!({ "options": options.ignored_from_save }),
            );
        }

        let mut game = self.catalog.create_game(snapshot)?;
        game.begin_replay();
        let mut applied = 0;
        let mut error = None;
        loop {
            let action = match reader.next_action() {
                Ok(Some(action)) => action,
                Ok(None) => break,
                Err(err) => {
                    error = Some(err);
                    break;
                }
            };
            if let Err(err) = replay_one(&mut game, applied, &action) {
                error = Some(err);
                break;
            }
            applied += 1;
        }
        game.end_replay();
        game.finish_loading();

        match &error {
            Some(err) => emit(
                self.logger.as_ref(),
                "error",
                "load.replay_halted",
                json!({ "applied": applied, "error": err.to_string() }),
            ),
            None => emit(
                self.logger.as_ref(),
                "info",
                "load.complete",
                json!({ "applied": applied, "tool_version": header.tool_version }),
            ),
        }
        Ok(LoadOutcome {
            header,
            game,
            applied,
            options,
            error,
        })
    }
}

fn replay_one<G: GameController>(
    game: &mut G,
    index: usize,
    action: &Action,
) -> Result<(), TurnlogError> {
    game.apply_action(action, ReplayMode::Reloading)
        .map_err(|err| TurnlogError::ReplayDivergence {
            index,
            reason: err.to_string(),
        })?;
    let log = game.action_log();
    match log.last() {
        Some(logged) if log.len() == index + 1 && logged.matches_commitment(action) => Ok(()),
        _ => Err(TurnlogError::ReplayDivergence {
            index,
            reason: format!("replayed {} was not logged as committed", action.describe()),
        }),
    }
}
