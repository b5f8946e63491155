use crate::action::Action;
use crate::errors::TurnlogError;
use crate::game::{Game, Processed};
use crate::save::{AutosavePaths, SaveWriter};
use crate::types::ReplayMode;

/// A live game plus the writer that persists it.
pub struct GameSession {
    game: Game,
    writer: SaveWriter,
    autosave: Option<AutosavePaths>,
}

impl GameSession {
    pub fn new(game: Game, writer: SaveWriter) -> Self {
        Self {
            game,
            writer,
            autosave: None,
        }
    }

    pub fn with_autosave(mut self, paths: AutosavePaths) -> Self {
        self.autosave = Some(paths);
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn writer(&self) -> &SaveWriter {
        &self.writer
    }

    /// Applies a live action; autosaves when it was accepted.
    pub fn submit(&mut self, action: &Action) -> Result<Processed, TurnlogError> {
        let processed = self.game.process(action, ReplayMode::Live)?;
        if processed == Processed::Applied {
            if let Some(paths) = &self.autosave {
                self.writer.autosave(&self.game, paths)?;
            }
        }
        Ok(processed)
    }
}
