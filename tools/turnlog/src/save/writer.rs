use super::envelope::{encode, format_version_id, SaveHeader};
use crate::errors::TurnlogError;
use crate::game::GameController;
use crate::logging::{emit, JsonlLogger};
use crate::runtime::{Clock, FileSystem};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recovery slot and the backup slot its previous contents rotate into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosavePaths {
    pub recovery: PathBuf,
    pub backup: PathBuf,
}

impl AutosavePaths {
    pub fn new(recovery: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            recovery: recovery.into(),
            backup: backup.into(),
        }
    }

    pub fn temp(&self) -> PathBuf {
        let mut name = self.recovery.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

pub struct SaveWriter {
    tool_version: String,
    clock: Arc<dyn Clock>,
    file_system: Arc<dyn FileSystem>,
    logger: Option<JsonlLogger>,
}

impl SaveWriter {
    pub fn new(
        tool_version: impl Into<String>,
        clock: Arc<dyn Clock>,
        file_system: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            tool_version: tool_version.into(),
            clock,
            file_system,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn header(&self, action_count: usize) -> SaveHeader {
        let saved_at: DateTime<Utc> = self.clock.now().into();
        SaveHeader {
            tool_version: self.tool_version.clone(),
            saved_at: saved_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            format_version_id: format_version_id(),
            action_count,
        }
    }

    pub fn save_to_string<G: GameController>(&self, game: &G) -> Result<String, TurnlogError> {
        let log = game.action_log();
        encode(&self.header(log.len()), game.snapshot(), log)
    }

    pub fn save_to_path<G: GameController>(&self, game: &G, path: &Path) -> Result<(), TurnlogError> {
        let text = self.save_to_string(game)?;
        self.write(path, &text)?;
        emit(
            self.logger.as_ref(),
            "info",
            "save.written",
            json!({
                "path": path.display().to_string(),
                "actions": game.action_log().len(),
            }),
        );
        Ok(())
    }

    /// Writes a temp file, rotates the current recovery file to the backup
    /// slot, then renames the temp file into place.
    pub fn autosave<G: GameController>(
        &self,
        game: &G,
        paths: &AutosavePaths,
    ) -> Result<(), TurnlogError> {
        let text = self.save_to_string(game)?;
        let temp = paths.temp();
        self.write(&temp, &text)?;
        let rotated = self.file_system.exists(&paths.recovery);
        if rotated {
            self.file_system.copy(&paths.recovery, &paths.backup)?;
        }
        self.file_system.rename(&temp, &paths.recovery)?;
        emit(
            self.logger.as_ref(),
            "info",
            "autosave.rotated",
            json!({
                "recovery": paths.recovery.display().to_string(),
                "backup": rotated.then(|| paths.backup.display().to_string()),
                "actions": game.action_log().len(),
            }),
        );
        Ok(())
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), TurnlogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.file_system.create_dir_all(parent)?;
            }
        }
        self.file_system.write_string(path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ordinary::NullAction;
    use crate::action::Action;
    use crate::game::ruleset::BasicCatalog;
    use crate::game::ruleset::{BasicRuleset, RulesetCatalog};
    use crate::runtime::{FakeClock, FakeFileSystem};
    use crate::save::envelope::decode;
    use crate::types::{NullMode, ReplayMode};
    use std::time::{Duration, SystemTime};

    fn writer(fs: &FakeFileSystem) -> SaveWriter {
        let clock = FakeClock::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        SaveWriter::new("0.1.0", Arc::new(clock), Arc::new(fs.clone()))
    }

    fn played_game(passes: usize) -> crate::game::Game {
        let mut game = BasicCatalog::default()
            .create_game(BasicRuleset::snapshot(&["Alice", "Bob"]))
            .expect("game");
        for turn in 0..passes {
            let player = if turn % 2 == 0 { "Alice" } else { "Bob" };
            game.apply_action(&Action::Null(NullAction::new(player, NullMode::Pass)), ReplayMode::Live)
                .expect("pass");
        }
        game
    }

    #[test]
    fn header_carries_rfc3339_timestamp_and_current_format() {
        let fs = FakeFileSystem::default();
        let header = writer(&fs).header(4);
        assert_eq!(header.saved_at, "2023-11-14T22:13:20Z");
        assert_eq!(header.format_version_id, format_version_id());
        assert_eq!(header.action_count, 4);
    }

    #[test]
    fn save_to_path_creates_parent_directories() {
        let fs = FakeFileSystem::default();
        let game = played_game(2);
        let path = Path::new("saves/game.jsonl");
        writer(&fs).save_to_path(&game, path).expect("save");
        assert_eq!(fs.created_dirs(), vec![PathBuf::from("saves")]);
        let envelope = decode(&fs.read_to_string(path).expect("read")).expect("decode");
        assert_eq!(envelope.actions.len(), 2);
    }

    #[test]
    fn autosave_rotates_previous_recovery_into_backup() {
        let fs = FakeFileSystem::default();
        let paths = AutosavePaths::new("recovery.jsonl", "recovery.bak.jsonl");
        let writer = writer(&fs);

        writer.autosave(&played_game(1), &paths).expect("first");
        assert!(!fs.exists(&paths.backup));
        writer.autosave(&played_game(2), &paths).expect("second");

        let recovery = decode(&fs.read_to_string(&paths.recovery).expect("recovery")).expect("decode");
        let backup = decode(&fs.read_to_string(&paths.backup).expect("backup")).expect("decode");
        assert_eq!(recovery.actions.len(), 2);
        assert_eq!(backup.actions.len(), 1);
        assert!(!fs.exists(&paths.temp()));
    }

    #[test]
    fn failed_temp_write_leaves_recovery_untouched() {
        let fs = FakeFileSystem::default();
        let paths = AutosavePaths::new("recovery.jsonl", "recovery.bak.jsonl");
        let writer = writer(&fs);
        writer.autosave(&played_game(1), &paths).expect("first");

        fs.set_fail_next(TurnlogError::Io("disk full".to_string()));
        assert!(writer.autosave(&played_game(3), &paths).is_err());
        let recovery = decode(&fs.read_to_string(&paths.recovery).expect("recovery")).expect("decode");
        assert_eq!(recovery.actions.len(), 1);
    }
}
