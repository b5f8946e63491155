use crate::errors::TurnlogError;
use crate::game::ruleset::BASIC_RULESET;
use crate::logging::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::runtime::FileSystem;
use crate::save::AutosavePaths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub ruleset: Option<String>,
    pub autosave: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub game: GameConfig,
    pub save: SaveConfig,
    pub autosave: AutosaveConfig,
    pub logging: LoggingConfig,
    pub texts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub default_ruleset: String,
    pub tool_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub recovery_file: PathBuf,
    pub backup_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig {
                default_ruleset: BASIC_RULESET.to_string(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            save: SaveConfig {
                directory: PathBuf::from("saves"),
            },
            autosave: AutosaveConfig {
                enabled: false,
                recovery_file: PathBuf::from("autosave.jsonl"),
                backup_file: PathBuf::from("autosave.bak.jsonl"),
            },
            logging: LoggingConfig {
                path: None,
                max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            },
            texts: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Autosave slots, relative ones placed under the save directory.
    pub fn autosave_paths(&self) -> AutosavePaths {
        AutosavePaths::new(
            absolutize_path(&self.save.directory, &self.autosave.recovery_file),
            absolutize_path(&self.save.directory, &self.autosave.backup_file),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAppConfig {
    game: Option<PartialGameConfig>,
    save: Option<PartialSaveConfig>,
    autosave: Option<PartialAutosaveConfig>,
    logging: Option<PartialLoggingConfig>,
    texts: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialGameConfig {
    default_ruleset: Option<String>,
    tool_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSaveConfig {
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAutosaveConfig {
    enabled: Option<bool>,
    recovery_file: Option<PathBuf>,
    backup_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLoggingConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
}

pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<AppConfig, TurnlogError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| TurnlogError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);

    cfg.save.directory = absolutize_path(process_cwd, &cfg.save.directory);
    cfg.logging.path = cfg
        .logging
        .path
        .as_deref()
        .map(|path| absolutize_path(process_cwd, path));
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(game) = partial.game {
        if let Some(default_ruleset) = game.default_ruleset {
            cfg.game.default_ruleset = default_ruleset;
        }
        if let Some(tool_version) = game.tool_version {
            cfg.game.tool_version = tool_version;
        }
    }

    if let Some(directory) = partial.save.and_then(|save| save.directory) {
        cfg.save.directory = directory;
    }

    if let Some(autosave) = partial.autosave {
        if let Some(enabled) = autosave.enabled {
            cfg.autosave.enabled = enabled;
        }
        if let Some(recovery_file) = autosave.recovery_file {
            cfg.autosave.recovery_file = recovery_file;
        }
        if let Some(backup_file) = autosave.backup_file {
            cfg.autosave.backup_file = backup_file;
        }
    }

    if let Some(logging) = partial.logging {
        if logging.path.is_some() {
            cfg.logging.path = logging.path;
        }
        if let Some(max_payload_bytes) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = max_payload_bytes;
        }
    }

    if let Some(texts) = partial.texts {
        cfg.texts.extend(texts);
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(ruleset) = &overrides.ruleset {
        cfg.game.default_ruleset = ruleset.clone();
    }
    if overrides.autosave {
        cfg.autosave.enabled = true;
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), TurnlogError> {
    if cfg.game.default_ruleset.trim().is_empty() {
        return Err(TurnlogError::InvalidConfig(
            "game.default_ruleset must not be empty".to_string(),
        ));
    }

    if cfg.logging.max_payload_bytes == 0 {
        return Err(TurnlogError::InvalidConfig(
            "logging.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    let paths = cfg.autosave_paths();
    if paths.recovery == paths.backup {
        return Err(TurnlogError::InvalidConfig(
            "autosave.recovery_file and autosave.backup_file must differ".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::FakeFileSystem;

    fn load(toml: &str, overrides: CliOverrides) -> Result<AppConfig, TurnlogError> {
        let fs = FakeFileSystem::with_file("/work/turnlog.toml", toml);
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("/work/turnlog.toml")),
            ..overrides
        };
        load_config(&overrides, Path::new("/work"), &fs)
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let fs = FakeFileSystem::default();
        let cfg = load_config(&CliOverrides::default(), Path::new("/work"), &fs).expect("config");
        assert_eq!(cfg.game.default_ruleset, "18XX-basic");
        assert_eq!(cfg.save.directory, PathBuf::from("/work/saves"));
        assert!(!cfg.autosave.enabled);
        assert_eq!(
            cfg.autosave_paths().recovery,
            PathBuf::from("/work/saves/autosave.jsonl")
        );
    }

    #[test]
    fn file_values_merge_over_defaults_and_cli_wins() {
        let cfg = load(
            r#"
[game]
tool_version = "9.9.9"
default_ruleset = "from-file"

[autosave]
recovery_file = "/tmp/recovery.jsonl"

[texts]
PlayerPasses = "{0} declines"
"#,
            CliOverrides {
                ruleset: Some("18XX-basic".to_string()),
                autosave: true,
                ..CliOverrides::default()
            },
        )
        .expect("config");
        assert_eq!(cfg.game.tool_version, "9.9.9");
        assert_eq!(cfg.game.default_ruleset, "18XX-basic");
        assert!(cfg.autosave.enabled);
        assert_eq!(
            cfg.autosave_paths().recovery,
            PathBuf::from("/tmp/recovery.jsonl")
        );
        assert_eq!(cfg.logging.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);
        assert_eq!(cfg.texts.get("PlayerPasses").map(String::as_str), Some("{0} declines"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            load("[game\n", CliOverrides::default()),
            Err(TurnlogError::ConfigParse(_))
        ));
    }

    #[test]
    fn zero_payload_budget_is_invalid() {
        assert!(matches!(
            load("[logging]\nmax_payload_bytes = 0\n", CliOverrides::default()),
            Err(TurnlogError::InvalidConfig(_))
        ));
    }

    #[test]
    fn identical_autosave_slots_are_invalid() {
        assert!(matches!(
            load(
                "[autosave]\nrecovery_file = \"same.jsonl\"\nbackup_file = \"same.jsonl\"\n",
                CliOverrides::default()
            ),
            Err(TurnlogError::InvalidConfig(msg)) if msg.contains("must differ")
        ));
    }
}
