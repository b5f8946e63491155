pub mod action;
pub mod config;
pub mod correction;
pub mod errors;
pub mod game;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod save;
pub mod session;
pub mod snapshot;
pub mod types;

use action::Action;
use clap::{error::ErrorKind, Parser};
use config::{load_config, AppConfig, CliOverrides};
use errors::TurnlogError;
use game::ruleset::{BasicCatalog, RulesetCatalog};
use game::{Game, GameController, Processed};
use logging::{structured_fallback_line, JsonlLogger};
use report::{money, DefaultTextCatalog};
use runtime::ProductionRuntime;
use save::{GameLoader, SaveWriter};
use session::GameSession;
use snapshot::Snapshot;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_REPLAY_HALTED: i32 = 2;

#[derive(Debug, Clone, Parser)]
#[command(name = "turnlog")]
#[command(about = "Save, load and correct turn-based game logs")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Ruleset for a new game.
    #[arg(long)]
    pub ruleset: Option<String>,
    /// Participant of a new game, in seating order.
    #[arg(long = "player")]
    pub players: Vec<String>,
    #[arg(long)]
    pub load: Option<PathBuf>,
    /// Committed action as JSON, submitted live after start or load.
    #[arg(long = "action")]
    pub actions: Vec<String>,
    #[arg(long)]
    pub save: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub autosave: bool,
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run() -> Result<i32, TurnlogError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| TurnlogError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &Path,
    runtime: &ProductionRuntime,
) -> Result<i32, TurnlogError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(EXIT_OK);
            }
            _ => return Err(TurnlogError::Cli(error.to_string())),
        },
    };
    if cli.load.is_some() && !cli.players.is_empty() {
        return Err(TurnlogError::Cli(
            "--player starts a new game and cannot be combined with --load".to_string(),
        ));
    }

    let overrides = CliOverrides {
        config_path: cli.config.as_ref().map(|path| absolutize(cwd, path)),
        ruleset: cli.ruleset.clone(),
        autosave: cli.autosave,
    };
    let cfg = load_config(&overrides, cwd, runtime.file_system.as_ref())?;
    let logger = cfg.logging.path.as_ref().map(|path| {
        let mut logger = JsonlLogger::new(path);
        logger.max_payload_bytes = cfg.logging.max_payload_bytes;
        logger
    });
    let catalog = BasicCatalog::new(Arc::new(DefaultTextCatalog::with_overrides(
        cfg.texts.clone(),
    )));

    let mut exit_code = EXIT_OK;
    let game = match &cli.load {
        Some(path) => {
            let path = absolutize(cwd, path);
            let mut loader = GameLoader::new(catalog);
            if let Some(logger) = &logger {
                loader = loader.with_logger(logger.clone());
            }
            let outcome = loader.load_from_path(runtime.file_system.as_ref(), &path)?;
            for missing in &outcome.options.missing_from_save {
                say(runtime, "option", missing, "not in save, using default")?;
            }
            for ignored in &outcome.options.ignored_from_save {
                say(runtime, "option", ignored, "unknown to this ruleset, ignored")?;
            }
            let subject = path.display().to_string();
            match &outcome.error {
                None => say(
                    runtime,
                    "load",
                    &subject,
                    &format!("replayed {} actions", outcome.applied),
                )?,
                Some(error) => {
                    exit_code = if outcome.halted_by_divergence() {
                        EXIT_REPLAY_HALTED
                    } else {
                        EXIT_FATAL
                    };
                    say(
                        runtime,
                        "load",
                        &subject,
                        &format!("stopped after {} actions: {error}", outcome.applied),
                    )?;
                }
            }
            outcome.game
        }
        None => new_game(&cfg, &cli.players, &catalog)?,
    };

    let mut writer = SaveWriter::new(
        cfg.game.tool_version.clone(),
        Arc::clone(&runtime.clock),
        Arc::clone(&runtime.file_system),
    );
    if let Some(logger) = &logger {
        writer = writer.with_logger(logger.clone());
    }
    let mut session = GameSession::new(game, writer);
    if cfg.autosave.enabled {
        session = session.with_autosave(cfg.autosave_paths());
    }

    for raw in &cli.actions {
        let action: Action = serde_json::from_str(raw)
            .map_err(|e| TurnlogError::Cli(format!("--action is not a valid action: {e}")))?;
        match session.submit(&action)? {
            Processed::Applied => say(runtime, "action", action.kind(), &action.describe())?,
            Processed::Rejected(reason) => say(runtime, "rejected", action.kind(), &reason)?,
        }
        for notice in session.game_mut().report_mut().take_notices() {
            say(runtime, "notice", action.player(), &notice)?;
        }
    }

    if let Some(path) = &cli.save {
        let path = absolutize(cwd, path);
        session.writer().save_to_path(session.game(), &path)?;
        say(
            runtime,
            "save",
            &path.display().to_string(),
            &format!("{} actions", session.game().action_log().len()),
        )?;
    }
    if let Some(path) = &cli.report {
        session
            .game()
            .report()
            .export(runtime.file_system.as_ref(), &absolutize(cwd, path))?;
    }

    let game = session.game();
    let state = game.state();
    say(
        runtime,
        "state",
        &game.snapshot().ruleset_id,
        &format!(
            "turn {} next {} bank {} log {}",
            state.turn,
            state.current_player_name(),
            money(state.bank_cash),
            game.action_log().len()
        ),
    )?;
    Ok(exit_code)
}

fn new_game(
    cfg: &AppConfig,
    players: &[String],
    catalog: &BasicCatalog,
) -> Result<Game, TurnlogError> {
    let ruleset = &cfg.game.default_ruleset;
    let options = catalog
        .default_options(ruleset)
        .ok_or_else(|| TurnlogError::UnknownRuleset(ruleset.clone()))?;
    let snapshot = Snapshot {
        ruleset_id: ruleset.clone(),
        options,
        participants: players.to_vec(),
    };
    catalog.create_game(snapshot)
}

fn say(
    runtime: &ProductionRuntime,
    event: &str,
    subject: &str,
    message: &str,
) -> Result<(), TurnlogError> {
    if runtime.terminal.stdin_is_tty() {
        runtime.terminal.write_line(&format!("{event}: {subject}: {message}"))
    } else {
        runtime
            .terminal
            .write_line(&structured_fallback_line(event, subject, message))
    }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
