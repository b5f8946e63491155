use thiserror::Error;

#[derive(Debug, Error)]
pub enum TurnlogError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error(
        "incompatible save format: file has format id {found}, this build expects {expected} (written by tool version {tool_version})"
    )]
    IncompatibleFormat {
        found: i64,
        expected: i64,
        tool_version: String,
    },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("action {index} uses retired action kind '{kind}'")]
    RetiredAction { index: usize, kind: String },
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("unknown ruleset: {0}")]
    UnknownRuleset(String),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("action not allowed: {0}")]
    ActionNotAllowed(String),
    #[error("action rejected: {0}")]
    ActionRejected(String),
    #[error("replay halted at action {index}: {reason}")]
    ReplayDivergence { index: usize, reason: String },
}
